//! Todos: checklist items under a task.
//!
//! Todos are listed and created through their parent task
//! (`/api/v1/tasks/{task_id}/todos`) but updated and deleted by their own id
//! (`/api/v1/todos/{id}`). The cache is grouped by parent task.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SortOrder;
use crate::error::ApiError;
use crate::query::Query;
use crate::resource::{parse_list, Cache, GroupedCache, Identified, Page, Resource};
use crate::store::ResourceStore;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodoRecord {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub completed: bool,
    pub order: i64,
    pub scheduled_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<TodoRecord> for Todo {
    fn from(record: TodoRecord) -> Self {
        Self {
            id: record.id,
            task_id: record.task_id,
            title: record.title,
            completed: record.completed,
            order: record.order,
            scheduled_date: record.scheduled_date,
            completed_date: record.completed_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl Identified for Todo {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoDraft {
    pub task_id: i64,
    pub title: String,
    pub completed: bool,
    pub order: i64,
    pub scheduled_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
}

impl TodoDraft {
    /// An open todo at the top of `task_id`'s list.
    pub fn new(task_id: i64, title: impl Into<String>) -> Self {
        Self {
            task_id,
            title: title.into(),
            completed: false,
            order: 0,
            scheduled_date: None,
            completed_date: None,
        }
    }
}

impl From<&Todo> for TodoDraft {
    fn from(todo: &Todo) -> Self {
        Self {
            task_id: todo.task_id,
            title: todo.title.clone(),
            completed: todo.completed,
            order: todo.order,
            scheduled_date: todo.scheduled_date,
            completed_date: todo.completed_date,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<Option<NaiveDate>>,
}

/// A row of the cross-task todo list, joined with its task and project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct TodoSummary {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub project_name: Option<String>,
}

pub const DEFAULT_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListQuery {
    pub skip: u32,
    pub limit: u32,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub task_name: Option<String>,
    pub project_name: Option<String>,
}

impl Default for TodoListQuery {
    fn default() -> Self {
        Self::page(0, DEFAULT_PAGE_LIMIT)
    }
}

impl TodoListQuery {
    pub fn page(skip: u32, limit: u32) -> Self {
        Self {
            skip,
            limit,
            sort_by: None,
            sort_order: None,
            title: None,
            completed: None,
            task_name: None,
            project_name: None,
        }
    }

    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .push("skip", self.skip)
            .push("limit", self.limit)
            .push_text("sort_by", self.sort_by.as_deref())
            .push_opt("sort_order", self.sort_order)
            .push_text("title", self.title.as_deref())
            .push_opt("completed", self.completed)
            .push_text("task_name", self.task_name.as_deref())
            .push_text("project_name", self.project_name.as_deref());
        query
    }
}

pub struct Todos;

impl Resource for Todos {
    const KIND: &'static str = "todo";
    const COLLECTION: &'static str = "/api/v1/todos";

    type Record = TodoRecord;
    type Model = Todo;
    type Draft = TodoDraft;
    type Patch = TodoPatch;
    type Cache = GroupedCache<Todo>;

    fn create_path(draft: &TodoDraft) -> String {
        task_todos_path(draft.task_id)
    }

    fn cache_key(model: &Todo) -> i64 {
        model.task_id
    }
}

fn task_todos_path(task_id: i64) -> String {
    format!("/api/v1/tasks/{task_id}/todos")
}

pub type TodoStore<T> = ResourceStore<Todos, T>;

impl<T> ResourceStore<Todos, T> {
    /// Cached todos of one task, empty if never fetched.
    pub fn todos_for(&self, task_id: i64) -> Vec<Todo> {
        self.with_cache(|cache| cache.group(task_id).to_vec())
    }
}

impl<T: Transport> ResourceStore<Todos, T> {
    /// Load the todos of `task_id` into its cache slot.
    ///
    /// A 404 means the task has no todos yet and is not an error. Any other
    /// failure is recorded in `error()` and leaves the slot empty.
    pub async fn fetch_for_task(&self, task_id: i64) -> Vec<Todo> {
        let endpoint = task_todos_path(task_id);
        let fetched = self
            .track("fetch", async {
                let value: Value = match self.client().get(&endpoint).await {
                    Err(err) if err.is_not_found() => Value::Array(Vec::new()),
                    other => other?,
                };
                let todos: Vec<Todo> = parse_list::<TodoRecord>(value)?
                    .items
                    .into_iter()
                    .map(Todo::from)
                    .collect();
                self.with_cache_mut(|cache| cache.replace(task_id, todos.clone()));
                Ok(todos)
            })
            .await;

        fetched.unwrap_or_else(|_| {
            self.with_cache_mut(|cache| cache.replace(task_id, Vec::new()));
            Vec::new()
        })
    }

    /// One page of todos across all tasks. Not cached.
    pub async fn fetch_page(&self, query: &TodoListQuery) -> Result<Page<TodoSummary>, ApiError> {
        let endpoint = query.to_query().append_to(Todos::COLLECTION);
        self.track("fetch", async {
            let value: Value = self.client().get(&endpoint).await?;
            parse_list::<TodoSummary>(value)
        })
        .await
    }
}
