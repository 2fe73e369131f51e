//! Tasks: `/api/v1/tasks`.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::query::Query;
use crate::resource::{FlatCache, Identified, Resource};
use crate::store::ResourceStore;
use crate::transport::Transport;
use crate::wire::{empty_as_null, text_or_empty};

/// `project_id` of a personal task that belongs to no project.
pub const PERSONAL_PROJECT_ID: i64 = -1;

pub const DEFAULT_TASK_STATUS: &str = "not_started";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub completed: bool,
    pub project_id: i64,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub status_id: Option<i64>,
    pub order: i64,
    pub completed: bool,
    pub project_id: i64,
    /// Owner of a personal task; empty otherwise.
    pub assignee: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Task {
    pub fn is_personal(&self) -> bool {
        self.project_id == PERSONAL_PROJECT_ID
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: text_or_empty(record.description),
            status: record
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string()),
            status_id: record.status_id,
            order: record.order,
            completed: record.completed,
            project_id: record.project_id,
            assignee: text_or_empty(record.assignee),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl Identified for Task {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(serialize_with = "empty_as_null")]
    pub description: String,
    pub status: String,
    pub status_id: Option<i64>,
    pub order: i64,
    pub completed: bool,
    pub project_id: i64,
    #[serde(serialize_with = "empty_as_null")]
    pub assignee: String,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, project_id: i64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: DEFAULT_TASK_STATUS.to_string(),
            status_id: None,
            order: 0,
            completed: false,
            project_id,
            assignee: String::new(),
        }
    }

    /// A task outside any project, owned by `assignee`.
    pub fn personal(title: impl Into<String>, assignee: impl Into<String>) -> Self {
        Self {
            assignee: assignee.into(),
            ..Self::new(title, PERSONAL_PROJECT_ID)
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
            status_id: task.status_id,
            order: task.order,
            completed: task.completed,
            project_id: task.project_id,
            assignee: task.assignee.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Option<String>>,
}

/// Which tasks to list.
///
/// A single `project_id` wins over `project_ids`. `assignee` is sent in
/// addition to either and narrows to that person's tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub project_id: Option<i64>,
    pub project_ids: Vec<i64>,
    pub assignee: Option<String>,
}

impl TaskQuery {
    pub fn project(project_id: i64) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    pub fn projects(project_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            project_ids: project_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn personal(assignee: impl Into<String>) -> Self {
        Self {
            project_id: Some(PERSONAL_PROJECT_ID),
            assignee: Some(assignee.into()),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let Some(project_id) = self.project_id {
            query.push("project_id", project_id);
        } else if !self.project_ids.is_empty() {
            let ids: Vec<String> = self.project_ids.iter().map(i64::to_string).collect();
            query.push("project_ids", ids.join(","));
        }
        query.push_text("assignee", self.assignee.as_deref());
        query
    }
}

pub struct Tasks;

impl Resource for Tasks {
    const KIND: &'static str = "task";
    const COLLECTION: &'static str = "/api/v1/tasks";

    type Record = TaskRecord;
    type Model = Task;
    type Draft = TaskDraft;
    type Patch = TaskPatch;
    type Cache = FlatCache<Task>;

    fn cache_key(_model: &Task) {}
}

pub type TaskStore<T> = ResourceStore<Tasks, T>;

impl<T: Transport> ResourceStore<Tasks, T> {
    /// Replace the cached list with the tasks in scope.
    ///
    /// Failures are recorded in `error()` and yield an empty result.
    pub async fn fetch(&self, query: &TaskQuery) -> Vec<Task> {
        let endpoint = query.to_query().append_to(Tasks::COLLECTION);
        self.fetch_into(&endpoint, ()).await.unwrap_or_default()
    }

    /// Move a task to `new_order` within its status column.
    pub async fn update_order(&self, id: i64, new_order: i64) -> Result<Task, ApiError> {
        self.track("reorder", async {
            let mut query = Query::new();
            query.push("new_order", new_order);
            let endpoint = query.append_to(&format!("{}/order", Tasks::item_path(id)));
            let record: TaskRecord = self.client().put::<(), _>(&endpoint, None).await?;
            Ok(self.reconcile(id, record))
        })
        .await
    }
}
