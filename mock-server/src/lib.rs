use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const PERSONAL_PROJECT_ID: i64 = -1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_month: Option<String>,
    pub end_month: Option<String>,
    pub assignee: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_month: Option<String>,
    #[serde(default)]
    pub end_month: Option<String>,
    #[serde(default)]
    pub assignee: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub status_id: Option<i64>,
    pub order: i64,
    pub completed: bool,
    pub project_id: i64,
    pub assignee: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_task_status")]
    pub status: String,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub completed: bool,
    pub project_id: i64,
    #[serde(default)]
    pub assignee: Option<String>,
}

fn default_task_status() -> String {
    "not_started".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub completed: bool,
    pub order: i64,
    pub scheduled_date: Option<String>,
    pub completed_date: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Status {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub order: i64,
    pub color: String,
    pub project_id: Option<i64>,
    pub created_at: String,
}

#[derive(Deserialize)]
pub struct CreateStatus {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_status_color")]
    pub color: String,
    #[serde(default)]
    pub project_id: Option<i64>,
}

fn default_status_color() -> String {
    "#667eea".to_string()
}

const SEED_STATUSES: [(&str, &str, &str); 7] = [
    ("considering", "Considering", "#9e9e9e"),
    ("not_started", "Not started", "#667eea"),
    ("in_progress", "In progress", "#ffa726"),
    ("review_pending", "Review pending", "#9c27b0"),
    ("staging_deployed", "Deployed to staging", "#ffeb3b"),
    ("production_deployed", "Deployed to production", "#51cf66"),
    ("cancelled", "Cancelled", "#dc3545"),
];

#[derive(Default)]
pub struct Tables {
    next_id: i64,
    pub projects: BTreeMap<i64, Project>,
    pub tasks: BTreeMap<i64, Task>,
    pub todos: BTreeMap<i64, Todo>,
    pub statuses: BTreeMap<i64, Status>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Shared statuses every project and personal task falls back to.
    pub fn seeded() -> Self {
        let mut tables = Self::default();
        for (order, (name, display_name, color)) in SEED_STATUSES.iter().enumerate() {
            let id = tables.next_id();
            tables.statuses.insert(
                id,
                Status {
                    id,
                    name: name.to_string(),
                    display_name: display_name.to_string(),
                    order: order as i64,
                    color: color.to_string(),
                    project_id: None,
                    created_at: now(),
                },
            );
        }
        tables
    }
}

pub type Db = Arc<RwLock<Tables>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    router(Arc::new(RwLock::new(Tables::seeded())))
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/api/v1/projects", get(list_projects).post(create_project))
        .route(
            "/api/v1/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/v1/statuses", get(list_statuses).post(create_status))
        .route("/api/v1/statuses/{id}", put(update_status).delete(delete_status))
        .route("/api/v1/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/v1/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/v1/tasks/{id}/order", put(update_task_order))
        .route("/api/v1/tasks/{id}/todos", get(list_task_todos).post(create_task_todo))
        .route("/api/v1/todos", get(list_todos))
        .route("/api/v1/todos/{id}", put(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(target: "mock_server", %addr, "serving taskboard API");
    }
    axum::serve(listener, app()).await
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn detail(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message.into() })))
}

fn not_found(what: &str) -> (StatusCode, Json<Value>) {
    detail(StatusCode::NOT_FOUND, format!("{what} not found"))
}

fn deleted(what: &str) -> Json<Value> {
    Json(json!({ "message": format!("{what} deleted successfully") }))
}

/// Overwrite the `allowed` fields of `record` that appear in `patch`.
fn apply_patch<T>(record: &T, patch: Value, allowed: &[&str]) -> ApiResult<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut current = serde_json::to_value(record)
        .map_err(|e| detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let (Value::Object(fields), Value::Object(changes)) = (&mut current, patch) else {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "body must be a JSON object"));
    };
    for (key, value) in changes {
        if allowed.contains(&key.as_str()) {
            fields.insert(key, value);
        }
    }
    fields.insert("updated_at".to_string(), Value::String(now()));
    serde_json::from_value(current).map_err(|e| detail(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

#[derive(Serialize)]
struct Page<T> {
    items: Vec<T>,
    total: usize,
    skip: usize,
    limit: usize,
}

fn paginate<T>(rows: Vec<T>, skip: Option<usize>, limit: Option<usize>) -> Page<T> {
    let skip = skip.unwrap_or(0);
    let limit = limit.unwrap_or(100);
    let total = rows.len();
    let items = rows.into_iter().skip(skip).take(limit).collect();
    Page {
        items,
        total,
        skip,
        limit,
    }
}

// --- projects ---

#[derive(Deserialize)]
pub struct ProjectListQuery {
    pub assignee: Option<String>,
    pub name: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

async fn list_projects(State(db): State<Db>, Query(query): Query<ProjectListQuery>) -> Json<Value> {
    let tables = db.read().await;
    let rows: Vec<Project> = tables
        .projects
        .values()
        .filter(|p| match &query.assignee {
            Some(who) => p.assignee.as_ref().is_some_and(|list| list.contains(who)),
            None => true,
        })
        .filter(|p| match &query.name {
            Some(name) => p.name.contains(name.as_str()),
            None => true,
        })
        .cloned()
        .collect();
    Json(json!(paginate(rows, query.skip, query.limit)))
}

async fn create_project(State(db): State<Db>, Json(input): Json<CreateProject>) -> Json<Project> {
    let mut tables = db.write().await;
    let id = tables.next_id();
    let project = Project {
        id,
        name: input.name,
        description: input.description,
        start_month: input.start_month,
        end_month: input.end_month,
        assignee: input.assignee,
        created_at: now(),
        updated_at: None,
    };
    tables.projects.insert(id, project.clone());
    tracing::debug!(target: "mock_server", id, "project created");
    Json(project)
}

async fn get_project(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Project>> {
    let tables = db.read().await;
    tables.projects.get(&id).cloned().map(Json).ok_or_else(|| not_found("Project"))
}

async fn update_project(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> ApiResult<Json<Project>> {
    let mut tables = db.write().await;
    let current = tables.projects.get(&id).ok_or_else(|| not_found("Project"))?;
    let updated = apply_patch(
        current,
        patch,
        &["name", "description", "start_month", "end_month", "assignee"],
    )?;
    tables.projects.insert(id, updated.clone());
    Ok(Json(updated))
}

async fn delete_project(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let mut tables = db.write().await;
    tables.projects.remove(&id).ok_or_else(|| not_found("Project"))?;
    let orphaned: Vec<i64> = tables
        .tasks
        .values()
        .filter(|t| t.project_id == id)
        .map(|t| t.id)
        .collect();
    for task_id in orphaned {
        tables.tasks.remove(&task_id);
        tables.todos.retain(|_, todo| todo.task_id != task_id);
    }
    Ok(deleted("Project"))
}

// --- statuses ---

#[derive(Deserialize)]
pub struct StatusListQuery {
    pub project_id: Option<i64>,
}

async fn list_statuses(State(db): State<Db>, Query(query): Query<StatusListQuery>) -> Json<Vec<Status>> {
    let tables = db.read().await;
    let mut rows: Vec<Status> = tables
        .statuses
        .values()
        .filter(|s| s.project_id.is_none() || s.project_id == query.project_id)
        .cloned()
        .collect();
    rows.sort_by_key(|s| (s.order, s.id));
    Json(rows)
}

async fn create_status(State(db): State<Db>, Json(input): Json<CreateStatus>) -> Json<Status> {
    let mut tables = db.write().await;
    let id = tables.next_id();
    let status = Status {
        id,
        name: input.name,
        display_name: input.display_name,
        order: input.order,
        color: input.color,
        project_id: input.project_id,
        created_at: now(),
    };
    tables.statuses.insert(id, status.clone());
    Json(status)
}

async fn update_status(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> ApiResult<Json<Status>> {
    let mut tables = db.write().await;
    let current = tables.statuses.get(&id).ok_or_else(|| not_found("Status"))?;
    let updated: Status = apply_patch(current, patch, &["display_name", "order", "color", "project_id"])?;
    tables.statuses.insert(id, updated.clone());
    Ok(Json(updated))
}

async fn delete_status(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let mut tables = db.write().await;
    tables.statuses.remove(&id).ok_or_else(|| not_found("Status"))?;
    Ok(deleted("Status"))
}

// --- tasks ---

#[derive(Deserialize)]
pub struct TaskListQuery {
    pub project_id: Option<i64>,
    pub project_ids: Option<String>,
    pub assignee: Option<String>,
}

async fn list_tasks(State(db): State<Db>, Query(query): Query<TaskListQuery>) -> ApiResult<Json<Vec<Task>>> {
    let project_ids: Option<Vec<i64>> = match (&query.project_id, &query.project_ids) {
        (Some(id), _) => Some(vec![*id]),
        (None, Some(ids)) => Some(
            ids.split(',')
                .map(|id| id.trim().parse::<i64>())
                .collect::<Result<_, _>>()
                .map_err(|_| detail(StatusCode::BAD_REQUEST, "project_ids must be comma-separated integers"))?,
        ),
        (None, None) => None,
    };

    let tables = db.read().await;
    let mut rows: Vec<Task> = tables
        .tasks
        .values()
        .filter(|t| project_ids.as_ref().map_or(true, |ids| ids.contains(&t.project_id)))
        .filter(|t| match &query.assignee {
            Some(who) => t.assignee.as_deref() == Some(who.as_str()),
            None => true,
        })
        .cloned()
        .collect();
    rows.sort_by_key(|t| (t.order, t.id));
    Ok(Json(rows))
}

async fn create_task(State(db): State<Db>, Json(input): Json<CreateTask>) -> ApiResult<Json<Task>> {
    let mut tables = db.write().await;
    if input.project_id != PERSONAL_PROJECT_ID && !tables.projects.contains_key(&input.project_id) {
        return Err(not_found("Project"));
    }
    let id = tables.next_id();
    let task = Task {
        id,
        title: input.title,
        description: input.description,
        status: input.status,
        status_id: input.status_id,
        order: input.order,
        completed: input.completed,
        project_id: input.project_id,
        assignee: input.assignee,
        created_at: now(),
        updated_at: None,
    };
    tables.tasks.insert(id, task.clone());
    tracing::debug!(target: "mock_server", id, "task created");
    Ok(Json(task))
}

async fn get_task(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Task>> {
    let tables = db.read().await;
    tables.tasks.get(&id).cloned().map(Json).ok_or_else(|| not_found("Task"))
}

async fn update_task(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> ApiResult<Json<Task>> {
    let mut tables = db.write().await;
    let current = tables.tasks.get(&id).ok_or_else(|| not_found("Task"))?;
    let updated = apply_patch(
        current,
        patch,
        &[
            "title",
            "description",
            "status",
            "status_id",
            "order",
            "completed",
            "project_id",
            "assignee",
        ],
    )?;
    tables.tasks.insert(id, updated.clone());
    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct OrderQuery {
    pub new_order: i64,
}

async fn update_task_order(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<Json<Task>> {
    let mut tables = db.write().await;
    let task = tables.tasks.get_mut(&id).ok_or_else(|| not_found("Task"))?;
    task.order = query.new_order;
    task.updated_at = Some(now());
    Ok(Json(task.clone()))
}

async fn delete_task(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let mut tables = db.write().await;
    tables.tasks.remove(&id).ok_or_else(|| not_found("Task"))?;
    tables.todos.retain(|_, todo| todo.task_id != id);
    Ok(deleted("Task"))
}

// --- todos ---

async fn list_task_todos(State(db): State<Db>, Path(task_id): Path<i64>) -> ApiResult<Json<Vec<Todo>>> {
    let tables = db.read().await;
    if !tables.tasks.contains_key(&task_id) {
        return Err(not_found("Task"));
    }
    let mut rows: Vec<Todo> = tables
        .todos
        .values()
        .filter(|todo| todo.task_id == task_id)
        .cloned()
        .collect();
    rows.sort_by_key(|todo| (todo.order, todo.id));
    Ok(Json(rows))
}

async fn create_task_todo(
    State(db): State<Db>,
    Path(task_id): Path<i64>,
    Json(input): Json<CreateTodo>,
) -> ApiResult<Json<Todo>> {
    let mut tables = db.write().await;
    if !tables.tasks.contains_key(&task_id) {
        return Err(not_found("Task"));
    }
    let id = tables.next_id();
    let todo = Todo {
        id,
        task_id,
        title: input.title,
        completed: input.completed,
        order: input.order,
        scheduled_date: input.scheduled_date,
        completed_date: input.completed_date,
        created_at: now(),
        updated_at: None,
    };
    tables.todos.insert(id, todo.clone());
    Ok(Json(todo))
}

#[derive(Deserialize)]
pub struct TodoListQuery {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub title: Option<String>,
    pub completed: Option<bool>,
}

async fn list_todos(State(db): State<Db>, Query(query): Query<TodoListQuery>) -> Json<Value> {
    let tables = db.read().await;
    let rows: Vec<Value> = tables
        .todos
        .values()
        .filter(|todo| query.completed.map_or(true, |done| todo.completed == done))
        .filter(|todo| match &query.title {
            Some(title) => todo.title.contains(title.as_str()),
            None => true,
        })
        .map(|todo| {
            let task = tables.tasks.get(&todo.task_id);
            let project = task.and_then(|t| tables.projects.get(&t.project_id));
            let mut row = json!(todo);
            row["task_name"] = json!(task.map(|t| t.title.clone()));
            row["project_id"] = json!(task.map(|t| t.project_id));
            row["project_name"] = json!(project.map(|p| p.name.clone()));
            row
        })
        .collect();
    Json(json!(paginate(rows, query.skip, query.limit)))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> ApiResult<Json<Todo>> {
    let mut tables = db.write().await;
    let current = tables.todos.get(&id).ok_or_else(|| not_found("Todo"))?;
    let updated = apply_patch(
        current,
        patch,
        &["title", "completed", "order", "scheduled_date", "completed_date"],
    )?;
    tables.todos.insert(id, updated.clone());
    Ok(Json(updated))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    let mut tables = db.write().await;
    tables.todos.remove(&id).ok_or_else(|| not_found("Todo"))?;
    Ok(deleted("Todo"))
}
