use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Status, Task, Todo};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- projects ---

#[tokio::test]
async fn list_projects_returns_envelope() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/projects"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["items"], serde_json::json!([]));
    assert_eq!(body["total"], 0);
    assert_eq!(body["skip"], 0);
    assert_eq!(body["limit"], 100);
}

#[tokio::test]
async fn create_project_without_name_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/projects", r#"{"start_month":"2024-01"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- statuses ---

#[tokio::test]
async fn list_statuses_returns_seeded_set_in_order() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/statuses"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let statuses: Vec<Status> = body_json(resp).await;
    assert_eq!(statuses.len(), 7);
    assert_eq!(statuses[0].name, "considering");
    assert_eq!(statuses[6].name, "cancelled");
}

// --- tasks ---

#[tokio::test]
async fn create_personal_task() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/tasks",
            r#"{"title":"Buy milk","project_id":-1,"assignee":"alice"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let task: Task = body_json(resp).await;
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.status, "not_started");
    assert_eq!(task.assignee.as_deref(), Some("alice"));
}

#[tokio::test]
async fn create_task_for_unknown_project_returns_detail() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/tasks", r#"{"title":"Lost","project_id":42}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Project not found");
}

#[tokio::test]
async fn list_tasks_rejects_malformed_project_ids() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/tasks?project_ids=1,x"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_task_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/v1/tasks/999", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- todos ---

#[tokio::test]
async fn todos_of_unknown_task_return_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/tasks/999/todos"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/api/v1/todos/999"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn task_and_todo_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create a personal task
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/tasks",
            r#"{"title":"Write report","project_id":-1,"assignee":"alice"}"#,
        ))
        .await
        .unwrap();
    let task: Task = body_json(resp).await;

    // reorder it via the query string
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("PUT", &format!("/api/v1/tasks/{}/order?new_order=3", task.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let reordered: Task = body_json(resp).await;
    assert_eq!(reordered.order, 3);

    // add a todo under the task
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/api/v1/tasks/{}/todos", task.id),
            r#"{"task_id":0,"title":"Draft outline","scheduled_date":"2024-03-01"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.task_id, task.id);

    // partial update: clear the date, keep the title
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/v1/todos/{}", todo.id),
            r#"{"completed":true,"scheduled_date":null}"#,
        ))
        .await
        .unwrap();
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Draft outline");
    assert!(updated.completed);
    assert_eq!(updated.scheduled_date, None);

    // cross-task listing joins the task title
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/api/v1/todos?skip=0&limit=10"))
        .await
        .unwrap();
    let page: Value = body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["task_name"], "Write report");
    assert_eq!(page["items"][0]["project_id"], -1);

    // deleting the task takes its todos with it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/v1/tasks/{}", task.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Task deleted successfully");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/v1/todos/{}", todo.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
