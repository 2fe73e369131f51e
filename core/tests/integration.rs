//! Full lifecycle against the live mock server over reqwest.
//!
//! # Design
//! Starts the mock server on a random port, then drives every store through
//! real HTTP. Validates that request building, the transport and response
//! parsing agree with the server end-to-end.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use taskboard_core::{
    ApiClient, ApiError, ClientConfig, ProjectDraft, ProjectPatch, ProjectQuery, ProjectStore, ReqwestTransport,
    StatusStore, TaskDraft, TaskQuery, TaskStore, TodoDraft, TodoListQuery, TodoPatch, TodoStore,
};

async fn start_server() -> Arc<ApiClient<ReqwestTransport>> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));

    let config = ClientConfig::new(&format!("http://{addr}"));
    Arc::new(ApiClient::new(config, ReqwestTransport::new()))
}

/// One-shot HTTP server that waits `header_delay` before the status line and
/// `body_delay` more before the body.
async fn start_slow_server(header_delay: Duration, body_delay: Duration) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;

        tokio::time::sleep(header_delay).await;
        let body = r#"{"a": 1}"#;
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
            body.len()
        );
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.flush().await;

        tokio::time::sleep(body_delay).await;
        let _ = socket.write_all(body.as_bytes()).await;
        let _ = socket.flush().await;
    });
    format!("http://{addr}")
}

#[tokio::test(flavor = "multi_thread")]
async fn board_lifecycle() {
    let client = start_server().await;
    let projects = ProjectStore::new(client.clone());
    let tasks = TaskStore::new(client.clone());
    let todos = TodoStore::new(client.clone());
    let statuses = StatusStore::new(client.clone());

    // Step 1: shared statuses are seeded.
    let seeded = statuses.fetch(None).await;
    assert_eq!(seeded.len(), 7);
    assert_eq!(statuses.error(), None);

    // Step 2: create a project and see it in the paged list.
    let mut draft = ProjectDraft::new("Website");
    draft.start_month = "2024-01".to_string();
    draft.assignee = vec!["alice".to_string()];
    let project = projects.create(&draft).await.unwrap();
    assert_eq!(project.end_month, "");
    assert_eq!(projects.fetch(&ProjectQuery::for_assignee("alice")).await, vec![project.clone()]);

    // Step 3: partial update leaves untouched fields alone.
    let patch = ProjectPatch {
        end_month: Some(Some("2024-06".to_string())),
        ..ProjectPatch::default()
    };
    let project = projects.update(project.id, &patch).await.unwrap();
    assert_eq!(project.start_month, "2024-01");
    assert_eq!(project.end_month, "2024-06");
    assert_eq!(projects.items()[0].end_month, "2024-06");

    // Step 4: a project task and a personal task.
    let task = tasks.create(&TaskDraft::new("Landing page", project.id)).await.unwrap();
    assert_eq!(task.status, "not_started");
    let personal = tasks
        .create(&TaskDraft::personal("Buy milk", "alice"))
        .await
        .unwrap();
    assert!(personal.is_personal());

    let listed = tasks.fetch(&TaskQuery::project(project.id)).await;
    assert_eq!(listed, vec![task.clone()]);

    // Step 5: reorder through the query-string endpoint.
    let moved = tasks.update_order(task.id, 3).await.unwrap();
    assert_eq!(moved.order, 3);
    assert_eq!(tasks.items()[0].order, 3);

    // Step 6: todos live under their task.
    assert!(todos.fetch_for_task(task.id).await.is_empty());
    let todo = todos
        .create(&TodoDraft::new(task.id, "Hero copy"))
        .await
        .unwrap();
    assert_eq!(todos.todos_for(task.id), vec![todo.clone()]);

    let done = todos
        .update(
            todo.id,
            &TodoPatch {
                completed: Some(true),
                ..TodoPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(done.completed);
    assert!(todos.todos_for(task.id)[0].completed);

    let page = todos.fetch_page(&TodoListQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].task_name.as_deref(), Some("Landing page"));

    // Step 7: deletes reconcile, and a second delete surfaces the server's detail.
    todos.delete(todo.id).await.unwrap();
    assert!(todos.todos_for(task.id).is_empty());

    let err = todos.delete(todo.id).await.unwrap_err();
    assert_eq!(err, ApiError::http(404, "Todo not found"));
    assert_eq!(todos.error().as_deref(), Some("Todo not found"));

    tasks.delete(task.id).await.unwrap();
    assert!(tasks.items().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(&format!("http://{addr}"));
    let client = Arc::new(ApiClient::new(config, ReqwestTransport::new()));
    let tasks = TaskStore::new(client);

    assert!(tasks.fetch(&TaskQuery::default()).await.is_empty());
    assert_eq!(
        tasks.error().as_deref(),
        Some("Network error: unable to reach the server.")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_body_after_timely_headers_is_not_a_timeout() {
    let base = start_slow_server(Duration::ZERO, Duration::from_millis(1500)).await;
    let config = ClientConfig::new(&base).with_timeout(Duration::from_secs(1));
    let client = ApiClient::new(config, ReqwestTransport::new());

    let value: Value = client.get("/slow").await.unwrap();
    assert_eq!(value, json!({"a": 1}));
}

#[tokio::test(flavor = "multi_thread")]
async fn late_headers_are_a_timeout() {
    let base = start_slow_server(Duration::from_secs(3), Duration::ZERO).await;
    let config = ClientConfig::new(&base).with_timeout(Duration::from_secs(1));
    let client = ApiClient::new(config, ReqwestTransport::new());

    let err = client.get::<Value>("/slow").await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}
