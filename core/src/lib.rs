//! Async API client core for the taskboard service.
//!
//! # Overview
//! Two layers. `ApiClient` runs one HTTP request: it builds an
//! `HttpRequest`, executes it through a `Transport` (a deadline on the headers, or a
//! caller's `CancelToken`), and parses the `HttpResponse` into JSON or a
//! uniform `ApiError`. `ResourceStore` sits on top and keeps a cached,
//! reconciled reflection of one backend resource (projects, tasks, todos,
//! statuses) together with `loading`/`error` state.
//!
//! # Design
//! - Building and parsing are pure; only the transport does I/O.
//! - Stores are plain values constructed by the caller and share one
//!   `Arc<ApiClient>`; there is no global state apart from the base URL,
//!   which is read from the environment once.
//! - Wire records are snake_case; models serialize camelCase for UI code.
//! - Nothing is retried. The server stays the source of truth.

pub mod cancel;
pub mod client;
pub mod config;
pub mod defaults;
pub mod error;
pub mod http;
pub mod query;
pub mod resource;
pub mod resources;
pub mod store;
pub mod transport;
pub mod ui_state;
mod wire;

pub use cancel::CancelToken;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{error_message, ApiError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use resource::{Cache, FlatCache, GroupedCache, Identified, Page, Resource};
pub use resources::{
    Project, ProjectDraft, ProjectPatch, ProjectQuery, ProjectStore, SortOrder, Status, StatusStore, Task,
    TaskDraft, TaskPatch, TaskQuery, TaskStore, Todo, TodoDraft, TodoListQuery, TodoPatch, TodoStore,
    TodoSummary, PERSONAL_PROJECT_ID,
};
pub use store::ResourceStore;
pub use transport::{ReqwestTransport, ResponseBody, ResponseHead, Transport, TransportError};
