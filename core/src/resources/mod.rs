//! The four backend resources and their store instantiations.

pub mod project;
pub mod status;
pub mod task;
pub mod todo;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use project::{Project, ProjectDraft, ProjectPatch, ProjectQuery, ProjectRecord, ProjectStore, Projects};
pub use status::{Status, StatusDraft, StatusPatch, StatusRecord, StatusStore, Statuses};
pub use task::{Task, TaskDraft, TaskPatch, TaskQuery, TaskRecord, TaskStore, Tasks, PERSONAL_PROJECT_ID};
pub use todo::{Todo, TodoDraft, TodoListQuery, TodoPatch, TodoRecord, TodoStore, TodoSummary, Todos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}
