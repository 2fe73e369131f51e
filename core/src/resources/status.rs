//! Statuses: the columns a task moves through.

use serde::{Deserialize, Serialize};

use crate::defaults::default_personal_statuses;
use crate::query::Query;
use crate::resource::{FlatCache, Identified, Resource};
use crate::store::ResourceStore;
use crate::transport::Transport;

pub const DEFAULT_STATUS_COLOR: &str = "#667eea";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusRecord {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub color: Option<String>,
    /// `None` for statuses shared by every project.
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub order: i64,
    pub color: String,
    pub project_id: Option<i64>,
    pub created_at: Option<String>,
}

impl From<StatusRecord> for Status {
    fn from(record: StatusRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            display_name: record.display_name,
            order: record.order,
            color: record
                .color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS_COLOR.to_string()),
            project_id: record.project_id,
            created_at: record.created_at,
        }
    }
}

impl Identified for Status {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDraft {
    pub name: String,
    pub display_name: String,
    pub order: i64,
    pub color: String,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<i64>>,
}

pub struct Statuses;

impl Resource for Statuses {
    const KIND: &'static str = "status";
    const COLLECTION: &'static str = "/api/v1/statuses";

    type Record = StatusRecord;
    type Model = Status;
    type Draft = StatusDraft;
    type Patch = StatusPatch;
    type Cache = FlatCache<Status>;

    fn cache_key(_model: &Status) {}
}

pub type StatusStore<T> = ResourceStore<Statuses, T>;

impl<T> ResourceStore<Statuses, T> {
    /// The cached statuses, or the built-in set when nothing is cached.
    pub fn display_statuses(&self) -> Vec<Status> {
        let cached = self.items();
        if cached.is_empty() {
            default_personal_statuses()
        } else {
            cached
        }
    }
}

impl<T: Transport> ResourceStore<Statuses, T> {
    /// Statuses for `project_id`, or the shared ones when `None`.
    ///
    /// Failures are recorded in `error()` and yield an empty result.
    pub async fn fetch(&self, project_id: Option<i64>) -> Vec<Status> {
        let mut query = Query::new();
        query.push_opt("project_id", project_id);
        let endpoint = query.append_to(Statuses::COLLECTION);
        self.fetch_into(&endpoint, ()).await.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_color_gets_default() {
        let status: Status = serde_json::from_value::<StatusRecord>(json!({
            "id": 2,
            "name": "in_progress",
            "display_name": "In progress",
            "order": 2,
            "color": null,
            "project_id": null
        }))
        .unwrap()
        .into();
        assert_eq!(status.color, DEFAULT_STATUS_COLOR);
        assert_eq!(status.project_id, None);
        assert_eq!(serde_json::to_value(&status).unwrap()["displayName"], "In progress");
    }
}
