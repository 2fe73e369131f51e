//! Projects: `/api/v1/projects`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SortOrder;
use crate::query::Query;
use crate::resource::{FlatCache, Identified, Resource};
use crate::store::ResourceStore;
use crate::transport::Transport;
use crate::wire::{empty_as_null, string_list, text_or_empty};

/// A project as the server sends it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_month: Option<String>,
    #[serde(default)]
    pub end_month: Option<String>,
    /// Expected to be a list of names; tolerated as anything.
    #[serde(default)]
    pub assignee: Value,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    /// `YYYY-MM`, or empty when unset.
    pub start_month: String,
    pub end_month: String,
    pub assignee: Vec<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            start_month: text_or_empty(record.start_month),
            end_month: text_or_empty(record.end_month),
            assignee: string_list(record.assignee),
            description: record.description,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl Identified for Project {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Create payload. Empty months and descriptions are sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectDraft {
    pub name: String,
    #[serde(serialize_with = "empty_as_null")]
    pub start_month: String,
    #[serde(serialize_with = "empty_as_null")]
    pub end_month: String,
    pub assignee: Vec<String>,
    pub description: Option<String>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl From<&Project> for ProjectDraft {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            start_month: project.start_month.clone(),
            end_month: project.end_month.clone(),
            assignee: project.assignee.clone(),
            description: project.description.clone().filter(|d| !d.is_empty()),
        }
    }
}

/// Partial update. `None` leaves a field alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_month: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_month: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

/// Filters, paging and sorting for the project list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectQuery {
    pub assignee: Option<String>,
    pub name: Option<String>,
    pub start_month: Option<String>,
    pub end_month: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ProjectQuery {
    pub fn for_assignee(assignee: impl Into<String>) -> Self {
        Self {
            assignee: Some(assignee.into()),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .push_text("assignee", self.assignee.as_deref())
            .push_text("name", self.name.as_deref())
            .push_text("start_month", self.start_month.as_deref())
            .push_text("end_month", self.end_month.as_deref())
            .push_opt("skip", self.skip)
            .push_opt("limit", self.limit)
            .push_text("sort_by", self.sort_by.as_deref())
            .push_opt("sort_order", self.sort_order);
        query
    }
}

pub struct Projects;

impl Resource for Projects {
    const KIND: &'static str = "project";
    const COLLECTION: &'static str = "/api/v1/projects";

    type Record = ProjectRecord;
    type Model = Project;
    type Draft = ProjectDraft;
    type Patch = ProjectPatch;
    type Cache = FlatCache<Project>;

    fn cache_key(_model: &Project) {}
}

pub type ProjectStore<T> = ResourceStore<Projects, T>;

impl<T: Transport> ResourceStore<Projects, T> {
    /// Replace the cached list with the projects matching `query`.
    ///
    /// Failures are recorded in `error()` and yield an empty result; the
    /// previous cache is left as it was.
    pub async fn fetch(&self, query: &ProjectQuery) -> Vec<Project> {
        let endpoint = query.to_query().append_to(Projects::COLLECTION);
        self.fetch_into(&endpoint, ()).await.unwrap_or_default()
    }
}
