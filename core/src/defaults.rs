//! Built-in status set shown when the server's statuses are unavailable.

use crate::resources::task::PERSONAL_PROJECT_ID;
use crate::resources::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDefinition {
    pub name: &'static str,
    pub display_name: &'static str,
    pub order: i64,
    pub color: &'static str,
}

pub const DEFAULT_STATUS_DEFINITIONS: [StatusDefinition; 7] = [
    StatusDefinition { name: "considering", display_name: "Considering", order: 0, color: "#9e9e9e" },
    StatusDefinition { name: "not_started", display_name: "Not started", order: 1, color: "#667eea" },
    StatusDefinition { name: "in_progress", display_name: "In progress", order: 2, color: "#ffa726" },
    StatusDefinition { name: "review_pending", display_name: "Review pending", order: 3, color: "#9c27b0" },
    StatusDefinition { name: "staging_deployed", display_name: "Deployed to staging", order: 4, color: "#ffeb3b" },
    StatusDefinition { name: "production_deployed", display_name: "Deployed to production", order: 5, color: "#51cf66" },
    StatusDefinition { name: "cancelled", display_name: "Cancelled", order: 6, color: "#dc3545" },
];

/// The shared set as personal-task statuses, with ids -1..=-7.
pub fn default_personal_statuses() -> Vec<Status> {
    DEFAULT_STATUS_DEFINITIONS
        .iter()
        .zip(1i64..)
        .map(|(def, n)| Status {
            id: -n,
            name: def.name.to_string(),
            display_name: def.display_name.to_string(),
            order: def.order,
            color: def.color.to_string(),
            project_id: Some(PERSONAL_PROJECT_ID),
            created_at: None,
        })
        .collect()
}
