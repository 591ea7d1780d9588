//! Task domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskboard_core::TaskId;

/// A task record.
///
/// `created_by_user` and `created_date` are stamped server-side at creation
/// and never taken from a request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID.
    pub id: TaskId,
    /// Task name.
    pub name: String,
    /// Username of the caller who created the task.
    pub created_by_user: String,
    /// When the task was created.
    pub created_date: DateTime<Utc>,
}

/// Request body for creating or updating a task.
///
/// A non-nil `id` on POST means "update that record"; the create endpoint
/// delegates to the update path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    /// Optional explicit id; present when a create is really an update.
    #[serde(default)]
    pub id: Option<TaskId>,
    /// Task name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serializes_with_camel_case_keys() {
        let task = Task {
            id: TaskId::generate(),
            name: "Learn Rust".to_string(),
            created_by_user: "dummy_user".to_string(),
            created_date: Utc::now(),
        };

        let json = serde_json::to_value(&task).expect("serialize");
        assert_eq!(json["name"], "Learn Rust");
        assert_eq!(json["createdByUser"], "dummy_user");
        assert!(json["createdDate"].is_string());
    }

    #[test]
    fn test_payload_id_defaults_to_none() {
        let payload: TaskPayload =
            serde_json::from_str(r#"{"name": "New Task"}"#).expect("deserialize");
        assert!(payload.id.is_none());
        assert_eq!(payload.name, "New Task");
    }
}
