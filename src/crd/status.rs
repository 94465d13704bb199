//! # Operation Status
//!
//! Status types for the Operation resource. The status is owned by the
//! operation runner; this controller only reads it to decide whether the
//! resource is eligible for TTL cleanup.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of the Operation resource
///
/// Written by the operation runner as the task progresses.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    /// Task currently (or most recently) executed for this operation
    #[serde(default)]
    pub current_task: Option<TaskStatus>,
    /// Number of times the runner retried the task
    #[serde(default)]
    pub retry_count: Option<i32>,
    /// Last error reported by the runner, if any
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Execution state of a single task run
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// Current state of the task
    pub state: TaskState,
    /// When the task started (RFC 3339)
    #[serde(default)]
    pub started_at: Option<String>,
    /// When the task reached a terminal state (RFC 3339)
    #[serde(default)]
    pub finished_at: Option<String>,
}

/// Lifecycle states a task moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    /// Terminal states never transition again; only they gate TTL cleanup.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Running.is_terminal());
    }

    #[test]
    fn test_status_fields_are_camel_case() {
        let status = OperationStatus {
            current_task: Some(TaskStatus {
                state: TaskState::Succeeded,
                started_at: Some("2024-05-01T10:00:00Z".to_string()),
                finished_at: Some("2024-05-01T10:05:00Z".to_string()),
            }),
            retry_count: Some(1),
            error_message: None,
        };

        let json = serde_json::to_value(&status).expect("status serializes");
        assert_eq!(json["currentTask"]["state"], "Succeeded");
        assert_eq!(json["currentTask"]["finishedAt"], "2024-05-01T10:05:00Z");
        assert_eq!(json["retryCount"], 1);
    }
}
