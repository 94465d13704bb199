//! # Operation CRD
//!
//! The Operation custom resource represents one long-running asynchronous
//! task managed by an external operation runner. This controller never
//! creates or mutates Operations; it only deletes them once their
//! `ttlSecondsAfterFinished` policy has elapsed.
//!
//! # Example
//!
//! ```yaml
//! apiVersion: operations.octopilot.io/v1alpha1
//! kind: Operation
//! metadata:
//!   name: rebalance-7f2a
//!   namespace: default
//! spec:
//!   operation: rebalance
//!   ttlSecondsAfterFinished: 300
//! ```

use crate::crd::status::OperationStatus;
use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operation Custom Resource Definition
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "Operation",
    group = "operations.octopilot.io",
    version = "v1alpha1",
    namespaced,
    status = "OperationStatus",
    printcolumn = r#"{"name":"Operation", "type":"string", "jsonPath":".spec.operation"}"#,
    printcolumn = r#"{"name":"State", "type":"string", "jsonPath":".status.currentTask.state"}"#,
    printcolumn = r#"{"name":"Finished", "type":"string", "jsonPath":".status.currentTask.finishedAt"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    /// Identifier of the task the operation runner executes.
    /// Opaque to this controller; only the runner interprets it.
    pub operation: String,
    /// Free-form parameters handed to the operation runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
    /// Seconds to keep the resource around after its task finishes.
    /// Absent means the resource is never cleaned up automatically.
    /// A negative value is treated as already elapsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds_after_finished: Option<i64>,
}

impl Operation {
    /// TTL policy for this resource, if one is set.
    pub fn ttl_seconds_after_finished(&self) -> Option<i64> {
        self.spec.ttl_seconds_after_finished
    }

    /// Completion time of the current task, if it has one.
    ///
    /// Malformed timestamps are treated as absent: the resource then stays
    /// out of TTL cleanup rather than being deleted on bad data.
    pub fn current_task_finished_at(&self) -> Option<DateTime<Utc>> {
        let finished_at = self
            .status
            .as_ref()?
            .current_task
            .as_ref()?
            .finished_at
            .as_deref()?;
        DateTime::parse_from_rfc3339(finished_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Whether the current task has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|status| status.current_task.as_ref())
            .is_some_and(|task| task.state.is_terminal())
    }

    /// Whether deletion has already been requested for this resource.
    pub fn deletion_requested(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::status::{TaskState, TaskStatus};

    fn operation_with_task(task: Option<TaskStatus>) -> Operation {
        let mut operation = Operation::new(
            "rebalance-7f2a",
            OperationSpec {
                operation: "rebalance".to_string(),
                parameters: None,
                ttl_seconds_after_finished: Some(300),
            },
        );
        operation.status = Some(OperationStatus {
            current_task: task,
            ..OperationStatus::default()
        });
        operation
    }

    #[test]
    fn test_finished_at_parses_rfc3339() {
        let operation = operation_with_task(Some(TaskStatus {
            state: TaskState::Succeeded,
            started_at: None,
            finished_at: Some("2024-05-01T10:05:00Z".to_string()),
        }));

        let finished_at = operation
            .current_task_finished_at()
            .expect("timestamp parses");
        assert_eq!(finished_at.to_rfc3339(), "2024-05-01T10:05:00+00:00");
    }

    #[test]
    fn test_malformed_finished_at_is_treated_as_absent() {
        let operation = operation_with_task(Some(TaskStatus {
            state: TaskState::Succeeded,
            started_at: None,
            finished_at: Some("yesterday-ish".to_string()),
        }));

        assert!(operation.current_task_finished_at().is_none());
    }

    #[test]
    fn test_missing_status_means_not_finished() {
        let mut operation = operation_with_task(None);
        operation.status = None;

        assert!(!operation.is_finished());
        assert!(operation.current_task_finished_at().is_none());
    }

    #[test]
    fn test_running_task_is_not_finished() {
        let operation = operation_with_task(Some(TaskStatus {
            state: TaskState::Running,
            started_at: Some("2024-05-01T10:00:00Z".to_string()),
            finished_at: None,
        }));

        assert!(!operation.is_finished());
    }

    #[test]
    fn test_spec_serializes_camel_case() {
        let spec = OperationSpec {
            operation: "rebalance".to_string(),
            parameters: None,
            ttl_seconds_after_finished: Some(60),
        };

        let json = serde_json::to_value(&spec).expect("spec serializes");
        assert_eq!(json["ttlSecondsAfterFinished"], 60);
        assert!(json.get("parameters").is_none());
    }
}
