//! # CRD Validation Tests
//!
//! Verifies that the Operation CRD serializes with the expected wire
//! format (camelCase fields, optional TTL) and that manifests written by
//! the operation runner deserialize into the helpers the reconciler reads.

use kube::core::CustomResourceExt;
use operation_ttl_controller::controller::filter;
use operation_ttl_controller::crd::{Operation, TaskState};

const FINISHED_OPERATION: &str = r#"
apiVersion: operations.octopilot.io/v1alpha1
kind: Operation
metadata:
  name: rebalance-7f2a
  namespace: kafka
spec:
  operation: rebalance
  parameters:
    disks: "2"
  ttlSecondsAfterFinished: 300
status:
  currentTask:
    state: Succeeded
    startedAt: "2024-05-01T10:00:00Z"
    finishedAt: "2024-05-01T10:05:00Z"
"#;

const RUNNING_OPERATION: &str = r#"
apiVersion: operations.octopilot.io/v1alpha1
kind: Operation
metadata:
  name: upgrade-3c1d
  namespace: kafka
spec:
  operation: upgrade
status:
  currentTask:
    state: Running
    startedAt: "2024-05-01T10:00:00Z"
"#;

#[test]
fn test_finished_manifest_deserializes() {
    let operation: Operation =
        serde_yaml::from_str(FINISHED_OPERATION).expect("manifest deserializes");

    assert_eq!(operation.spec.operation, "rebalance");
    assert_eq!(operation.ttl_seconds_after_finished(), Some(300));
    assert!(operation.is_finished());

    let finished_at = operation
        .current_task_finished_at()
        .expect("finished timestamp parses");
    assert_eq!(finished_at.to_rfc3339(), "2024-05-01T10:05:00+00:00");

    assert!(filter::is_cleanup_candidate(&operation));
}

#[test]
fn test_running_manifest_without_ttl_is_not_a_candidate() {
    let operation: Operation =
        serde_yaml::from_str(RUNNING_OPERATION).expect("manifest deserializes");

    assert_eq!(operation.ttl_seconds_after_finished(), None);
    assert!(!operation.is_finished());
    assert!(operation.current_task_finished_at().is_none());
    assert!(!filter::is_cleanup_candidate(&operation));
}

#[test]
fn test_task_state_round_trips_as_plain_variant_names() {
    let state: TaskState = serde_yaml::from_str("Succeeded").expect("state deserializes");
    assert_eq!(state, TaskState::Succeeded);
    assert!(state.is_terminal());
}

#[test]
fn test_generated_crd_shape() {
    let crd = Operation::crd();

    assert_eq!(
        crd.metadata.name.as_deref(),
        Some("operations.operations.octopilot.io")
    );
    assert_eq!(crd.spec.group, "operations.octopilot.io");
    assert_eq!(crd.spec.names.kind, "Operation");

    let yaml = serde_yaml::to_string(&crd).expect("CRD serializes");
    assert!(yaml.contains("ttlSecondsAfterFinished"));
    assert!(yaml.contains("currentTask"));
}
