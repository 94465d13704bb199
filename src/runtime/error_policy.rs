//! # Error Policy
//!
//! Error handling and backoff logic for the controller watch loop. Handles
//! both reconciliation errors (per-resource backoff) and watch stream
//! errors (classification plus stream-level backoff).

use crate::controller::reconciler::{ReconcileContext, ReconcilerError};
use crate::controller::store::OperationRef;
use crate::crd::Operation;
use crate::observability::metrics;
use kube_runtime::controller::Action;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Handle a failed reconcile with per-resource Fibonacci backoff.
///
/// Tracking backoff per resource keeps one persistently failing Operation
/// from slowing down retries for every other resource on the queue.
pub fn handle_reconcile_error(
    operation: Arc<Operation>,
    error: &ReconcilerError,
    ctx: Arc<ReconcileContext>,
) -> Action {
    let key = OperationRef::from(operation.as_ref());

    error!(resource = %key, error = %error, "reconciliation failed");
    metrics::increment_reconciliation_errors();

    let delay = ctx.next_error_backoff(&key);
    info!(
        resource = %key,
        delay_secs = delay.as_secs(),
        "requeueing failed reconcile with backoff"
    );
    metrics::increment_requeues("error-backoff");

    Action::requeue(delay)
}

/// Classify a watch stream error and decide whether the stream may continue.
///
/// Returns `Some(())` to keep consuming the stream, `None` to drop the event
/// and let the watch loop restart.
pub async fn handle_watch_stream_error(
    error_string: &str,
    backoff_ms: &Arc<AtomicU64>,
    max_backoff_ms: u64,
    watch_restart_delay_secs: u64,
) -> Option<()> {
    // Check 404 before 401: a 404 served as plain text surfaces as a serde
    // error whose chain also mentions the watch failing.
    let is_not_found = error_string.contains("ObjectNotFound")
        || error_string.contains("404")
        || error_string.contains("not found");
    let is_unauthorized =
        (error_string.contains("401") || error_string.contains("Unauthorized")) && !is_not_found;
    let is_expired = error_string.contains("410")
        || error_string.contains("too old resource version")
        || error_string.contains("Expired")
        || error_string.contains("Gone");
    let is_throttled = error_string.contains("429")
        || error_string.contains("storage is (re)initializing")
        || error_string.contains("TooManyRequests");

    if is_unauthorized {
        error!(
            "Watch authentication failed (401 Unauthorized) - RBAC may have been revoked or the \
             service account token expired; check the ClusterRoleBinding for the controller"
        );
        tokio::time::sleep(std::time::Duration::from_secs(watch_restart_delay_secs)).await;
        None
    } else if is_expired {
        // Normal during API server restarts; the watch re-lists on restart.
        warn!("Watch resource version expired (410), watch will restart");
        None
    } else if is_throttled {
        let current = backoff_ms.load(Ordering::Relaxed);
        warn!(
            "API server throttling watch requests (429), backing off for {}ms before restart",
            current
        );
        tokio::time::sleep(std::time::Duration::from_millis(current)).await;
        backoff_ms.store(std::cmp::min(current * 2, max_backoff_ms), Ordering::Relaxed);
        None
    } else if is_not_found {
        // Expected when the CRD is not yet installed or a resource vanished
        // between list and watch.
        warn!(
            "Watched resource not found (404), continuing - is the Operation CRD installed? \
             Error: {}",
            error_string
        );
        Some(())
    } else {
        error!("Controller stream error: {}", error_string);
        tokio::time::sleep(std::time::Duration::from_secs(watch_restart_delay_secs)).await;
        None
    }
}
