//! # Reconciler
//!
//! TTL reconciliation for Operation resources.
//!
//! Each reconcile pass re-derives everything from freshly read state, so the
//! reconciler itself is stateless and safe under redelivery, restart, and
//! concurrent replicas. One pass is a straight-line decision:
//!
//! 1. Fetch the Operation. Already gone means there is nothing to do.
//! 2. Without a TTL policy or a finished timestamp, stop permanently.
//! 3. Expired: delete (treating "already gone" as success).
//! 4. Not expired: requeue for the remaining TTL.

use crate::constants::{
    DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS, ERROR_BACKOFF_MAX_SECS, ERROR_BACKOFF_MIN_SECS,
};
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::store::{KubeOperationStore, OperationRef, OperationStore, StoreError};
use crate::controller::{expiry, filter};
use crate::crd::Operation;
use crate::observability::metrics;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use kube::Client;
use kube_runtime::controller::Action;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Failures of a single reconcile pass, scoped to one resource
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("failed to fetch operation {key}: {source}")]
    Fetch {
        key: OperationRef,
        #[source]
        source: StoreError,
    },
    #[error("failed to delete expired operation {key}: {source}")]
    Delete {
        key: OperationRef,
        #[source]
        source: StoreError,
    },
}

/// Outcome of one reconcile pass
///
/// The scheduler stops on [`Done`](ReconcileOutcome::Done), redelivers after
/// the delay on [`RequeueAfter`](ReconcileOutcome::RequeueAfter), and applies
/// its backoff policy on [`Failed`](ReconcileOutcome::Failed).
#[derive(Debug)]
pub enum ReconcileOutcome {
    Done,
    RequeueAfter(Duration),
    Failed(ReconcilerError),
}

/// The TTL reconciliation state machine, generic over the resource store
#[derive(Debug)]
pub struct TtlReconciler<S> {
    store: S,
}

impl<S: OperationStore> TtlReconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run one reconcile pass against the current wall clock.
    pub async fn reconcile(&self, key: &OperationRef) -> ReconcileOutcome {
        self.reconcile_at(key, Utc::now()).await
    }

    /// Run one reconcile pass, evaluating expiry against `now`.
    pub async fn reconcile_at(&self, key: &OperationRef, now: DateTime<Utc>) -> ReconcileOutcome {
        let operation = match self.store.get(&key.namespace, &key.name).await {
            Ok(operation) => operation,
            Err(StoreError::NotFound) => {
                // Deleted after the reconcile request was enqueued.
                debug!(resource = %key, "operation already gone, nothing to clean up");
                return ReconcileOutcome::Done;
            }
            Err(source) => {
                return ReconcileOutcome::Failed(ReconcilerError::Fetch {
                    key: key.clone(),
                    source,
                });
            }
        };

        let (ttl_seconds, finished_at) = match (
            operation.ttl_seconds_after_finished(),
            operation.current_task_finished_at(),
        ) {
            (Some(ttl_seconds), Some(finished_at)) => (ttl_seconds, finished_at),
            // No TTL policy or not finished yet: permanently out of scope.
            _ => return ReconcileOutcome::Done,
        };

        let ttl = ChronoDuration::seconds(ttl_seconds);
        let cleanup_at = finished_at + ttl;

        if expiry::is_expired(ttl, finished_at, now) {
            debug!(
                resource = %key,
                finished_at = %finished_at,
                cleanup_at = %cleanup_at,
                "cleaning up finished operation"
            );
            match self.delete_expired(key).await {
                Ok(()) => ReconcileOutcome::Done,
                Err(error) => ReconcileOutcome::Failed(error),
            }
        } else {
            let delay = expiry::requeue_delay(ttl, finished_at, now);
            debug!(
                resource = %key,
                cleanup_at = %cleanup_at,
                delay_secs = delay.as_secs(),
                "requeueing until operation TTL expires"
            );
            ReconcileOutcome::RequeueAfter(delay)
        }
    }

    /// Delete an expired Operation, treating "already gone" as success.
    ///
    /// The not-found normalization is what keeps repeated delivery of the
    /// same reconcile request from surfacing spurious failures.
    async fn delete_expired(&self, key: &OperationRef) -> Result<(), ReconcilerError> {
        match self.store.delete(&key.namespace, &key.name).await {
            Ok(()) => {
                metrics::increment_operations_deleted();
                Ok(())
            }
            Err(StoreError::NotFound) => {
                debug!(resource = %key, "operation deleted concurrently, treating as success");
                Ok(())
            }
            Err(source) => Err(ReconcilerError::Delete {
                key: key.clone(),
                source,
            }),
        }
    }
}

/// Shared state handed to every controller-driven reconcile
#[derive(Debug)]
pub struct ReconcileContext {
    reconciler: TtlReconciler<KubeOperationStore>,
    backoffs: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl ReconcileContext {
    pub fn new(client: Client) -> Self {
        Self {
            reconciler: TtlReconciler::new(KubeOperationStore::new(client)),
            backoffs: Mutex::new(HashMap::new()),
        }
    }

    /// Next retry delay for a failing resource.
    ///
    /// Backoff state is tracked per resource so one failing Operation does
    /// not slow down retries for the others.
    pub fn next_error_backoff(&self, key: &OperationRef) -> Duration {
        match self.backoffs.lock() {
            Ok(mut backoffs) => backoffs
                .entry(key.to_string())
                .or_insert_with(|| {
                    FibonacciBackoff::new(ERROR_BACKOFF_MIN_SECS, ERROR_BACKOFF_MAX_SECS)
                })
                .next_backoff(),
            Err(err) => {
                warn!("failed to lock backoff state: {err}, using default requeue");
                Duration::from_secs(DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS)
            }
        }
    }

    /// Drop retry state for a resource after a successful pass.
    pub fn clear_backoff(&self, key: &OperationRef) {
        if let Ok(mut backoffs) = self.backoffs.lock() {
            backoffs.remove(&key.to_string());
        }
    }
}

/// Controller entry point, driven by the kube runtime scheduler.
pub async fn reconcile(
    operation: Arc<Operation>,
    ctx: Arc<ReconcileContext>,
) -> Result<Action, ReconcilerError> {
    let key = OperationRef::from(operation.as_ref());

    if !filter::is_cleanup_candidate(&operation) {
        debug!(resource = %key, "skipping reconcile, operation is not a cleanup candidate");
        return Ok(Action::await_change());
    }

    metrics::increment_reconciliations();
    let started = Instant::now();
    let outcome = ctx.reconciler.reconcile(&key).await;
    metrics::observe_reconcile_duration(started.elapsed().as_secs_f64());

    match outcome {
        ReconcileOutcome::Done => {
            ctx.clear_backoff(&key);
            Ok(Action::await_change())
        }
        ReconcileOutcome::RequeueAfter(delay) => {
            ctx.clear_backoff(&key);
            metrics::increment_requeues("ttl-pending");
            Ok(Action::requeue(delay))
        }
        ReconcileOutcome::Failed(error) => Err(error),
    }
}
