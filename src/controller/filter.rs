//! # Admission Filter
//!
//! Decides which watched Operations are worth running through the TTL
//! reconciler at all. The watch trigger consults this before any API read,
//! so resources that can never expire (still running, no TTL policy,
//! already being deleted) cost nothing beyond the watch event itself.

use crate::crd::Operation;

/// Annotation that opts a resource out of TTL cleanup entirely.
///
/// Set by external tooling that takes over lifecycle management of an
/// Operation, e.g. when a record is kept for auditing.
pub const SKIP_CLEANUP_ANNOTATION: &str = "operations.octopilot.io/skip-ttl-cleanup";

/// Whether an observed Operation is a candidate for TTL cleanup.
///
/// A candidate has a finished task, carries a TTL policy, is not already
/// being deleted, and has not opted out via [`SKIP_CLEANUP_ANNOTATION`].
/// Everything else is a permanent no-op for this controller.
pub fn is_cleanup_candidate(operation: &Operation) -> bool {
    operation.is_finished()
        && operation.ttl_seconds_after_finished().is_some()
        && !operation.deletion_requested()
        && !cleanup_disabled(operation)
}

fn cleanup_disabled(operation: &Operation) -> bool {
    operation
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(SKIP_CLEANUP_ANNOTATION))
        .is_some_and(|value| value == "true")
}
