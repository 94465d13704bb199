//! # Constants
//!
//! Shared defaults used throughout the controller. Values that matter for
//! deployments can be overridden via environment variables, see
//! [`crate::config::ControllerConfig`].

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default requeue interval when backoff state is unavailable (seconds)
pub const DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS: u64 = 60;

/// Default exponential backoff starting value for watch stream restarts (milliseconds)
pub const DEFAULT_BACKOFF_START_MS: u64 = 1000;

/// Default exponential backoff maximum value for watch stream restarts (milliseconds)
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 30_000;

/// Default delay before restarting the watch stream after unknown errors (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Default delay before restarting the watch stream after it ends (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_AFTER_END_SECS: u64 = 1;

/// Minimum per-resource backoff after a failed reconcile (seconds)
pub const ERROR_BACKOFF_MIN_SECS: u64 = 5;

/// Maximum per-resource backoff after repeated failed reconciles (seconds)
pub const ERROR_BACKOFF_MAX_SECS: u64 = 600;
