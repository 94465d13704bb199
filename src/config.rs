//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables. Every
//! setting has a constants-backed default; deployments override them via a
//! ConfigMap mapped into the pod environment with `envFrom`.

use crate::constants::{
    DEFAULT_BACKOFF_MAX_MS, DEFAULT_BACKOFF_START_MS, DEFAULT_METRICS_PORT,
    DEFAULT_WATCH_RESTART_DELAY_AFTER_END_SECS, DEFAULT_WATCH_RESTART_DELAY_SECS,
};

/// Controller-level configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// HTTP server port for metrics and health probes
    pub metrics_port: u16,
    /// Exponential backoff starting value for watch stream restarts (milliseconds)
    pub backoff_start_ms: u64,
    /// Exponential backoff maximum value for watch stream restarts (milliseconds)
    pub backoff_max_ms: u64,
    /// Delay before restarting the watch stream after unknown errors (seconds)
    pub watch_restart_delay_secs: u64,
    /// Delay before restarting the watch stream after it ends normally (seconds)
    pub watch_restart_delay_after_end_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            metrics_port: DEFAULT_METRICS_PORT,
            backoff_start_ms: DEFAULT_BACKOFF_START_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            watch_restart_delay_secs: DEFAULT_WATCH_RESTART_DELAY_SECS,
            watch_restart_delay_after_end_secs: DEFAULT_WATCH_RESTART_DELAY_AFTER_END_SECS,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            backoff_start_ms: env_var_or_default("BACKOFF_START_MS", DEFAULT_BACKOFF_START_MS),
            backoff_max_ms: env_var_or_default("BACKOFF_MAX_MS", DEFAULT_BACKOFF_MAX_MS),
            watch_restart_delay_secs: env_var_or_default(
                "WATCH_RESTART_DELAY_SECS",
                DEFAULT_WATCH_RESTART_DELAY_SECS,
            ),
            watch_restart_delay_after_end_secs: env_var_or_default(
                "WATCH_RESTART_DELAY_AFTER_END_SECS",
                DEFAULT_WATCH_RESTART_DELAY_AFTER_END_SECS,
            ),
        }
    }
}

/// Read an environment variable or return the default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();

        assert_eq!(config.metrics_port, DEFAULT_METRICS_PORT);
        assert_eq!(config.backoff_start_ms, DEFAULT_BACKOFF_START_MS);
        assert_eq!(config.backoff_max_ms, DEFAULT_BACKOFF_MAX_MS);
    }

    #[test]
    fn test_missing_env_value_falls_back_to_default() {
        assert_eq!(env_var_or_default("UNSET_TTL_CONTROLLER_VAR", 42_u64), 42);
    }
}
