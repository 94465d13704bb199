//! # Observability
//!
//! Prometheus metrics for the Operation TTL controller.

pub mod metrics;
