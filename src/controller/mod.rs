//! # Controller
//!
//! Core controller modules for the Operation TTL controller.
//!
//! - `backoff`: Fibonacci backoff for reconciliation retries
//! - `expiry`: TTL expiry evaluation and requeue planning
//! - `filter`: admission predicate for watched Operations
//! - `reconciler`: the reconciliation state machine and controller entry point
//! - `store`: capability interface over the resource store

pub mod backoff;
pub mod expiry;
pub mod filter;
pub mod reconciler;
pub mod store;
