//! # Fibonacci Backoff
//!
//! Progressive backoff for reconciliation retries. Grows more slowly than
//! exponential backoff, which suits transient API-server failures: retries
//! stay frequent early on and settle at the cap instead of ballooning.
//!
//! Sequence with the default bounds (5s min, 600s max):
//! 5s, 5s, 10s, 15s, 25s, 40s, 65s, 105s, 170s, 275s, 445s, 600s (capped).

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each backoff is the sum of the previous two, capped at a maximum.
/// One instance tracks the retry history of a single resource.
///
/// # Example
///
/// ```
/// use operation_ttl_controller::controller::backoff::FibonacciBackoff;
///
/// let mut backoff = FibonacciBackoff::new(5, 600);
/// assert_eq!(backoff.next_backoff_seconds(), 5);
/// assert_eq!(backoff.next_backoff_seconds(), 5);
/// assert_eq!(backoff.next_backoff_seconds(), 10);
/// assert_eq!(backoff.next_backoff_seconds(), 15);
/// ```
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_seconds: u64,
    prev_seconds: u64,
    current_seconds: u64,
    max_seconds: u64,
}

impl FibonacciBackoff {
    /// Create a backoff bounded by `min_seconds` and `max_seconds`.
    #[must_use]
    pub fn new(min_seconds: u64, max_seconds: u64) -> Self {
        Self {
            min_seconds,
            prev_seconds: 0,
            current_seconds: min_seconds,
            max_seconds,
        }
    }

    /// Return the current backoff in seconds and advance the sequence.
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result = self.current_seconds;
        let next = self.prev_seconds + self.current_seconds;
        self.prev_seconds = self.current_seconds;
        self.current_seconds = std::cmp::min(next, self.max_seconds);
        result
    }

    /// Return the current backoff as a [`Duration`] and advance the sequence.
    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }

    /// Reset to the initial state, e.g. after a successful reconcile.
    pub fn reset(&mut self) {
        self.prev_seconds = 0;
        self.current_seconds = self.min_seconds;
    }
}
