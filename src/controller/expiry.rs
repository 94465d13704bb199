//! # Expiry
//!
//! TTL expiry evaluation and requeue planning for finished Operations.
//!
//! Both functions take `now` as an explicit parameter instead of reading the
//! wall clock, so the reconciler stays deterministic under test.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;

/// Whether the TTL has elapsed since the task finished.
///
/// Strict comparison: a resource whose TTL elapses exactly at `now` is not
/// yet expired and will be picked up by the follow-up reconcile.
pub fn is_expired(ttl: ChronoDuration, finished_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(finished_at) > ttl
}

/// Delay until a not-yet-expired resource should be rechecked.
///
/// Truncating the remaining time to whole seconds can land the requeue one
/// tick before actual expiry, so one second is always added on top. The
/// returned delay is therefore never below one second, and the reconcile it
/// schedules observes true expiry instead of looping on the boundary.
pub fn requeue_delay(ttl: ChronoDuration, finished_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let cleanup_at = finished_at + ttl;
    let remaining_seconds = cleanup_at.signed_duration_since(now).num_seconds().max(0);
    Duration::from_secs(remaining_seconds.unsigned_abs() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl(seconds: i64) -> ChronoDuration {
        ChronoDuration::seconds(seconds)
    }

    #[test]
    fn test_expired_when_ttl_elapsed() {
        let now = Utc::now();
        let finished_at = now - ttl(61);

        assert!(is_expired(ttl(60), finished_at, now));
    }

    #[test]
    fn test_not_expired_before_ttl_elapsed() {
        let now = Utc::now();
        let finished_at = now - ttl(59);

        assert!(!is_expired(ttl(60), finished_at, now));
    }

    #[test]
    fn test_exact_ttl_boundary_is_not_expired() {
        let now = Utc::now();
        let finished_at = now - ttl(60);

        assert!(!is_expired(ttl(60), finished_at, now));
    }

    #[test]
    fn test_future_finished_at_is_not_expired() {
        let now = Utc::now();
        let finished_at = now + ttl(30);

        assert!(!is_expired(ttl(60), finished_at, now));
    }

    #[test]
    fn test_negative_ttl_is_already_expired() {
        let now = Utc::now();

        assert!(is_expired(ttl(-1), now, now));
    }

    #[test]
    fn test_requeue_delay_adds_one_second_margin() {
        let now = Utc::now();
        let finished_at = now - ttl(59);

        // 1s remaining until cleanup, rounded up to 2s.
        assert_eq!(requeue_delay(ttl(60), finished_at, now), Duration::from_secs(2));
    }

    #[test]
    fn test_requeue_delay_is_at_least_one_second() {
        let now = Utc::now();
        let finished_at = now - ChronoDuration::milliseconds(59_700);

        let delay = requeue_delay(ttl(60), finished_at, now);
        assert!(delay >= Duration::from_secs(1));
    }

    #[test]
    fn test_requeue_delay_decreases_as_now_advances() {
        let start = Utc::now();
        let finished_at = start;
        let ttl = ttl(120);

        let mut previous = requeue_delay(ttl, finished_at, start);
        for elapsed in 1..120 {
            let delay = requeue_delay(ttl, finished_at, start + ChronoDuration::seconds(elapsed));
            assert!(delay < previous, "delay must shrink as cleanup time nears");
            previous = delay;
        }
    }

    #[test]
    fn test_requeue_delay_covers_full_ttl_when_just_finished() {
        let now = Utc::now();

        assert_eq!(requeue_delay(ttl(600), now, now), Duration::from_secs(601));
    }
}
