use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};

pub trait RateLimiter: Send + Sync {
    // true (and the request is recorded) if user_id is under its limit
    fn admit(&self, user_id: &str) -> bool;

    fn tracked_identities(&self) -> usize;
}

// Sliding window over the exact timestamps of admitted requests.
// A timestamp exactly `window` old still counts. Identities are never evicted.
pub struct SlidingWindowLimiter {
    limit: usize,
    window: TimeDelta,
    requests: DashMap<String, Vec<DateTime<Utc>>>, // user id -> admitted timestamps, oldest first
    clock: Arc<dyn Clock>,
}

impl SlidingWindowLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self::with_clock(limit, window, Arc::new(SystemClock))
    }

    pub fn with_clock(limit: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit,
            // windows too large for chrono never expire anything
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            requests: DashMap::new(),
            clock,
        }
    }

    fn prune(&self, log: &mut Vec<DateTime<Utc>>, now: DateTime<Utc>) {
        log.retain(|ts| now.signed_duration_since(*ts) <= self.window);
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn admit(&self, user_id: &str) -> bool {
        let now = self.clock.now();

        // the entry guard holds the shard lock for the whole prune-decide-record step
        match self.requests.entry(user_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let log = entry.get_mut();
                self.prune(log, now);

                if log.len() >= self.limit {
                    return false;
                }

                log.push(now);
                true
            }
            // logs are only created by an admitted request
            Entry::Vacant(entry) => {
                if self.limit == 0 {
                    return false;
                }
                entry.insert(vec![now]);
                true
            }
        }
    }

    fn tracked_identities(&self) -> usize {
        self.requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, 30, 0, 0, secs).unwrap()
    }

    fn limiter_at(
        limit: usize,
        window_ms: u64,
        now: DateTime<Utc>,
    ) -> (SlidingWindowLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let window = Duration::from_millis(window_ms);
        let limiter = SlidingWindowLimiter::with_clock(limit, window, clock.clone());
        (limiter, clock)
    }

    fn log_of(limiter: &SlidingWindowLimiter, user_id: &str) -> Vec<DateTime<Utc>> {
        limiter
            .requests
            .get(user_id)
            .map(|log| log.value().clone())
            .unwrap_or_default()
    }

    #[test]
    fn prune_keeps_only_timestamps_inside_the_window() {
        let (limiter, _) = limiter_at(0, 4000, at(5));
        let mut log = vec![at(0), at(1), at(2), at(4)];
        limiter.prune(&mut log, at(5));
        assert_eq!(log, vec![at(1), at(2), at(4)]);

        let (limiter, _) = limiter_at(0, 1000, at(5));
        let mut log = vec![at(0), at(0), at(1), at(2)];
        limiter.prune(&mut log, at(5));
        assert!(log.is_empty());

        let mut empty = Vec::new();
        limiter.prune(&mut empty, at(5));
        assert!(empty.is_empty());
    }

    #[test]
    fn first_request_is_admitted_and_recorded() {
        let (limiter, _) = limiter_at(5, 10_000, at(0));

        assert!(limiter.admit("123"));
        assert_eq!(limiter.tracked_identities(), 1);
        assert_eq!(log_of(&limiter, "123"), vec![at(0)]);
    }

    #[test]
    fn admits_up_to_the_limit_then_rejects() {
        let (limiter, clock) = limiter_at(5, 10_000, at(0));

        for _ in 0..5 {
            assert!(limiter.admit("123"));
            clock.advance(TimeDelta::microseconds(100));
        }
        assert!(!limiter.admit("123"));
        assert_eq!(log_of(&limiter, "123").len(), 5);
    }

    #[test]
    fn admits_when_pruned_log_is_under_limit() {
        let (limiter, _) = limiter_at(5, 10_000, at(18));
        limiter
            .requests
            .insert("123".into(), vec![at(1), at(2), at(13), at(14), at(17)]);

        assert!(limiter.admit("123"));
        assert_eq!(limiter.tracked_identities(), 1);
        assert_eq!(log_of(&limiter, "123"), vec![at(13), at(14), at(17), at(18)]);
    }

    #[test]
    fn rejects_when_pruned_log_equals_limit() {
        let (limiter, _) = limiter_at(3, 10_000, at(18));
        limiter
            .requests
            .insert("123".into(), vec![at(1), at(2), at(13), at(14), at(17)]);

        assert!(!limiter.admit("123"));
        // pruning is stored even though nothing was recorded
        assert_eq!(log_of(&limiter, "123"), vec![at(13), at(14), at(17)]);
    }

    #[test]
    fn rejects_when_pruned_log_exceeds_limit() {
        let (limiter, _) = limiter_at(3, 10_000, at(18));
        limiter.requests.insert(
            "123".into(),
            vec![at(1), at(2), at(13), at(14), at(15), at(17)],
        );

        assert!(!limiter.admit("123"));
        assert_eq!(log_of(&limiter, "123"), vec![at(13), at(14), at(15), at(17)]);
    }

    #[test]
    fn timestamp_exactly_window_old_still_counts() {
        let (limiter, clock) = limiter_at(1, 10_000, at(0));
        assert!(limiter.admit("123"));

        clock.set(at(10));
        assert!(!limiter.admit("123"));

        clock.advance(TimeDelta::milliseconds(1));
        assert!(limiter.admit("123"));
        assert_eq!(log_of(&limiter, "123"), vec![at(10) + TimeDelta::milliseconds(1)]);
    }

    #[test]
    fn zero_limit_rejects_everything() {
        let (limiter, clock) = limiter_at(0, 10_000, at(0));
        for user in ["123", "456", ""] {
            assert!(!limiter.admit(user));
            clock.advance(TimeDelta::seconds(60));
            assert!(!limiter.admit(user));
        }
        assert_eq!(limiter.tracked_identities(), 0);
    }

    #[test]
    fn rejected_identities_are_not_tracked() {
        let (limiter, _) = limiter_at(0, 1000, at(0));
        for id in 0..100 {
            assert!(!limiter.admit(&id.to_string()));
        }
        assert_eq!(limiter.tracked_identities(), 0);
        assert!(limiter.requests.get("0").is_none());
    }

    #[test]
    fn fully_expired_log_admits_again() {
        let (limiter, clock) = limiter_at(1, 1000, at(0));
        assert!(limiter.admit("123"));
        clock.set(at(5));
        assert!(limiter.admit("123"));
        assert_eq!(log_of(&limiter, "123"), vec![at(5)]);
    }

    #[test]
    fn identities_do_not_share_quota() {
        let (limiter, _) = limiter_at(2, 10_000, at(0));
        for _ in 0..50 {
            limiter.admit("noisy");
        }
        assert!(!limiter.admit("noisy"));

        assert!(limiter.admit("quiet"));
        assert!(limiter.admit("quiet"));
        assert!(!limiter.admit("quiet"));
        assert_eq!(limiter.tracked_identities(), 2);
    }

    #[test]
    fn empty_user_id_is_an_ordinary_key() {
        let (limiter, _) = limiter_at(1, 10_000, at(0));
        assert!(limiter.admit(""));
        assert!(!limiter.admit(""));
        assert!(limiter.admit("123"));
    }

    #[test]
    fn idle_identities_are_kept() {
        let (limiter, clock) = limiter_at(1, 1000, at(0));
        limiter.admit("123");
        clock.advance(TimeDelta::seconds(3600));
        limiter.admit("456");
        assert_eq!(limiter.tracked_identities(), 2);
    }

    #[test]
    fn concurrent_calls_never_admit_past_the_limit() {
        let (limiter, _) = limiter_at(7, 10_000, at(0));
        let limiter = Arc::new(limiter);

        let admitted: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let limiter = limiter.clone();
                    s.spawn(move || (0..20).filter(|_| limiter.admit("123")).count())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(admitted, 7);
        assert_eq!(log_of(&limiter, "123").len(), 7);
    }
}
