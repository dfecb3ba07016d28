use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::time::Instant;

use super::{RateLimitDecision, RateLimitPolicy, seconds_until_free};
use crate::abstract_trait::RateLimiterTrait;

type HitLog = Arc<Mutex<VecDeque<Instant>>>;

/// Keys tracked before the first sweep of idle windows.
const SWEEP_FLOOR: usize = 1024;

#[derive(Debug)]
struct Windows {
    logs: HashMap<String, HitLog>,
    sweep_at: usize,
}

/// Sliding-window limiter kept in process memory.
///
/// The outer map lock is held only long enough to fetch a key's log; the
/// check-and-record step runs under that key's own lock, so distinct keys never
/// wait on each other. Keys with no hit left in the window are swept when the
/// map has doubled since the last sweep.
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    policy: RateLimitPolicy,
    windows: Mutex<Windows>,
    sweep_floor: usize,
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

impl InMemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self::with_sweep_floor(policy, SWEEP_FLOOR)
    }

    fn with_sweep_floor(policy: RateLimitPolicy, sweep_floor: usize) -> Self {
        Self {
            policy,
            windows: Mutex::new(Windows {
                logs: HashMap::new(),
                sweep_at: sweep_floor,
            }),
            sweep_floor,
        }
    }

    /// Keys currently holding a window.
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().logs.len()
    }

    fn log_for(&self, key: &str, now: Instant) -> HitLog {
        let mut windows = self.windows.lock();
        if let Some(log) = windows.logs.get(key) {
            return log.clone();
        }

        if windows.logs.len() >= windows.sweep_at {
            let window = self.policy.window;
            // Logs are only cloned under this lock, so a count of one means
            // no caller is inside `check` for that key.
            windows.logs.retain(|_, log| {
                Arc::strong_count(log) > 1
                    || log
                        .lock()
                        .back()
                        .is_some_and(|newest| now.duration_since(*newest) < window)
            });
            windows.sweep_at = (windows.logs.len() * 2).max(self.sweep_floor);
        }

        windows.logs.entry(key.to_string()).or_default().clone()
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        let RateLimitPolicy {
            max_requests,
            window,
        } = self.policy;

        let now = Instant::now();
        let log = self.log_for(key, now);
        let mut hits = log.lock();

        while hits
            .front()
            .is_some_and(|oldest| now.duration_since(*oldest) >= window)
        {
            hits.pop_front();
        }

        let count = u32::try_from(hits.len()).unwrap_or(u32::MAX);

        if count < max_requests {
            hits.push_back(now);
            let oldest_age = hits
                .front()
                .map(|oldest| now.duration_since(*oldest))
                .unwrap_or_default();

            RateLimitDecision::Allowed {
                limit: max_requests,
                remaining: max_requests - 1 - count,
                reset_seconds: seconds_until_free(window, oldest_age),
            }
        } else {
            let oldest_age = hits
                .front()
                .map(|oldest| now.duration_since(*oldest))
                .unwrap_or_default();

            RateLimitDecision::Blocked {
                limit: max_requests,
                reset_seconds: seconds_until_free(window, oldest_age),
            }
        }
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    async fn allow(&self, key: &str) -> RateLimitDecision {
        self.check(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn twenty_hits_then_blocked_until_window_slides() {
        let limiter = InMemoryRateLimiter::new(RateLimitPolicy::default());

        for expected_remaining in (0..20).rev() {
            match limiter.allow("rate_limit:autocomplete:10.0.0.1").await {
                RateLimitDecision::Allowed { remaining, .. } => {
                    assert_eq!(remaining, expected_remaining)
                }
                other => panic!("expected allowed, got {other:?}"),
            }
        }

        let reset = match limiter.allow("rate_limit:autocomplete:10.0.0.1").await {
            RateLimitDecision::Blocked { reset_seconds, .. } => reset_seconds,
            other => panic!("expected blocked, got {other:?}"),
        };
        assert!(reset <= 60);

        tokio::time::advance(Duration::from_secs(reset)).await;

        assert!(
            limiter
                .allow("rate_limit:autocomplete:10.0.0.1")
                .await
                .is_allowed()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_tracks_the_oldest_hit() {
        let limiter = InMemoryRateLimiter::new(RateLimitPolicy::new(2, 60));

        limiter.check("k");
        tokio::time::advance(Duration::from_secs(45)).await;
        limiter.check("k");

        match limiter.check("k") {
            RateLimitDecision::Blocked { reset_seconds, .. } => assert_eq!(reset_seconds, 15),
            other => panic!("expected blocked, got {other:?}"),
        }

        tokio::time::advance(Duration::from_secs(15)).await;

        match limiter.check("k") {
            RateLimitDecision::Allowed { remaining, .. } => assert_eq!(remaining, 0),
            other => panic!("expected allowed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn keys_do_not_share_windows() {
        let limiter = InMemoryRateLimiter::new(RateLimitPolicy::new(1, 60));

        assert!(limiter.check("a").is_allowed());
        assert!(!limiter.check("a").is_allowed());
        assert!(limiter.check("b").is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_keys_are_swept_as_new_keys_arrive() {
        let limiter = InMemoryRateLimiter::with_sweep_floor(RateLimitPolicy::new(5, 60), 2);

        limiter.check("10.0.0.1");
        limiter.check("10.0.0.2");
        assert_eq!(limiter.tracked_keys(), 2);

        tokio::time::advance(Duration::from_secs(30)).await;
        limiter.check("10.0.0.2");
        tokio::time::advance(Duration::from_secs(30)).await;

        // 10.0.0.1 last hit 60s ago; 10.0.0.2 is still inside its window.
        limiter.check("10.0.0.3");
        assert_eq!(limiter.tracked_keys(), 2);

        match limiter.check("10.0.0.2") {
            RateLimitDecision::Allowed { remaining, .. } => assert_eq!(remaining, 3),
            other => panic!("expected allowed, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_hits_never_exceed_the_limit() {
        let limiter = Arc::new(InMemoryRateLimiter::new(RateLimitPolicy::new(20, 60)));

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.allow("shared").await.is_allowed() })
            })
            .collect();

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 20);
    }
}
