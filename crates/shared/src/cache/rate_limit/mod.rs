mod disabled;
mod memory;
mod redis;

pub use self::disabled::DisabledRateLimiter;
pub use self::memory::InMemoryRateLimiter;
pub use self::redis::RedisRateLimiter;

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_seconds),
        }
    }

    pub fn window_seconds(&self) -> u64 {
        self.window.as_secs()
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(20, 60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        limit: u32,
        remaining: u32,
        reset_seconds: u64,
    },
    Blocked {
        limit: u32,
        reset_seconds: u64,
    },
    /// Limiting is off or the backend is unreachable. No headers are emitted.
    Bypassed,
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, RateLimitDecision::Blocked { .. })
    }
}

/// Whole seconds until the oldest retained hit leaves the window, never below one.
pub(crate) fn seconds_until_free(window: Duration, oldest_age: Duration) -> u64 {
    let left = window.saturating_sub(oldest_age);
    let millis = u64::try_from(left.as_millis()).unwrap_or(u64::MAX);
    millis.div_ceil(1000).max(1)
}
