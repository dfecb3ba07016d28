use async_trait::async_trait;
use deadpool_redis::{Pool, PoolError};
use redis::{RedisError, Script};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use super::{RateLimitDecision, RateLimitPolicy, seconds_until_free};
use crate::abstract_trait::RateLimiterTrait;

// KEYS[1] = window key, ARGV = window ms, limit, unique member.
// Entries whose age is at least the window are evicted before counting.
const SLIDING_WINDOW_SCRIPT: &str = r"
local key = KEYS[1]
local window = tonumber(ARGV[1])
local limit = tonumber(ARGV[2])
local member = ARGV[3]

local clock = redis.call('TIME')
local now = tonumber(clock[1]) * 1000 + math.floor(tonumber(clock[2]) / 1000)

redis.call('ZREMRANGEBYSCORE', key, '-inf', now - window)
local count = redis.call('ZCARD', key)
local allowed = 0
if count < limit then
    redis.call('ZADD', key, now, member)
    allowed = 1
end
redis.call('PEXPIRE', key, window)

local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
local oldest_score = now
if oldest[2] then
    oldest_score = tonumber(oldest[2])
end

return {allowed, count, now - oldest_score}
";

#[derive(Debug, Error)]
enum BackendError {
    #[error("redis pool: {0}")]
    Pool(#[from] PoolError),

    #[error("redis: {0}")]
    Redis(#[from] RedisError),
}

#[derive(Clone)]
pub struct RedisRateLimiter {
    pool: Pool,
    policy: RateLimitPolicy,
    script: Script,
}

impl RedisRateLimiter {
    pub fn new(pool: Pool, policy: RateLimitPolicy) -> Self {
        Self {
            pool,
            policy,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
        }
    }

    async fn try_allow(&self, key: &str) -> Result<RateLimitDecision, BackendError> {
        let mut conn = self.pool.get().await?;

        let window_ms = u64::try_from(self.policy.window.as_millis()).unwrap_or(u64::MAX);
        let member = uuid::Uuid::new_v4().to_string();

        let (allowed, count, oldest_age_ms): (i64, i64, i64) = self
            .script
            .key(key)
            .arg(window_ms)
            .arg(self.policy.max_requests)
            .arg(member)
            .invoke_async(&mut conn)
            .await?;

        let limit = self.policy.max_requests;
        let oldest_age = Duration::from_millis(u64::try_from(oldest_age_ms).unwrap_or(0));
        let reset_seconds = seconds_until_free(self.policy.window, oldest_age);

        debug!(key, allowed, count, reset_seconds, "rate limit window evaluated");

        if allowed == 1 {
            let count = u32::try_from(count).unwrap_or(limit);
            Ok(RateLimitDecision::Allowed {
                limit,
                remaining: limit.saturating_sub(count + 1),
                reset_seconds,
            })
        } else {
            Ok(RateLimitDecision::Blocked {
                limit,
                reset_seconds,
            })
        }
    }
}

#[async_trait]
impl RateLimiterTrait for RedisRateLimiter {
    fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    async fn allow(&self, key: &str) -> RateLimitDecision {
        match self.try_allow(key).await {
            Ok(decision) => decision,
            Err(e) => {
                error!("❌ Rate limiter backend unavailable, letting request through: {e}");
                RateLimitDecision::Bypassed
            }
        }
    }
}

/// The Redis cases need a server: set `REDIS_URL` (a scratch database is
/// fine) and run `cargo test -p shared -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedisClient;
    use std::sync::Arc;

    fn limiter(policy: RateLimitPolicy) -> RedisRateLimiter {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".into());
        RedisRateLimiter::new(RedisClient::new(&url).unwrap().pool, policy)
    }

    fn fresh_key() -> String {
        format!("rate_limit:autocomplete:test-{}", uuid::Uuid::new_v4())
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn window_fills_blocks_and_frees_again() {
        let limiter = limiter(RateLimitPolicy::new(20, 2));
        let key = fresh_key();

        for expected_remaining in (0..20).rev() {
            match limiter.allow(&key).await {
                RateLimitDecision::Allowed {
                    limit, remaining, ..
                } => {
                    assert_eq!(limit, 20);
                    assert_eq!(remaining, expected_remaining);
                }
                other => panic!("expected allowed, got {other:?}"),
            }
        }

        let reset = match limiter.allow(&key).await {
            RateLimitDecision::Blocked { reset_seconds, .. } => reset_seconds,
            other => panic!("expected blocked, got {other:?}"),
        };
        assert!((1..=2).contains(&reset));

        tokio::time::sleep(Duration::from_secs(reset)).await;

        match limiter.allow(&key).await {
            RateLimitDecision::Allowed { remaining, .. } => assert_eq!(remaining, 19),
            other => panic!("expected allowed after the window slid, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "requires Redis"]
    async fn concurrent_hits_never_share_the_last_slot() {
        let limiter = Arc::new(limiter(RateLimitPolicy::new(20, 60)));
        let key = Arc::new(fresh_key());

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let limiter = limiter.clone();
                let key = key.clone();
                tokio::spawn(async move { limiter.allow(&key).await })
            })
            .collect();

        let mut allowed = 0;
        let mut blocked = 0;
        for handle in handles {
            match handle.await.unwrap() {
                RateLimitDecision::Allowed { .. } => allowed += 1,
                RateLimitDecision::Blocked { reset_seconds, .. } => {
                    assert!(reset_seconds <= 60);
                    blocked += 1;
                }
                RateLimitDecision::Bypassed => panic!("backend was unreachable"),
            }
        }

        assert_eq!(allowed, 20);
        assert_eq!(blocked, 80);
    }

    #[tokio::test]
    async fn unreachable_backend_lets_requests_through() {
        let pool = RedisClient::new("redis://127.0.0.1:1/0").unwrap().pool;
        let limiter = RedisRateLimiter::new(pool, RateLimitPolicy::default());

        assert_eq!(
            limiter.allow("rate_limit:autocomplete:10.0.0.9").await,
            RateLimitDecision::Bypassed
        );
    }
}
