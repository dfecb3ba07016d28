mod rate_limit;

pub use self::rate_limit::{
    DisabledRateLimiter, InMemoryRateLimiter, RateLimitDecision, RateLimitPolicy,
    RedisRateLimiter,
};
