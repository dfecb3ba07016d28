use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{RateLimitDecision, RateLimitPolicy};

pub type DynRateLimiter = Arc<dyn RateLimiterTrait + Send + Sync>;

#[async_trait]
pub trait RateLimiterTrait {
    fn policy(&self) -> RateLimitPolicy;

    /// Records a hit for `key` when a slot is free. Backend faults resolve to
    /// [`RateLimitDecision::Bypassed`] instead of an error.
    async fn allow(&self, key: &str) -> RateLimitDecision;
}
