use async_trait::async_trait;

use super::{RateLimitDecision, RateLimitPolicy};
use crate::abstract_trait::RateLimiterTrait;

#[derive(Debug, Clone, Default)]
pub struct DisabledRateLimiter {
    policy: RateLimitPolicy,
}

impl DisabledRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl RateLimiterTrait for DisabledRateLimiter {
    fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    async fn allow(&self, _key: &str) -> RateLimitDecision {
        RateLimitDecision::Bypassed
    }
}
