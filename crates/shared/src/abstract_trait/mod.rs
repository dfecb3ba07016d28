mod publisher;
mod rate_limit;

pub use self::publisher::{DynEventPublisher, EventPublisherTrait};
pub use self::rate_limit::{DynRateLimiter, RateLimiterTrait};
