mod database;
mod hosts;
mod kafka;
mod myconfig;
mod redis;

pub use self::database::{ConnectionManager, ConnectionPool};
pub use self::hosts::AllowedHosts;
pub use self::kafka::Kafka;
pub use self::myconfig::{Config, NotificationConfig, RateLimitConfig};
pub use self::redis::RedisClient;
