use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynEventPublisher, DynRateLimiter},
    cache::{DisabledRateLimiter, RedisRateLimiter},
    config::{AllowedHosts, Config, ConnectionPool, Kafka, RedisClient},
};
use std::{fmt, sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::di::{DependenciesInject, DependenciesInjectDeps};

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub registry: Arc<Registry>,
    pub rate_limiter: DynRateLimiter,
    pub allowed_hosts: AllowedHosts,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("deps", &self.di_container)
            .field("registry", &self.registry)
            .field("rate_limit_policy", &self.rate_limiter.policy())
            .field("allowed_hosts", &self.allowed_hosts)
            .finish()
    }
}

impl AppState {
    /// Production wiring: PostgreSQL, Kafka publisher and the Redis limiter.
    /// The Kafka producer is returned as well so the caller can flush it on
    /// shutdown.
    pub async fn new(pool: ConnectionPool, config: &Config) -> Result<(Self, Arc<Kafka>)> {
        let kafka = Arc::new(
            Kafka::new(&config.kafka_broker).context("Failed to create Kafka producer")?,
        );

        let policy = config.rate_limit.policy();
        let rate_limiter: DynRateLimiter = if config.rate_limit.enabled {
            let redis =
                RedisClient::new(&config.redis_url).context("Failed to create Redis pool")?;

            if let Err(e) = redis.ping().await {
                warn!("⚠️ Redis unreachable, autocomplete is not rate limited until it is: {e:?}");
            }

            info!(
                "⏱️ Rate limiting {} requests per {}s",
                policy.max_requests,
                policy.window_seconds()
            );
            Arc::new(RedisRateLimiter::new(redis.pool.clone(), policy))
        } else {
            info!("⏱️ Rate limiting disabled");
            Arc::new(DisabledRateLimiter::new(policy))
        };

        let deps = DependenciesInjectDeps::postgres(
            pool,
            kafka.clone() as DynEventPublisher,
            Duration::from_millis(config.lock_timeout_ms),
            Duration::from_millis(config.statement_timeout_ms),
        );

        let state = Self::from_deps(deps, rate_limiter, config.allowed_hosts.clone());
        Ok((state, kafka))
    }

    pub fn from_deps(
        deps: DependenciesInjectDeps,
        rate_limiter: DynRateLimiter,
        allowed_hosts: AllowedHosts,
    ) -> Self {
        let mut registry = Registry::default();
        let di_container = DependenciesInject::new(deps, &mut registry);

        Self {
            di_container,
            registry: Arc::new(registry),
            rate_limiter,
            allowed_hosts,
        }
    }
}
