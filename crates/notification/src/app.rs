use anyhow::{Context, Result};
use inventory::{
    abstract_trait::order::DynOrderQueryService,
    repository::postgres::{OrderQueryRepository, StoreRepository},
    service::{OrderQueryService, OrderQueryServiceDeps},
};
use prometheus_client::registry::Registry;
use shared::{
    config::{ConnectionPool, NotificationConfig},
    domain::ORDER_CONFIRMED_TOPIC,
    utils::shutdown_signal,
};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinSet};
use tracing::{error, info};

use crate::{
    abstract_trait::DynNotificationSender,
    handler::{OrderConfirmationHandler, RetryPolicy},
    service::{KafkaNotificationConsumer, LogNotificationSender},
};

pub const GROUP_ID: &str = "notification-service";

pub struct NotificationApp {
    kafka_broker: String,
    config: NotificationConfig,
    handler: Arc<OrderConfirmationHandler>,
}

impl NotificationApp {
    pub fn new(pool: ConnectionPool, kafka_broker: &str, config: NotificationConfig) -> Self {
        let mut registry = Registry::default();

        let orders: DynOrderQueryService = Arc::new(OrderQueryService::new(
            OrderQueryServiceDeps {
                orders: Arc::new(OrderQueryRepository::new(pool.clone())),
                stores: Arc::new(StoreRepository::new(pool)),
            },
            &mut registry,
        ));
        let sender: DynNotificationSender = Arc::new(LogNotificationSender);

        let handler = Arc::new(OrderConfirmationHandler::new(
            orders,
            sender,
            RetryPolicy::from(&config),
        ));

        Self {
            kafka_broker: kafka_broker.to_string(),
            config,
            handler,
        }
    }

    /// Runs the worker pool until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut workers = JoinSet::new();

        for worker in 0..self.config.workers.max(1) {
            let consumer = KafkaNotificationConsumer::new(
                &self.kafka_broker,
                GROUP_ID,
                &[ORDER_CONFIRMED_TOPIC],
                self.handler.clone(),
                worker,
            )
            .with_context(|| format!("Failed to create consumer for worker {worker}"))?;

            workers.spawn(consumer.run(shutdown_rx.clone()));
        }

        info!(
            "📬 Notification pool started with {} workers on {ORDER_CONFIRMED_TOPIC}",
            workers.len()
        );

        shutdown_signal().await;

        if shutdown_tx.send(true).is_err() {
            error!("All notification workers exited before shutdown");
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("💀 Notification worker panicked: {e}");
            }
        }

        Ok(())
    }
}
