use rdkafka::{
    Message,
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
};
use shared::errors::ServiceError;
use std::sync::Arc;
use tokio::{
    sync::watch,
    time::{Duration, sleep},
};
use tracing::{debug, error, info, warn};

use crate::handler::{Delivery, OrderConfirmationHandler};

/// One member of the consumer group. Offsets are committed only after a
/// message has been handled, so a crash replays it.
pub struct KafkaNotificationConsumer {
    consumer: StreamConsumer,
    handler: Arc<OrderConfirmationHandler>,
    worker: usize,
}

impl KafkaNotificationConsumer {
    pub fn new(
        brokers: &str,
        group_id: &str,
        topics: &[&str],
        handler: Arc<OrderConfirmationHandler>,
        worker: usize,
    ) -> Result<Self, ServiceError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "6000")
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()?;

        consumer.subscribe(topics)?;

        Ok(Self {
            consumer,
            handler,
            worker,
        })
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let worker = self.worker;
        info!("🚀 Notification worker {worker} consuming");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("🛑 Notification worker {worker} received shutdown signal");
                    break;
                }

                received = self.consumer.recv() => {
                    let message = match received {
                        Ok(message) => message,
                        Err(e) => {
                            error!("⚠️ Kafka not connected or error: {e:?}");
                            sleep(Duration::from_secs(5)).await;
                            continue;
                        }
                    };

                    let key = message
                        .key()
                        .and_then(|k| std::str::from_utf8(k).ok())
                        .map(str::to_string);
                    debug!(worker, key = ?key, offset = message.offset(), "Message received");

                    let delivery = match message.payload() {
                        Some(payload) => self.handler.handle_payload(payload).await,
                        None => Delivery::Dropped("Empty message payload".into()),
                    };

                    match &delivery {
                        Delivery::Sent { attempts } => {
                            info!(worker, key = ?key, attempts, "✅ Notification delivered")
                        }
                        Delivery::Skipped(reason) => debug!(worker, key = ?key, "Skipped: {reason}"),
                        Delivery::Dropped(reason) => warn!(worker, key = ?key, "Dropped: {reason}"),
                        Delivery::Exhausted { attempts } => {
                            error!(worker, key = ?key, attempts, "❌ Notification abandoned")
                        }
                    }

                    if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async) {
                        error!("Failed to commit message: {e:?}");
                    }
                }
            }
        }

        info!("✅ Notification worker {worker} stopped");
    }
}
