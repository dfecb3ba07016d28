use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaResult;
use rdkafka::producer::{BaseRecord, DefaultProducerContext, Producer, ThreadedProducer};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::abstract_trait::EventPublisherTrait;
use crate::errors::ServiceError;

/// Producer whose delivery reports are polled on a background thread, so
/// `send_message` only enqueues.
pub struct Kafka {
    producer: ThreadedProducer<DefaultProducerContext>,
}

impl Kafka {
    pub fn new(brokers: &str) -> Result<Self, ServiceError> {
        let producer: ThreadedProducer<DefaultProducerContext> = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "30000")
            .set("acks", "all")
            .create()?;

        info!("Kafka producer connected successfully");

        Ok(Kafka { producer })
    }

    pub fn send_message(&self, topic: &str, key: &str, value: &[u8]) -> KafkaResult<()> {
        self.producer
            .send(BaseRecord::to(topic).key(key).payload(value))
            .map_err(|(kafka_error, _record)| kafka_error)?;

        debug!(topic, key, "Message enqueued");
        Ok(())
    }

    pub fn flush(&self, timeout: Duration) {
        if let Err(e) = self.producer.flush(timeout) {
            warn!("⚠️ Kafka producer flush incomplete: {e}");
        }
    }
}

#[async_trait]
impl EventPublisherTrait for Kafka {
    async fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<(), ServiceError> {
        self.send_message(topic, key, value)
            .map_err(ServiceError::from)
    }
}
