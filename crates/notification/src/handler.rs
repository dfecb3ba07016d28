use inventory::{abstract_trait::order::DynOrderQueryService, model::order::OrderStatus};
use shared::{config::NotificationConfig, domain::OrderEvent, errors::ServiceError};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::{abstract_trait::DynNotificationSender, domain::OrderConfirmation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): base, 2×base, 4×base, …
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry.min(16)))
    }
}

impl From<&NotificationConfig> for RetryPolicy {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// How a message ended. Every variant is final, so the offset is committed
/// whatever the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { attempts: u32 },
    Skipped(String),
    Dropped(String),
    Exhausted { attempts: u32 },
}

enum Attempt {
    Done(Delivery),
    Retry(ServiceError),
}

pub struct OrderConfirmationHandler {
    orders: DynOrderQueryService,
    sender: DynNotificationSender,
    retry: RetryPolicy,
}

impl OrderConfirmationHandler {
    pub fn new(
        orders: DynOrderQueryService,
        sender: DynNotificationSender,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            orders,
            sender,
            retry,
        }
    }

    pub async fn handle_payload(&self, payload: &[u8]) -> Delivery {
        match serde_json::from_slice::<OrderEvent>(payload) {
            Ok(event) => self.handle_event(&event).await,
            Err(e) => {
                error!(
                    "❌ Undecodable order event: {e}, payload: {}",
                    String::from_utf8_lossy(payload)
                );
                Delivery::Dropped(format!("Invalid payload: {e}"))
            }
        }
    }

    pub async fn handle_event(&self, event: &OrderEvent) -> Delivery {
        let order_id = event.order_id();
        let mut retry = 0;

        loop {
            let err = match self.attempt(order_id, retry + 1).await {
                Attempt::Done(delivery) => return delivery,
                Attempt::Retry(err) => err,
            };

            if retry >= self.retry.max_retries {
                error!(
                    "💀 Giving up on confirmation for order {order_id} after {} attempts: {err}",
                    retry + 1
                );
                return Delivery::Exhausted {
                    attempts: retry + 1,
                };
            }

            let delay = self.retry.delay_for(retry);
            warn!("⚠️ Confirmation for order {order_id} failed ({err}), retrying in {delay:?}");
            sleep(delay).await;
            retry += 1;
        }
    }

    async fn attempt(&self, order_id: i32, attempts: u32) -> Attempt {
        let order = match self.orders.find_by_id(order_id).await {
            Ok(response) => response.data,
            Err(e) if !e.is_transient() => {
                warn!("🔍 Order {order_id} unavailable, dropping confirmation: {e}");
                return Attempt::Done(Delivery::Dropped(e.to_string()));
            }
            Err(e) => return Attempt::Retry(e),
        };

        if order.status != OrderStatus::Confirmed {
            debug!("Order {order_id} is {}, nothing to send", order.status);
            return Attempt::Done(Delivery::Skipped(format!(
                "Order {order_id} is {}",
                order.status
            )));
        }

        let confirmation = OrderConfirmation::from(&order);
        match self.sender.send(&confirmation).await {
            Ok(()) => {
                info!("✅ Confirmation for order {order_id} sent");
                Attempt::Done(Delivery::Sent { attempts })
            }
            Err(e) => Attempt::Retry(e),
        }
    }
}
