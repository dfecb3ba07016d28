use async_trait::async_trait;
use shared::errors::ServiceError;
use tracing::info;

use crate::{abstract_trait::NotificationSenderTrait, domain::OrderConfirmation};

/// Writes the confirmation to the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSenderTrait for LogNotificationSender {
    async fn send(&self, notification: &OrderConfirmation) -> Result<(), ServiceError> {
        info!(
            order_id = notification.order_id,
            subject = %notification.subject(),
            "📧 {}",
            notification.render()
        );
        Ok(())
    }
}
