use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

use crate::domain::OrderConfirmation;

pub type DynNotificationSender = Arc<dyn NotificationSenderTrait + Send + Sync>;

#[async_trait]
pub trait NotificationSenderTrait {
    async fn send(&self, notification: &OrderConfirmation) -> Result<(), ServiceError>;
}
