use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

use crate::{
    domain::requests::order::OrderFilter,
    model::{
        order::{Order, OrderStats, OrderSummary},
        order_item::OrderItemDetail,
    },
};

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

/// Read side of orders. Never takes locks.
#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, RepositoryError>;
    async fn find_items(&self, order_id: i32) -> Result<Vec<OrderItemDetail>, RepositoryError>;
    /// Newest first.
    async fn find_all(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, RepositoryError>;
    async fn stats(&self, store_id: Option<i32>) -> Result<OrderStats, RepositoryError>;
}
