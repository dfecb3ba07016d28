use async_trait::async_trait;
use shared::{domain::ApiResponse, errors::ServiceError};
use std::sync::Arc;

use crate::domain::{
    requests::order::{CreateOrderRequest, OrderListQuery},
    response::order::{OrderListResponse, OrderResponse, OrderStatsResponse},
};

pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;
pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandServiceTrait {
    /// A rejected order is a successful call; inspect the returned status.
    async fn place_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn find_all(
        &self,
        query: &OrderListQuery,
    ) -> Result<ApiResponse<Vec<OrderListResponse>>, ServiceError>;
    async fn stats(
        &self,
        store_id: Option<i32>,
    ) -> Result<ApiResponse<OrderStatsResponse>, ServiceError>;
}
