use async_trait::async_trait;
use shared::{domain::ApiResponse, errors::ServiceError};
use std::sync::Arc;

use crate::domain::{
    requests::inventory::{CreateInventoryRequest, InventoryFilter, UpdateInventoryRequest},
    response::inventory::InventoryResponse,
};

pub type DynInventoryService = Arc<dyn InventoryServiceTrait + Send + Sync>;

#[async_trait]
pub trait InventoryServiceTrait {
    async fn find_all(
        &self,
        filter: &InventoryFilter,
    ) -> Result<ApiResponse<Vec<InventoryResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<InventoryResponse>, ServiceError>;
    async fn create(
        &self,
        req: &CreateInventoryRequest,
    ) -> Result<ApiResponse<InventoryResponse>, ServiceError>;
    async fn update(
        &self,
        id: i32,
        req: &UpdateInventoryRequest,
    ) -> Result<ApiResponse<InventoryResponse>, ServiceError>;
    async fn delete(&self, id: i32) -> Result<ApiResponse<()>, ServiceError>;
}
