use async_trait::async_trait;
use shared::{domain::ApiResponse, errors::ServiceError};
use std::sync::Arc;

use crate::domain::{
    requests::store::{CreateStoreRequest, UpdateStoreRequest},
    response::store::StoreResponse,
};

pub type DynStoreService = Arc<dyn StoreServiceTrait + Send + Sync>;

#[async_trait]
pub trait StoreServiceTrait {
    async fn find_all(&self) -> Result<ApiResponse<Vec<StoreResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<StoreResponse>, ServiceError>;
    async fn create(
        &self,
        req: &CreateStoreRequest,
    ) -> Result<ApiResponse<StoreResponse>, ServiceError>;
    async fn update(
        &self,
        id: i32,
        req: &UpdateStoreRequest,
    ) -> Result<ApiResponse<StoreResponse>, ServiceError>;
    async fn delete(&self, id: i32) -> Result<ApiResponse<()>, ServiceError>;
}
