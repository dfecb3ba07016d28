use async_trait::async_trait;
use shared::{domain::ApiResponse, errors::ServiceError};
use std::sync::Arc;

use crate::domain::{
    requests::product::{CreateProductRequest, ProductSearchQuery, UpdateProductRequest},
    response::product::{ProductAutocompleteResponse, ProductResponse},
};

pub type DynProductService = Arc<dyn ProductServiceTrait + Send + Sync>;

#[async_trait]
pub trait ProductServiceTrait {
    async fn find_all(&self) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn search(
        &self,
        query: &ProductSearchQuery,
    ) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError>;
    async fn autocomplete(
        &self,
        query: &str,
    ) -> Result<ApiResponse<Vec<ProductAutocompleteResponse>>, ServiceError>;
    async fn create(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn update(
        &self,
        id: i32,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn delete(&self, id: i32) -> Result<ApiResponse<()>, ServiceError>;
}
