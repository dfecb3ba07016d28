use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::errors::RepositoryError;
use std::sync::Arc;

use crate::{
    domain::requests::product::{CreateProductRequest, ProductSearchFilter},
    model::product::Product as ProductModel,
};

pub type DynProductRepository = Arc<dyn ProductRepositoryTrait + Send + Sync>;

/// Column changes for an update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait ProductRepositoryTrait {
    async fn find_active(&self) -> Result<Vec<ProductModel>, RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<ProductModel>, RepositoryError>;
    /// Any activity state; callers decide what an inactive product means.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<ProductModel>, RepositoryError>;
    async fn search(&self, filter: &ProductSearchFilter)
    -> Result<Vec<ProductModel>, RepositoryError>;
    async fn autocomplete(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<ProductModel>, RepositoryError>;
    async fn create(&self, req: &CreateProductRequest) -> Result<ProductModel, RepositoryError>;
    async fn update(
        &self,
        id: i32,
        changes: &ProductChanges,
    ) -> Result<Option<ProductModel>, RepositoryError>;
    /// Removes the product and its inventory rows. `false` when no such row;
    /// fails with `ForeignKey` while order items reference it.
    async fn delete(&self, id: i32) -> Result<bool, RepositoryError>;
}
