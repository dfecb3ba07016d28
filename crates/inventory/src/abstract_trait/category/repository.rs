use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

use crate::model::category::Category as CategoryModel;

pub type DynCategoryRepository = Arc<dyn CategoryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait CategoryRepositoryTrait {
    async fn find_all(&self) -> Result<Vec<CategoryModel>, RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<CategoryModel>, RepositoryError>;
    async fn create(&self, name: &str) -> Result<CategoryModel, RepositoryError>;
    async fn update(&self, id: i32, name: &str) -> Result<Option<CategoryModel>, RepositoryError>;
    /// `false` when no such row. Fails with `ForeignKey` while products use it.
    async fn delete(&self, id: i32) -> Result<bool, RepositoryError>;
}
