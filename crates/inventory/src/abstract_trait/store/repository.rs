use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

use crate::{
    domain::requests::store::{CreateStoreRequest, UpdateStoreRequest},
    model::store::Store as StoreModel,
};

pub type DynStoreRepository = Arc<dyn StoreRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait StoreRepositoryTrait {
    async fn find_active(&self) -> Result<Vec<StoreModel>, RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<StoreModel>, RepositoryError>;
    async fn create(&self, req: &CreateStoreRequest) -> Result<StoreModel, RepositoryError>;
    async fn update(
        &self,
        id: i32,
        req: &UpdateStoreRequest,
    ) -> Result<Option<StoreModel>, RepositoryError>;
    /// Removes the store and its inventory rows. `false` when no such row;
    /// fails with `ForeignKey` while orders reference it.
    async fn delete(&self, id: i32) -> Result<bool, RepositoryError>;
}
