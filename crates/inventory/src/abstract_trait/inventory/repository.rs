use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

use crate::{
    domain::requests::inventory::{
        CreateInventoryRequest, InventoryFilter, UpdateInventoryRequest,
    },
    model::inventory::InventoryDetail,
};

pub type DynInventoryRepository = Arc<dyn InventoryRepositoryTrait + Send + Sync>;

/// Plain, non-locking reads and writes. Order placement goes through
/// `OrderTransactionTrait` instead.
#[async_trait]
pub trait InventoryRepositoryTrait {
    async fn find_all(
        &self,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryDetail>, RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<InventoryDetail>, RepositoryError>;
    async fn create(&self, req: &CreateInventoryRequest)
    -> Result<InventoryDetail, RepositoryError>;
    async fn update(
        &self,
        id: i32,
        req: &UpdateInventoryRequest,
    ) -> Result<Option<InventoryDetail>, RepositoryError>;
    async fn delete(&self, id: i32) -> Result<bool, RepositoryError>;
}
