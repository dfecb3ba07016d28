use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

use crate::{
    abstract_trait::store::StoreRepositoryTrait,
    domain::requests::store::{CreateStoreRequest, UpdateStoreRequest},
    model::store::Store as StoreModel,
};

#[derive(Clone)]
pub struct StoreRepository {
    db: ConnectionPool,
}

impl StoreRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StoreRepositoryTrait for StoreRepository {
    async fn find_active(&self) -> Result<Vec<StoreModel>, RepositoryError> {
        info!("🟢 Fetching active stores");

        sqlx::query_as::<_, StoreModel>(
            r#"
            SELECT store_id, name, location, is_active, created_at, updated_at
            FROM stores
            WHERE is_active
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch stores: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<StoreModel>, RepositoryError> {
        sqlx::query_as::<_, StoreModel>(
            r#"
            SELECT store_id, name, location, is_active, created_at, updated_at
            FROM stores
            WHERE store_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch store {id}: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn create(&self, req: &CreateStoreRequest) -> Result<StoreModel, RepositoryError> {
        info!("🆕 Creating store: {}", req.name);

        sqlx::query_as::<_, StoreModel>(
            r#"
            INSERT INTO stores (name, location, is_active)
            VALUES ($1, $2, $3)
            RETURNING store_id, name, location, is_active, created_at, updated_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.location)
        .bind(req.is_active)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to create store: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn update(
        &self,
        id: i32,
        req: &UpdateStoreRequest,
    ) -> Result<Option<StoreModel>, RepositoryError> {
        info!("✏️ Updating store {id}");

        sqlx::query_as::<_, StoreModel>(
            r#"
            UPDATE stores
            SET name = COALESCE($2, name),
                location = COALESCE($3, location),
                is_active = COALESCE($4, is_active),
                updated_at = now()
            WHERE store_id = $1
            RETURNING store_id, name, location, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(req.name.as_deref())
        .bind(req.location.as_deref())
        .bind(req.is_active)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to update store {id}: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        info!("🗑️ Deleting store {id}");

        let result = sqlx::query("DELETE FROM stores WHERE store_id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to delete store {id}: {e:?}");
                RepositoryError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
