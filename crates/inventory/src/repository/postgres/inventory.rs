use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

use crate::{
    abstract_trait::inventory::InventoryRepositoryTrait,
    domain::requests::inventory::{
        CreateInventoryRequest, InventoryFilter, UpdateInventoryRequest,
    },
    model::inventory::{DEFAULT_LOW_STOCK_THRESHOLD, InventoryDetail},
};

const SELECT_DETAIL: &str = r#"
    SELECT
        i.inventory_id,
        i.store_id,
        i.product_id,
        i.quantity,
        i.low_stock_threshold,
        i.created_at,
        i.updated_at,
        s.name AS store_name,
        p.title AS product_title,
        p.price AS product_price
"#;

#[derive(Clone)]
pub struct InventoryRepository {
    db: ConnectionPool,
}

impl InventoryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InventoryRepositoryTrait for InventoryRepository {
    async fn find_all(
        &self,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryDetail>, RepositoryError> {
        info!("🔍 Listing inventory: {filter:?}");

        let sql = format!(
            "{SELECT_DETAIL}
            FROM inventory i
            JOIN stores s ON s.store_id = i.store_id
            JOIN products p ON p.product_id = i.product_id
            WHERE ($1::INT IS NULL OR i.store_id = $1)
              AND ($2::INT IS NULL OR i.product_id = $2)
              AND ($3::BOOLEAN IS NOT TRUE OR i.quantity <= i.low_stock_threshold)
            ORDER BY s.name, p.title"
        );

        sqlx::query_as::<_, InventoryDetail>(&sql)
            .bind(filter.store_id)
            .bind(filter.product_id)
            .bind(filter.low_stock)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to list inventory: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<InventoryDetail>, RepositoryError> {
        let sql = format!(
            "{SELECT_DETAIL}
            FROM inventory i
            JOIN stores s ON s.store_id = i.store_id
            JOIN products p ON p.product_id = i.product_id
            WHERE i.inventory_id = $1"
        );

        sqlx::query_as::<_, InventoryDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch inventory {id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn create(
        &self,
        req: &CreateInventoryRequest,
    ) -> Result<InventoryDetail, RepositoryError> {
        info!(
            "🆕 Creating inventory for store {} product {}",
            req.store_id, req.product_id
        );

        let sql = format!(
            "WITH i AS (
                INSERT INTO inventory (store_id, product_id, quantity, low_stock_threshold)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            {SELECT_DETAIL}
            FROM i
            JOIN stores s ON s.store_id = i.store_id
            JOIN products p ON p.product_id = i.product_id"
        );

        sqlx::query_as::<_, InventoryDetail>(&sql)
            .bind(req.store_id)
            .bind(req.product_id)
            .bind(req.quantity)
            .bind(
                req.low_stock_threshold
                    .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            )
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to create inventory: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn update(
        &self,
        id: i32,
        req: &UpdateInventoryRequest,
    ) -> Result<Option<InventoryDetail>, RepositoryError> {
        info!("✏️ Updating inventory {id}");

        let sql = format!(
            "WITH i AS (
                UPDATE inventory
                SET quantity = COALESCE($2, quantity),
                    low_stock_threshold = COALESCE($3, low_stock_threshold),
                    updated_at = now()
                WHERE inventory_id = $1
                RETURNING *
            )
            {SELECT_DETAIL}
            FROM i
            JOIN stores s ON s.store_id = i.store_id
            JOIN products p ON p.product_id = i.product_id"
        );

        sqlx::query_as::<_, InventoryDetail>(&sql)
            .bind(id)
            .bind(req.quantity)
            .bind(req.low_stock_threshold)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to update inventory {id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        info!("🗑️ Deleting inventory {id}");

        let result = sqlx::query("DELETE FROM inventory WHERE inventory_id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to delete inventory {id}: {e:?}");
                RepositoryError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
