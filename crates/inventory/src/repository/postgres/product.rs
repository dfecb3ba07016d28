use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

use crate::{
    abstract_trait::product::{ProductChanges, ProductRepositoryTrait},
    domain::requests::product::{CreateProductRequest, ProductSearchFilter},
    model::product::Product as ProductModel,
    repository::escape_like,
};

const SELECT_PRODUCT: &str = r#"
    SELECT
        p.product_id,
        p.title,
        p.description,
        p.price,
        p.category_id,
        c.name AS category_name,
        p.is_active,
        p.created_at,
        p.updated_at
"#;

#[derive(Clone)]
pub struct ProductRepository {
    db: ConnectionPool,
}

impl ProductRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    async fn find_active(&self) -> Result<Vec<ProductModel>, RepositoryError> {
        info!("🟢 Fetching active products");

        let sql = format!(
            "{SELECT_PRODUCT}
            FROM products p
            JOIN categories c ON c.category_id = p.category_id
            WHERE p.is_active
            ORDER BY p.title"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch active products: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductModel>, RepositoryError> {
        let sql = format!(
            "{SELECT_PRODUCT}
            FROM products p
            JOIN categories c ON c.category_id = p.category_id
            WHERE p.product_id = $1"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch product {id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<ProductModel>, RepositoryError> {
        let sql = format!(
            "{SELECT_PRODUCT}
            FROM products p
            JOIN categories c ON c.category_id = p.category_id
            WHERE p.product_id = ANY($1)"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(ids)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch products {ids:?}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn search(
        &self,
        filter: &ProductSearchFilter,
    ) -> Result<Vec<ProductModel>, RepositoryError> {
        info!("🔍 Searching products: {filter:?}");

        let sql = format!(
            "{SELECT_PRODUCT}
            FROM products p
            JOIN categories c ON c.category_id = p.category_id
            WHERE p.is_active
              AND ($1::TEXT IS NULL
                   OR p.title ILIKE '%' || $1 || '%'
                   OR p.description ILIKE '%' || $1 || '%'
                   OR c.name ILIKE '%' || $1 || '%')
              AND ($2::INT IS NULL OR p.category_id = $2)
              AND ($3::NUMERIC IS NULL OR p.price >= $3)
              AND ($4::NUMERIC IS NULL OR p.price <= $4)
              AND ($5::INT IS NULL OR EXISTS (
                    SELECT 1 FROM inventory i
                    WHERE i.product_id = p.product_id
                      AND i.store_id = $5
                      AND i.quantity > 0))
            ORDER BY p.title"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(filter.query.as_deref().map(escape_like))
            .bind(filter.category_id)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.store_id)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Product search failed: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn autocomplete(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<ProductModel>, RepositoryError> {
        let sql = format!(
            "{SELECT_PRODUCT}
            FROM products p
            JOIN categories c ON c.category_id = p.category_id
            WHERE p.is_active AND p.title ILIKE $1 || '%'
            ORDER BY p.title
            LIMIT $2"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(escape_like(prefix))
            .bind(limit)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Autocomplete query failed for {prefix:?}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn create(&self, req: &CreateProductRequest) -> Result<ProductModel, RepositoryError> {
        info!("🆕 Creating product: {}", req.title);

        let sql = format!(
            "WITH p AS (
                INSERT INTO products (title, description, price, category_id, is_active)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            {SELECT_PRODUCT}
            FROM p
            JOIN categories c ON c.category_id = p.category_id"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(&req.title)
            .bind(&req.description)
            .bind(req.price)
            .bind(req.category_id)
            .bind(req.is_active)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to create product: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn update(
        &self,
        id: i32,
        changes: &ProductChanges,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        info!("✏️ Updating product {id}");

        let sql = format!(
            "WITH p AS (
                UPDATE products
                SET price = COALESCE($2, price),
                    description = COALESCE($3, description),
                    is_active = COALESCE($4, is_active),
                    updated_at = now()
                WHERE product_id = $1
                RETURNING *
            )
            {SELECT_PRODUCT}
            FROM p
            JOIN categories c ON c.category_id = p.category_id"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(id)
            .bind(changes.price)
            .bind(changes.description.as_deref())
            .bind(changes.is_active)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to update product {id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        info!("🗑️ Deleting product {id}");

        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to delete product {id}: {e:?}");
                RepositoryError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
