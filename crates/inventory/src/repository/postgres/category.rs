use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

use crate::{
    abstract_trait::category::CategoryRepositoryTrait, model::category::Category as CategoryModel,
};

#[derive(Clone)]
pub struct CategoryRepository {
    db: ConnectionPool,
}

impl CategoryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    async fn find_all(&self) -> Result<Vec<CategoryModel>, RepositoryError> {
        info!("🔍 Fetching all categories");

        sqlx::query_as::<_, CategoryModel>(
            r#"
            SELECT category_id, name, created_at, updated_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch categories: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CategoryModel>, RepositoryError> {
        sqlx::query_as::<_, CategoryModel>(
            r#"
            SELECT category_id, name, created_at, updated_at
            FROM categories
            WHERE category_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch category {id}: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn create(&self, name: &str) -> Result<CategoryModel, RepositoryError> {
        info!("🆕 Creating category: {name}");

        sqlx::query_as::<_, CategoryModel>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING category_id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to create category {name}: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn update(&self, id: i32, name: &str) -> Result<Option<CategoryModel>, RepositoryError> {
        info!("✏️ Renaming category {id} to {name}");

        sqlx::query_as::<_, CategoryModel>(
            r#"
            UPDATE categories
            SET name = $2, updated_at = now()
            WHERE category_id = $1
            RETURNING category_id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to update category {id}: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        info!("🗑️ Deleting category {id}");

        let result = sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to delete category {id}: {e:?}");
                RepositoryError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
