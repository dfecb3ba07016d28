use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

use crate::{
    abstract_trait::order::OrderQueryRepositoryTrait,
    domain::requests::order::OrderFilter,
    model::{
        order::{Order, OrderStats, OrderSummary},
        order_item::OrderItemDetail,
    },
};

#[derive(Clone)]
pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT order_id, store_id, status, total_amount, rejection_reason,
                   created_at, updated_at
            FROM orders
            WHERE order_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch order {id}: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn find_items(&self, order_id: i32) -> Result<Vec<OrderItemDetail>, RepositoryError> {
        sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.order_item_id, oi.order_id, oi.product_id, oi.quantity,
                   oi.unit_price, oi.created_at, p.title AS product_title
            FROM order_items oi
            JOIN products p ON p.product_id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.order_item_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch items of order {order_id}: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn find_all(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, RepositoryError> {
        info!("🔍 Listing orders: {filter:?}");

        sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.order_id, o.store_id, o.status, o.total_amount, o.rejection_reason,
                   o.created_at, o.updated_at,
                   s.name AS store_name,
                   (SELECT COUNT(*) FROM order_items oi WHERE oi.order_id = o.order_id)
                       AS item_count
            FROM orders o
            JOIN stores s ON s.store_id = o.store_id
            WHERE ($1::INT IS NULL OR o.store_id = $1)
              AND ($2::TEXT IS NULL OR o.status = $2)
            ORDER BY o.created_at DESC, o.order_id DESC
            "#,
        )
        .bind(filter.store_id)
        .bind(filter.status)
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to list orders: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn stats(&self, store_id: Option<i32>) -> Result<OrderStats, RepositoryError> {
        sqlx::query_as::<_, OrderStats>(
            r#"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE status = 'CONFIRMED') AS confirmed_orders,
                COUNT(*) FILTER (WHERE status = 'REJECTED') AS rejected_orders,
                COUNT(*) FILTER (WHERE status = 'PENDING') AS pending_orders,
                COALESCE(SUM(total_amount) FILTER (WHERE status = 'CONFIRMED'), 0)
                    AS total_revenue,
                ROUND(COALESCE(AVG(total_amount) FILTER (WHERE status = 'CONFIRMED'), 0), 2)
                    AS avg_order_value
            FROM orders
            WHERE ($1::INT IS NULL OR store_id = $1)
            "#,
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to compute order stats: {e:?}");
            RepositoryError::from(e)
        })
    }
}
