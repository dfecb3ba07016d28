use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::{Postgres, Transaction};
use std::{
    collections::{BTreeSet, HashMap},
    time::Duration,
};
use tracing::{debug, error};

use crate::{
    abstract_trait::order::{OrderTransactionManagerTrait, OrderTransactionTrait},
    model::{
        inventory::Inventory,
        order::{Order, OrderStatus},
        order_item::{NewOrderItem, OrderItem},
    },
};

const ORDER_COLUMNS: &str =
    "order_id, store_id, status, total_amount, rejection_reason, created_at, updated_at";

/// Opens PostgreSQL transactions with `lock_timeout` and `statement_timeout`
/// scoped to the transaction.
#[derive(Clone)]
pub struct OrderTransactionManager {
    db: ConnectionPool,
    lock_timeout: Duration,
    statement_timeout: Duration,
}

impl OrderTransactionManager {
    pub fn new(db: ConnectionPool, lock_timeout: Duration, statement_timeout: Duration) -> Self {
        Self {
            db,
            lock_timeout,
            statement_timeout,
        }
    }
}

#[async_trait]
impl OrderTransactionManagerTrait for OrderTransactionManager {
    async fn begin(&self) -> Result<Box<dyn OrderTransactionTrait>, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(|e| {
            error!("❌ Failed to begin order transaction: {e:?}");
            RepositoryError::from(e)
        })?;

        sqlx::query("SELECT set_config('lock_timeout', $1, true), set_config('statement_timeout', $2, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis()))
            .bind(format!("{}ms", self.statement_timeout.as_millis()))
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PgOrderTransaction { tx }))
    }
}

pub struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransactionTrait for PgOrderTransaction {
    async fn create_pending_order(&mut self, store_id: i32) -> Result<Order, RepositoryError> {
        let sql = format!(
            "INSERT INTO orders (store_id, status) VALUES ($1, $2) RETURNING {ORDER_COLUMNS}"
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(store_id)
            .bind(OrderStatus::Pending)
            .fetch_one(&mut *self.tx)
            .await?;

        debug!("Pending order {} created", order.order_id);
        Ok(order)
    }

    async fn lock_for_update(
        &mut self,
        store_id: i32,
        product_ids: &BTreeSet<i32>,
    ) -> Result<HashMap<i32, Inventory>, RepositoryError> {
        let ids: Vec<i32> = product_ids.iter().copied().collect();

        // ORDER BY makes every caller lock rows in the same sequence.
        let rows = sqlx::query_as::<_, Inventory>(
            r#"
            SELECT inventory_id, store_id, product_id, quantity, low_stock_threshold,
                   created_at, updated_at
            FROM inventory
            WHERE store_id = $1 AND product_id = ANY($2)
            ORDER BY product_id
            FOR UPDATE
            "#,
        )
        .bind(store_id)
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;

        debug!("Locked {} inventory rows in store {store_id}", rows.len());

        Ok(rows.into_iter().map(|row| (row.product_id, row)).collect())
    }

    async fn decrement_stock(
        &mut self,
        store_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE inventory
            SET quantity = quantity - $3, updated_at = now()
            WHERE store_id = $1 AND product_id = $2 AND quantity >= $3
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() != 1 {
            return Err(RepositoryError::Conflict(format!(
                "inventory ({store_id}, {product_id}) cannot cover {quantity}"
            )));
        }

        Ok(())
    }

    async fn insert_order_items(
        &mut self,
        order_id: i32,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut inserted = Vec::with_capacity(items.len());

        for item in items {
            let row = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING order_item_id, order_id, product_id, quantity, unit_price, created_at
                "#,
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .fetch_one(&mut *self.tx)
            .await?;

            inserted.push(row);
        }

        Ok(inserted)
    }

    async fn confirm_order(
        &mut self,
        order_id: i32,
        total_amount: Decimal,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            "UPDATE orders
            SET status = $2, total_amount = $3, rejection_reason = NULL, updated_at = now()
            WHERE order_id = $1 AND status = 'PENDING'
            RETURNING {ORDER_COLUMNS}"
        );

        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(order_id)
            .bind(OrderStatus::Confirmed)
            .bind(total_amount)
            .fetch_one(&mut *self.tx)
            .await?)
    }

    async fn reject_order(&mut self, order_id: i32, reason: &str) -> Result<Order, RepositoryError> {
        let sql = format!(
            "UPDATE orders
            SET status = $2, rejection_reason = $3, updated_at = now()
            WHERE order_id = $1 AND status = 'PENDING'
            RETURNING {ORDER_COLUMNS}"
        );

        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(order_id)
            .bind(OrderStatus::Rejected)
            .bind(reason)
            .fetch_one(&mut *self.tx)
            .await?)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(|e| {
            error!("❌ Failed to commit order transaction: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await.map_err(RepositoryError::from)
    }
}
