use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::errors::RepositoryError;
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
    time::Duration,
};
use tracing::debug;

use super::{MemoryDatabase, RowGuard, RowLocks, Tables, next_id};
use crate::{
    abstract_trait::order::{
        OrderQueryRepositoryTrait, OrderTransactionManagerTrait, OrderTransactionTrait,
    },
    domain::requests::order::OrderFilter,
    model::{
        inventory::Inventory,
        order::{Order, OrderStats, OrderStatus, OrderSummary},
        order_item::{NewOrderItem, OrderItem, OrderItemDetail},
    },
};

#[async_trait]
impl OrderQueryRepositoryTrait for MemoryDatabase {
    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.read().orders.get(&id).cloned())
    }

    async fn find_items(&self, order_id: i32) -> Result<Vec<OrderItemDetail>, RepositoryError> {
        let tables = self.tables.read();

        Ok(tables
            .order_items
            .values()
            .filter(|item| item.order_id == order_id)
            .map(|item| OrderItemDetail {
                item: item.clone(),
                product_title: tables
                    .products
                    .get(&item.product_id)
                    .map(|p| p.title.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn find_all(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, RepositoryError> {
        let tables = self.tables.read();

        let mut rows: Vec<OrderSummary> = tables
            .orders
            .values()
            .filter(|o| filter.store_id.is_none_or(|id| o.store_id == id))
            .filter(|o| filter.status.is_none_or(|status| o.status == status))
            .map(|o| OrderSummary {
                order: o.clone(),
                store_name: tables
                    .stores
                    .get(&o.store_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                item_count: tables
                    .order_items
                    .values()
                    .filter(|item| item.order_id == o.order_id)
                    .count() as i64,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.order
                .created_at
                .cmp(&a.order.created_at)
                .then(b.order.order_id.cmp(&a.order.order_id))
        });
        Ok(rows)
    }

    async fn stats(&self, store_id: Option<i32>) -> Result<OrderStats, RepositoryError> {
        let tables = self.tables.read();
        let mut stats = OrderStats::default();

        for order in tables
            .orders
            .values()
            .filter(|o| store_id.is_none_or(|id| o.store_id == id))
        {
            stats.total_orders += 1;
            match order.status {
                OrderStatus::Pending => stats.pending_orders += 1,
                OrderStatus::Rejected => stats.rejected_orders += 1,
                OrderStatus::Confirmed => {
                    stats.confirmed_orders += 1;
                    stats.total_revenue += order.total_amount;
                }
            }
        }

        if stats.confirmed_orders > 0 {
            stats.avg_order_value =
                (stats.total_revenue / Decimal::from(stats.confirmed_orders)).round_dp(2);
        }

        Ok(stats)
    }
}

#[async_trait]
impl OrderTransactionManagerTrait for MemoryDatabase {
    async fn begin(&self) -> Result<Box<dyn OrderTransactionTrait>, RepositoryError> {
        Ok(Box::new(MemoryOrderTransaction {
            tables: Arc::clone(&self.tables),
            row_locks: Arc::clone(&self.row_locks),
            lock_timeout: self.lock_timeout,
            held: Vec::new(),
            locked: BTreeSet::new(),
            order: None,
            items: Vec::new(),
            deductions: Vec::new(),
        }))
    }
}

/// Buffers writes until `commit`. Held row guards release on drop, which is
/// also how an abandoned transaction rolls back.
pub struct MemoryOrderTransaction {
    tables: Arc<RwLock<Tables>>,
    row_locks: Arc<RowLocks>,
    lock_timeout: Duration,
    held: Vec<RowGuard>,
    locked: BTreeSet<(i32, i32)>,
    order: Option<Order>,
    items: Vec<OrderItem>,
    deductions: Vec<(i32, i32, i32)>,
}

impl MemoryOrderTransaction {
    fn pending_order_mut(&mut self, order_id: i32) -> Result<&mut Order, RepositoryError> {
        self.order
            .as_mut()
            .filter(|o| o.order_id == order_id && o.status == OrderStatus::Pending)
            .ok_or(RepositoryError::NotFound)
    }

    fn deducted(&self, store_id: i32, product_id: i32) -> i32 {
        self.deductions
            .iter()
            .filter(|(s, p, _)| *s == store_id && *p == product_id)
            .map(|(_, _, quantity)| quantity)
            .sum()
    }
}

#[async_trait]
impl OrderTransactionTrait for MemoryOrderTransaction {
    async fn create_pending_order(&mut self, store_id: i32) -> Result<Order, RepositoryError> {
        let order_id = {
            let mut tables = self.tables.write();
            if !tables.stores.contains_key(&store_id) {
                return Err(RepositoryError::ForeignKey(format!(
                    "store {store_id} does not exist"
                )));
            }
            next_id(&mut tables.seq.order)
        };

        let now = Utc::now();
        let order = Order {
            order_id,
            store_id,
            status: OrderStatus::Pending,
            total_amount: Decimal::ZERO,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.order = Some(order.clone());

        Ok(order)
    }

    async fn lock_for_update(
        &mut self,
        store_id: i32,
        product_ids: &BTreeSet<i32>,
    ) -> Result<HashMap<i32, Inventory>, RepositoryError> {
        // BTreeSet iteration is ascending, the shared lock order.
        for &product_id in product_ids {
            if self.locked.contains(&(store_id, product_id)) {
                continue;
            }

            let guard = self
                .row_locks
                .acquire((store_id, product_id), self.lock_timeout)
                .await?;

            self.held.push(guard);
            self.locked.insert((store_id, product_id));
        }

        debug!("Locked {} inventory keys in store {store_id}", product_ids.len());

        let tables = self.tables.read();
        Ok(product_ids
            .iter()
            .filter_map(|&product_id| tables.inventory_row(store_id, product_id))
            .map(|row| (row.product_id, row.clone()))
            .collect())
    }

    async fn decrement_stock(
        &mut self,
        store_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if !self.locked.contains(&(store_id, product_id)) {
            return Err(RepositoryError::Custom(format!(
                "inventory row ({store_id}, {product_id}) is not locked by this transaction"
            )));
        }

        let available = self
            .tables
            .read()
            .inventory_row(store_id, product_id)
            .map(|row| row.quantity)
            .unwrap_or(0)
            - self.deducted(store_id, product_id);

        if available < quantity {
            return Err(RepositoryError::Conflict(format!(
                "inventory ({store_id}, {product_id}) cannot cover {quantity}"
            )));
        }

        self.deductions.push((store_id, product_id, quantity));
        Ok(())
    }

    async fn insert_order_items(
        &mut self,
        order_id: i32,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        self.pending_order_mut(order_id)?;

        let now = Utc::now();
        let inserted: Vec<OrderItem> = {
            let mut tables = self.tables.write();
            items
                .iter()
                .map(|item| OrderItem {
                    order_item_id: next_id(&mut tables.seq.order_item),
                    order_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    created_at: now,
                })
                .collect()
        };

        self.items.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn confirm_order(
        &mut self,
        order_id: i32,
        total_amount: Decimal,
    ) -> Result<Order, RepositoryError> {
        let order = self.pending_order_mut(order_id)?;
        order.status = OrderStatus::Confirmed;
        order.total_amount = total_amount;
        order.rejection_reason = None;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn reject_order(&mut self, order_id: i32, reason: &str) -> Result<Order, RepositoryError> {
        let order = self.pending_order_mut(order_id)?;
        order.status = OrderStatus::Rejected;
        order.rejection_reason = Some(reason.to_string());
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let MemoryOrderTransaction {
            tables,
            held,
            order,
            items,
            deductions,
            ..
        } = *self;

        {
            let mut tables = tables.write();

            for &(store_id, product_id, quantity) in &deductions {
                let enough = tables
                    .inventory_row(store_id, product_id)
                    .is_some_and(|row| row.quantity >= quantity);
                if !enough {
                    return Err(RepositoryError::Conflict(format!(
                        "inventory ({store_id}, {product_id}) would go negative"
                    )));
                }
            }

            let now = Utc::now();
            for (store_id, product_id, quantity) in deductions {
                if let Some(row) = tables.inventory_row_mut(store_id, product_id) {
                    row.quantity -= quantity;
                    row.updated_at = now;
                }
            }

            if let Some(order) = order {
                tables.orders.insert(order.order_id, order);
            }
            for item in items {
                tables.order_items.insert(item.order_item_id, item);
            }
        }

        drop(held);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        debug!("Discarding buffered order writes");
        Ok(())
    }
}
