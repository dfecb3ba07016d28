//! Process-local storage implementing every repository trait.
//!
//! Row locks are per `(store_id, product_id)` async mutexes with a bounded
//! wait. Order transactions take them in ascending product order and hold
//! them until commit or rollback; direct inventory writes take the same lock
//! for the duration of the write, so both behave like the PostgreSQL backend
//! under concurrency.

mod catalog;
mod order;

pub use self::order::MemoryOrderTransaction;

use parking_lot::{Mutex, RwLock};
use shared::errors::RepositoryError;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};
use tokio::sync::OwnedMutexGuard;

use crate::model::{
    category::Category, inventory::Inventory, order::Order, order_item::OrderItem,
    product::Product, store::Store,
};

type RowKey = (i32, i32);

/// Lock table keyed by `(store_id, product_id)`. An entry lives only while
/// some caller holds or waits for it.
#[derive(Debug, Default)]
struct RowLocks {
    rows: Mutex<HashMap<RowKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl RowLocks {
    async fn acquire(
        self: &Arc<Self>,
        key: RowKey,
        timeout: Duration,
    ) -> Result<RowGuard, RepositoryError> {
        let row = {
            let mut rows = self.rows.lock();
            Arc::clone(rows.entry(key).or_default())
        };

        let acquired = tokio::time::timeout(timeout, row.lock_owned()).await;
        match acquired {
            Ok(guard) => Ok(RowGuard {
                locks: Arc::clone(self),
                key,
                guard: Some(guard),
            }),
            Err(_) => {
                self.prune(key);
                Err(RepositoryError::LockTimeout(format!(
                    "inventory row ({}, {}) still locked after {timeout:?}",
                    key.0, key.1
                )))
            }
        }
    }

    /// Drops the entry once the table holds the only reference. Clones are
    /// only taken under the table lock, so nobody can be waiting on it.
    fn prune(&self, key: RowKey) {
        let mut rows = self.rows.lock();
        if rows
            .get(&key)
            .is_some_and(|row| Arc::strong_count(row) == 1)
        {
            rows.remove(&key);
        }
    }

    fn len(&self) -> usize {
        self.rows.lock().len()
    }
}

/// Held row lock. Releasing it prunes the lock table.
struct RowGuard {
    locks: Arc<RowLocks>,
    key: RowKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RowGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.prune(self.key);
    }
}

#[derive(Debug, Default)]
struct Sequences {
    category: i32,
    product: i32,
    store: i32,
    inventory: i32,
    order: i32,
    order_item: i32,
}

fn next_id(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<i32, Category>,
    products: BTreeMap<i32, Product>,
    stores: BTreeMap<i32, Store>,
    inventory: BTreeMap<i32, Inventory>,
    orders: BTreeMap<i32, Order>,
    order_items: BTreeMap<i32, OrderItem>,
    seq: Sequences,
}

impl Tables {
    fn inventory_row(&self, store_id: i32, product_id: i32) -> Option<&Inventory> {
        self.inventory
            .values()
            .find(|row| row.store_id == store_id && row.product_id == product_id)
    }

    fn inventory_row_mut(&mut self, store_id: i32, product_id: i32) -> Option<&mut Inventory> {
        self.inventory
            .values_mut()
            .find(|row| row.store_id == store_id && row.product_id == product_id)
    }
}

#[derive(Clone)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
    row_locks: Arc<RowLocks>,
    lock_timeout: Duration,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::with_lock_timeout(Duration::from_secs(5))
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            row_locks: Arc::new(RowLocks::default()),
            lock_timeout,
        }
    }

    /// Committed quantity of an inventory row.
    pub fn quantity(&self, store_id: i32, product_id: i32) -> Option<i32> {
        self.tables
            .read()
            .inventory_row(store_id, product_id)
            .map(|row| row.quantity)
    }

    pub fn order_count(&self) -> usize {
        self.tables.read().orders.len()
    }

    pub fn order_item_count(&self) -> usize {
        self.tables.read().order_items.len()
    }

    /// Rows with a lock currently held or awaited.
    pub fn tracked_row_locks(&self) -> usize {
        self.row_locks.len()
    }

    async fn lock_row(&self, store_id: i32, product_id: i32) -> Result<RowGuard, RepositoryError> {
        self.row_locks
            .acquire((store_id, product_id), self.lock_timeout)
            .await
    }

    /// Locks every inventory row matching `belongs`, in key order.
    async fn lock_rows_where(
        &self,
        belongs: impl Fn(&Inventory) -> bool,
    ) -> Result<Vec<RowGuard>, RepositoryError> {
        let mut keys: Vec<RowKey> = self
            .tables
            .read()
            .inventory
            .values()
            .filter(|row| belongs(row))
            .map(|row| (row.store_id, row.product_id))
            .collect();
        keys.sort_unstable();

        let mut held = Vec::with_capacity(keys.len());
        for (store_id, product_id) in keys {
            held.push(self.lock_row(store_id, product_id).await?);
        }
        Ok(held)
    }
}

impl std::fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("MemoryDatabase")
            .field("products", &tables.products.len())
            .field("stores", &tables.stores.len())
            .field("inventory", &tables.inventory.len())
            .field("orders", &tables.orders.len())
            .field("lock_timeout", &self.lock_timeout)
            .finish()
    }
}
