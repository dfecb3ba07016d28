use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::errors::RepositoryError;
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use crate::model::{
    inventory::Inventory,
    order::Order,
    order_item::{NewOrderItem, OrderItem},
};

pub type DynOrderTransactionManager = Arc<dyn OrderTransactionManagerTrait + Send + Sync>;

#[async_trait]
pub trait OrderTransactionManagerTrait {
    /// Opens a unit of work whose lock waits are bounded by the configured
    /// lock timeout.
    async fn begin(&self) -> Result<Box<dyn OrderTransactionTrait>, RepositoryError>;
}

/// One atomic unit of work for placing an order.
///
/// Nothing written through it is visible to other callers before `commit`.
/// Row locks taken by `lock_for_update` are held until `commit` or
/// `rollback`, and dropping the transaction without either rolls it back.
#[async_trait]
pub trait OrderTransactionTrait: Send {
    async fn create_pending_order(&mut self, store_id: i32) -> Result<Order, RepositoryError>;

    /// Takes exclusive locks on the `(store_id, product_id)` inventory rows in
    /// ascending product order and returns the rows that exist, keyed by
    /// product id. Blocks while another transaction holds any of them.
    async fn lock_for_update(
        &mut self,
        store_id: i32,
        product_ids: &BTreeSet<i32>,
    ) -> Result<HashMap<i32, Inventory>, RepositoryError>;

    /// Only valid for a row locked by this transaction.
    async fn decrement_stock(
        &mut self,
        store_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<(), RepositoryError>;

    async fn insert_order_items(
        &mut self,
        order_id: i32,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError>;

    async fn confirm_order(
        &mut self,
        order_id: i32,
        total_amount: Decimal,
    ) -> Result<Order, RepositoryError>;

    async fn reject_order(&mut self, order_id: i32, reason: &str)
    -> Result<Order, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}
