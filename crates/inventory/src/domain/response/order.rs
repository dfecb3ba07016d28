use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{
    order::{Order, OrderStats, OrderStatus, OrderSummary},
    order_item::OrderItemDetail,
    store::Store,
};

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct OrderStoreSummary {
    pub id: i32,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_title: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "19.99")]
    pub unit_price: Decimal,
    #[schema(value_type = String, example = "39.98")]
    pub subtotal: Decimal,
}

impl From<OrderItemDetail> for OrderItemResponse {
    fn from(value: OrderItemDetail) -> Self {
        let subtotal = value.item.subtotal();

        OrderItemResponse {
            id: value.item.order_item_id,
            product_id: value.item.product_id,
            product_title: value.product_title,
            quantity: value.item.quantity,
            unit_price: value.item.unit_price,
            subtotal,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct OrderResponse {
    pub id: i32,
    pub store: OrderStoreSummary,
    pub status: OrderStatus,
    #[schema(value_type = String, example = "59.97")]
    pub total_amount: Decimal,
    pub rejection_reason: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn from_parts(order: Order, store: Store, items: Vec<OrderItemDetail>) -> Self {
        OrderResponse {
            id: order.order_id,
            store: OrderStoreSummary {
                id: store.store_id,
                name: store.name,
                location: store.location,
            },
            status: order.status,
            total_amount: order.total_amount,
            rejection_reason: order.rejection_reason,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderListResponse {
    pub id: i32,
    pub store_id: i32,
    pub store_name: String,
    pub status: OrderStatus,
    #[schema(value_type = String, example = "59.97")]
    pub total_amount: Decimal,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<OrderSummary> for OrderListResponse {
    fn from(value: OrderSummary) -> Self {
        OrderListResponse {
            id: value.order.order_id,
            store_id: value.order.store_id,
            store_name: value.store_name,
            status: value.order.status,
            total_amount: value.order.total_amount,
            item_count: value.item_count,
            created_at: value.order.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct OrderStatsResponse {
    pub total_orders: i64,
    pub confirmed_orders: i64,
    pub rejected_orders: i64,
    pub pending_orders: i64,
    #[schema(value_type = String, example = "1250.00")]
    pub total_revenue: Decimal,
    #[schema(value_type = String, example = "62.50")]
    pub avg_order_value: Decimal,
}

impl From<OrderStats> for OrderStatsResponse {
    fn from(value: OrderStats) -> Self {
        OrderStatsResponse {
            total_orders: value.total_orders,
            confirmed_orders: value.confirmed_orders,
            rejected_orders: value.rejected_orders,
            pending_orders: value.pending_orders,
            total_revenue: value.total_revenue.round_dp(2),
            avg_order_value: value.avg_order_value.round_dp(2),
        }
    }
}
