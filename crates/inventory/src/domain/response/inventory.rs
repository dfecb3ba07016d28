use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::store::StoreSummary;
use crate::model::inventory::InventoryDetail;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct InventoryProductSummary {
    pub id: i32,
    pub title: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct InventoryResponse {
    pub id: i32,
    pub store: StoreSummary,
    pub product: InventoryProductSummary,
    pub quantity: i32,
    pub low_stock_threshold: i32,
    pub is_low_stock: bool,
    pub is_out_of_stock: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<InventoryDetail> for InventoryResponse {
    fn from(value: InventoryDetail) -> Self {
        let row = value.inventory;

        InventoryResponse {
            id: row.inventory_id,
            store: StoreSummary {
                id: row.store_id,
                name: value.store_name,
            },
            product: InventoryProductSummary {
                id: row.product_id,
                title: value.product_title,
                price: value.product_price,
            },
            quantity: row.quantity,
            low_stock_threshold: row.low_stock_threshold,
            is_low_stock: row.is_low_stock(),
            is_out_of_stock: row.is_out_of_stock(),
            updated_at: row.updated_at,
        }
    }
}
