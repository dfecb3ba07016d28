use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Product row joined with its category name.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub product_id: i32,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: i32,
    pub category_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
