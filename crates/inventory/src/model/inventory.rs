use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

#[derive(Debug, Clone, FromRow)]
pub struct Inventory {
    pub inventory_id: i32,
    pub store_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub low_stock_threshold: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inventory {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}

/// Inventory row with the store and product columns needed for listings.
#[derive(Debug, Clone, FromRow)]
pub struct InventoryDetail {
    #[sqlx(flatten)]
    pub inventory: Inventory,
    pub store_name: String,
    pub product_title: String,
    pub product_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(quantity: i32, low_stock_threshold: i32) -> Inventory {
        let now = Utc::now();
        Inventory {
            inventory_id: 1,
            store_id: 1,
            product_id: 1,
            quantity,
            low_stock_threshold,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn low_stock_includes_the_threshold() {
        assert!(row(10, 10).is_low_stock());
        assert!(!row(11, 10).is_low_stock());
    }

    #[test]
    fn out_of_stock_only_at_zero() {
        assert!(row(0, 10).is_out_of_stock());
        assert!(!row(1, 10).is_out_of_stock());
    }
}
