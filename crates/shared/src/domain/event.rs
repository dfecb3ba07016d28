use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const ORDER_CONFIRMED_TOPIC: &str = "order.confirmed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderEvent {
    Confirmed {
        order_id: i32,
        store_id: i32,
        total_amount: Decimal,
        item_count: usize,
    },
}

impl OrderEvent {
    pub fn order_id(&self) -> i32 {
        match self {
            OrderEvent::Confirmed { order_id, .. } => *order_id,
        }
    }
}
