use inventory::domain::response::order::OrderResponse;
use rust_decimal::Decimal;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationLine {
    pub title: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// What a customer is told about a confirmed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    pub order_id: i32,
    pub store_name: String,
    pub store_location: String,
    pub lines: Vec<ConfirmationLine>,
    pub total_amount: Decimal,
}

impl From<&OrderResponse> for OrderConfirmation {
    fn from(order: &OrderResponse) -> Self {
        Self {
            order_id: order.id,
            store_name: order.store.name.clone(),
            store_location: order.store.location.clone(),
            lines: order
                .items
                .iter()
                .map(|item| ConfirmationLine {
                    title: item.product_title.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    subtotal: item.subtotal,
                })
                .collect(),
            total_amount: order.total_amount,
        }
    }
}

impl OrderConfirmation {
    pub fn subject(&self) -> String {
        format!("Order #{} confirmed", self.order_id)
    }

    pub fn render(&self) -> String {
        let mut body = format!(
            "Order #{} confirmed at {} ({})\n",
            self.order_id, self.store_name, self.store_location
        );
        for line in &self.lines {
            let _ = writeln!(
                body,
                "  {} x {} @ {} = {}",
                line.quantity, line.title, line.unit_price, line.subtotal
            );
        }
        let _ = write!(body, "Total: {}", self.total_amount);
        body
    }
}
