use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::{IntoParams, ToSchema};

use crate::model::order::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub store_id: i32,
    pub items: Vec<CreateOrderItemRequest>,
}

impl CreateOrderRequest {
    pub fn new(store_id: i32, items: impl IntoIterator<Item = (i32, i32)>) -> Self {
        Self {
            store_id,
            items: items
                .into_iter()
                .map(|(product_id, quantity)| CreateOrderItemRequest {
                    product_id,
                    quantity,
                })
                .collect(),
        }
    }

    /// Collects every problem with the request instead of stopping at the first.
    pub fn validate_lines(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.store_id <= 0 {
            errors.push("store_id must be positive".to_string());
        }

        if self.items.is_empty() {
            errors.push("Order must contain at least one item".to_string());
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        for (idx, item) in self.items.iter().enumerate() {
            if item.product_id <= 0 {
                errors.push(format!("Item {idx}: product_id must be positive"));
            }
            if item.quantity <= 0 {
                errors.push(format!("Item {idx}: quantity must be a positive integer"));
            }
            if !seen.insert(item.product_id) {
                errors.push(format!(
                    "Item {idx}: duplicate product_id {}",
                    item.product_id
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub store_id: Option<i32>,
    /// PENDING, CONFIRMED or REJECTED.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub store_id: Option<i32>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct OrderStatsQuery {
    pub store_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_request_passes() {
        assert!(CreateOrderRequest::new(1, [(1, 2), (2, 1)]).validate_lines().is_ok());
    }

    #[test]
    fn empty_items_are_rejected() {
        let errors = CreateOrderRequest::new(1, []).validate_lines().unwrap_err();
        assert_eq!(errors, vec!["Order must contain at least one item"]);
    }

    #[test]
    fn every_problem_is_reported() {
        let errors = CreateOrderRequest::new(1, [(4, 0), (7, 2), (4, -3)])
            .validate_lines()
            .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "Item 0: quantity must be a positive integer",
                "Item 2: quantity must be a positive integer",
                "Item 2: duplicate product_id 4",
            ]
        );
    }
}
