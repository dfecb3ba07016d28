//! Pure decision step of order placement: given the locked inventory rows,
//! decide per line whether stock covers it. No I/O happens here.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::model::{inventory::Inventory, order_item::NewOrderItem, product::Product};

#[derive(Debug, Clone)]
pub(crate) struct OrderLine<'a> {
    pub product: &'a Product,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineOutcome {
    Covered {
        product_id: i32,
        quantity: i32,
        unit_price: Decimal,
    },
    Short {
        title: String,
        requested: i32,
        available: i32,
    },
}

/// One outcome per line, in input order. A missing inventory row counts as
/// zero available.
pub(crate) fn evaluate(lines: &[OrderLine<'_>], locked: &HashMap<i32, Inventory>) -> Vec<LineOutcome> {
    lines
        .iter()
        .map(|line| {
            let available = locked
                .get(&line.product.product_id)
                .map_or(0, |row| row.quantity);

            if line.quantity <= available {
                LineOutcome::Covered {
                    product_id: line.product.product_id,
                    quantity: line.quantity,
                    unit_price: line.product.price,
                }
            } else {
                LineOutcome::Short {
                    title: line.product.title.clone(),
                    requested: line.quantity,
                    available,
                }
            }
        })
        .collect()
}

/// `None` when every line is covered.
pub(crate) fn rejection_reason(outcomes: &[LineOutcome]) -> Option<String> {
    let shortfalls: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            LineOutcome::Short {
                title,
                requested,
                available,
            } => Some(format!("{title}: requested {requested}, available {available}")),
            LineOutcome::Covered { .. } => None,
        })
        .collect();

    if shortfalls.is_empty() {
        None
    } else {
        Some(format!("Insufficient stock: {}", shortfalls.join("; ")))
    }
}

/// Items to persist for a fully covered order.
pub(crate) fn accepted_items(outcomes: &[LineOutcome]) -> Vec<NewOrderItem> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            LineOutcome::Covered {
                product_id,
                quantity,
                unit_price,
            } => Some(NewOrderItem {
                product_id: *product_id,
                quantity: *quantity,
                unit_price: *unit_price,
            }),
            LineOutcome::Short { .. } => None,
        })
        .collect()
}

/// Largest total an `orders.total_amount NUMERIC(12,2)` column holds.
pub(crate) const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Items the order would hold if every line is covered.
pub(crate) fn requested_items(lines: &[OrderLine<'_>]) -> Vec<NewOrderItem> {
    lines
        .iter()
        .map(|line| NewOrderItem {
            product_id: line.product.product_id,
            quantity: line.quantity,
            unit_price: line.product.price,
        })
        .collect()
}

/// `None` when the sum overflows or exceeds [`MAX_ORDER_TOTAL`].
pub(crate) fn order_total(items: &[NewOrderItem]) -> Option<Decimal> {
    let total = items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| {
            item.unit_price
                .checked_mul(Decimal::from(item.quantity))
                .and_then(|line| acc.checked_add(line))
        })?
        .round_dp(2);

    (total <= MAX_ORDER_TOTAL).then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn product(id: i32, title: &str, price: &str) -> Product {
        let now = Utc::now();
        Product {
            product_id: id,
            title: title.into(),
            description: String::new(),
            price: Decimal::from_str(price).unwrap(),
            category_id: 1,
            category_name: "Tools".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn stock(product_id: i32, quantity: i32) -> (i32, Inventory) {
        let now = Utc::now();
        (
            product_id,
            Inventory {
                inventory_id: product_id,
                store_id: 1,
                product_id,
                quantity,
                low_stock_threshold: 10,
                created_at: now,
                updated_at: now,
            },
        )
    }

    #[test]
    fn exact_stock_is_covered() {
        let hammer = product(1, "Hammer", "12.50");
        let locked = HashMap::from([stock(1, 3)]);

        let outcomes = evaluate(
            &[OrderLine {
                product: &hammer,
                quantity: 3,
            }],
            &locked,
        );

        assert_eq!(rejection_reason(&outcomes), None);
        let items = accepted_items(&outcomes);
        assert_eq!(order_total(&items), Some(Decimal::from_str("37.50").unwrap()));
    }

    #[test]
    fn totals_beyond_the_column_range_are_refused() {
        assert_eq!(
            MAX_ORDER_TOTAL,
            Decimal::from_str("9999999999.99").unwrap()
        );

        let unbounded = product(1, "Bullion", "0");
        let unbounded = Product {
            price: Decimal::MAX,
            ..unbounded
        };
        let lines = [OrderLine {
            product: &unbounded,
            quantity: 2,
        }];
        assert_eq!(order_total(&requested_items(&lines)), None);

        let pricey = product(2, "Yacht", "99999999.99");
        let over = [OrderLine {
            product: &pricey,
            quantity: 101,
        }];
        assert_eq!(order_total(&requested_items(&over)), None);

        let at_limit = [OrderLine {
            product: &pricey,
            quantity: 100,
        }];
        assert_eq!(
            order_total(&requested_items(&at_limit)),
            Some(Decimal::from_str("9999999999.00").unwrap())
        );
    }

    #[test]
    fn every_shortfall_is_reported_in_input_order() {
        let saw = product(2, "Saw", "30.00");
        let drill = product(1, "Drill", "99.99");
        let glue = product(3, "Glue", "4.00");
        let locked = HashMap::from([stock(1, 1), stock(2, 10)]);

        let outcomes = evaluate(
            &[
                OrderLine {
                    product: &glue,
                    quantity: 1,
                },
                OrderLine {
                    product: &saw,
                    quantity: 2,
                },
                OrderLine {
                    product: &drill,
                    quantity: 4,
                },
            ],
            &locked,
        );

        assert_eq!(
            rejection_reason(&outcomes).as_deref(),
            Some(
                "Insufficient stock: Glue: requested 1, available 0; \
                 Drill: requested 4, available 1"
            )
        );
    }
}
