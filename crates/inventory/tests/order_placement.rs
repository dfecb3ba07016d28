mod common;

use async_trait::async_trait;
use common::{FailingPublisher, TestApp, dec, shop, shop_with};
use inventory::{
    abstract_trait::{
        inventory::InventoryServiceTrait,
        order::{
            DynOrderTransactionManager, OrderCommandServiceTrait, OrderQueryServiceTrait,
            OrderTransactionManagerTrait, OrderTransactionTrait,
        },
        product::ProductServiceTrait,
    },
    di::{DependenciesInject, DependenciesInjectDeps},
    domain::{
        requests::{
            inventory::UpdateInventoryRequest,
            order::{CreateOrderRequest, OrderListQuery},
            product::{CreateProductRequest, UpdateProductRequest},
        },
        response::order::OrderItemResponse,
    },
    model::{
        inventory::Inventory,
        order::{Order, OrderStatus},
        order_item::{NewOrderItem, OrderItem},
    },
    repository::memory::MemoryDatabase,
};
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    domain::{ORDER_CONFIRMED_TOPIC, OrderEvent},
    errors::{RepositoryError, ServiceError},
};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
    time::Duration,
};

#[tokio::test]
async fn confirmed_order_deducts_stock_and_snapshots_prices() {
    let shop = shop().await;
    let app = &shop.app;

    let response = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 4), (shop.p2, 1)]))
        .await
        .unwrap();

    let order = response.data;
    assert_eq!(response.message, "Order confirmed");
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.rejection_reason, None);
    assert_eq!(order.total_amount, dec("112.50"));
    assert_eq!(order.items.len(), 2);

    let hammer = order.items.iter().find(|i| i.product_id == shop.p1).unwrap();
    assert_eq!(hammer.product_title, "Hammer");
    assert_eq!(hammer.unit_price, dec("25.00"));
    assert_eq!(hammer.subtotal, dec("100.00"));

    assert_eq!(app.db.quantity(shop.store, shop.p1), Some(6));
    assert_eq!(app.db.quantity(shop.store, shop.p2), Some(2));
}

#[tokio::test]
async fn ordering_exactly_the_available_stock_empties_the_row() {
    let shop = shop().await;
    let app = &shop.app;

    let order = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p2, 3)]))
        .await
        .unwrap()
        .data;

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(app.db.quantity(shop.store, shop.p2), Some(0));
}

#[tokio::test]
async fn shortfall_rejects_every_line_and_leaves_stock_alone() {
    let shop = shop().await;
    let app = &shop.app;

    let response = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 11), (shop.p2, 4)]))
        .await
        .unwrap();

    let order = response.data;
    assert_eq!(response.message, "Order rejected: insufficient stock");
    assert_eq!(order.status, OrderStatus::Rejected);
    assert_eq!(order.total_amount, Decimal::ZERO);
    assert!(order.items.is_empty());
    assert_eq!(
        order.rejection_reason.as_deref(),
        Some(
            "Insufficient stock: Hammer: requested 11, available 10; \
             Wrench: requested 4, available 3"
        )
    );

    assert_eq!(app.db.quantity(shop.store, shop.p1), Some(10));
    assert_eq!(app.db.quantity(shop.store, shop.p2), Some(3));
    assert_eq!(app.db.order_count(), 1);
    assert_eq!(app.db.order_item_count(), 0);
    assert!(app.publisher.messages().is_empty());
}

#[tokio::test]
async fn one_short_line_rejects_the_whole_order() {
    let shop = shop().await;
    let app = &shop.app;

    let order = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 1), (shop.p2, 5)]))
        .await
        .unwrap()
        .data;

    assert_eq!(order.status, OrderStatus::Rejected);
    let reason = order.rejection_reason.unwrap();
    assert!(reason.contains("Wrench: requested 5, available 3"));
    assert!(!reason.contains("Hammer"));
    assert_eq!(app.db.quantity(shop.store, shop.p1), Some(10));
}

#[tokio::test]
async fn walkthrough_rejects_then_confirms() {
    let app = TestApp::new();
    let category = app.category("Garden").await;
    let p1 = app.product("Shovel", "30.00", category).await;
    let p2 = app.product("Rake", "15.00", category).await;
    let store = app.store("Suburb").await;
    app.stock(store, p1, 5).await;
    app.stock(store, p2, 2).await;

    let first = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(store, [(p1, 2), (p2, 3)]))
        .await
        .unwrap()
        .data;
    assert_eq!(first.status, OrderStatus::Rejected);
    assert!(
        first
            .rejection_reason
            .as_deref()
            .unwrap()
            .contains("Rake: requested 3, available 2")
    );
    assert_eq!(app.db.quantity(store, p1), Some(5));
    assert_eq!(app.db.quantity(store, p2), Some(2));

    let second = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(store, [(p1, 2), (p2, 1)]))
        .await
        .unwrap()
        .data;
    assert_eq!(second.status, OrderStatus::Confirmed);
    assert_eq!(second.total_amount, dec("75.00"));
    assert_eq!(app.db.quantity(store, p1), Some(3));
    assert_eq!(app.db.quantity(store, p2), Some(1));
}

#[tokio::test]
async fn product_without_inventory_row_counts_as_zero_available() {
    let shop = shop().await;
    let app = &shop.app;
    let other_store = app.store("Airport").await;
    app.stock(other_store, shop.p2, 5).await;

    let order = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(other_store, [(shop.p1, 1), (shop.p2, 1)]))
        .await
        .unwrap()
        .data;

    assert_eq!(order.status, OrderStatus::Rejected);
    assert_eq!(
        order.rejection_reason.as_deref(),
        Some("Insufficient stock: Hammer: requested 1, available 0")
    );
    assert_eq!(app.db.quantity(other_store, shop.p2), Some(5));
}

#[tokio::test]
async fn invalid_request_writes_nothing() {
    let shop = shop().await;
    let app = &shop.app;

    let req = CreateOrderRequest::new(shop.store, [(shop.p1, 0), (shop.p1, 2)]);
    let Err(ServiceError::Validation(errors)) = app.services.order_command.place_order(&req).await
    else {
        panic!("expected a validation error");
    };

    assert_eq!(
        errors,
        vec![
            "Item 0: quantity must be a positive integer".to_string(),
            format!("Item 1: duplicate product_id {}", shop.p1),
        ]
    );

    let empty = CreateOrderRequest::new(shop.store, []);
    let Err(ServiceError::Validation(errors)) =
        app.services.order_command.place_order(&empty).await
    else {
        panic!("expected a validation error");
    };
    assert_eq!(errors, vec!["Order must contain at least one item".to_string()]);

    assert_eq!(app.db.order_count(), 0);
    assert_eq!(app.db.quantity(shop.store, shop.p1), Some(10));
}

#[tokio::test]
async fn out_of_range_prices_and_totals_are_validation_errors() {
    let shop = shop().await;
    let app = &shop.app;
    let category = app.category("Luxury").await;

    let Err(ServiceError::Validation(errors)) = app
        .services
        .product_service
        .create(&CreateProductRequest {
            title: "Bullion".into(),
            description: String::new(),
            price: Decimal::MAX,
            category_id: category,
            is_active: true,
        })
        .await
    else {
        panic!("expected a validation error");
    };
    assert_eq!(errors, vec!["price: price must be at most 99999999.99".to_string()]);

    let Err(ServiceError::Validation(errors)) = app
        .services
        .product_service
        .update(
            shop.p1,
            &UpdateProductRequest {
                price: Some(dec("1.999")),
                ..Default::default()
            },
        )
        .await
    else {
        panic!("expected a validation error");
    };
    assert_eq!(
        errors,
        vec!["price: price must have at most 2 decimal places".to_string()]
    );

    let yacht = app.product("Yacht", "99999999.99", category).await;
    app.stock(shop.store, yacht, 500).await;

    let Err(ServiceError::Validation(errors)) = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(yacht, 101)]))
        .await
    else {
        panic!("expected a validation error");
    };
    assert_eq!(
        errors,
        vec!["Order total exceeds the maximum of 9999999999.99".to_string()]
    );
    assert_eq!(app.db.order_count(), 0);
    assert_eq!(app.db.quantity(shop.store, yacht), Some(500));

    let order = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(yacht, 100)]))
        .await
        .unwrap()
        .data;
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.total_amount, dec("9999999999.00"));
}

#[tokio::test]
async fn unknown_store_and_products_are_not_found() {
    let shop = shop().await;
    let app = &shop.app;

    let Err(ServiceError::NotFound(msg)) = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(999, [(shop.p1, 1)]))
        .await
    else {
        panic!("expected store not found");
    };
    assert_eq!(msg, "Store 999 not found");

    let Err(ServiceError::NotFound(msg)) = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(77, 1), (shop.p1, 1), (78, 2)]))
        .await
    else {
        panic!("expected products not found");
    };
    assert_eq!(msg, "Products not found: 77, 78");

    assert_eq!(app.db.order_count(), 0);
}

#[tokio::test]
async fn inactive_product_is_treated_as_unknown() {
    let shop = shop().await;
    let app = &shop.app;

    app.services
        .product_service
        .update(
            shop.p2,
            &UpdateProductRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p2, 1)]))
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
    assert_eq!(app.db.quantity(shop.store, shop.p2), Some(3));
}

#[tokio::test]
async fn confirmation_is_published_after_commit() {
    let shop = shop().await;
    let app = &shop.app;

    let order = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 2)]))
        .await
        .unwrap()
        .data;

    let messages = app.publisher.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].topic, ORDER_CONFIRMED_TOPIC);
    assert_eq!(messages[0].key, order.id.to_string());
    assert_eq!(
        messages[0].event,
        OrderEvent::Confirmed {
            order_id: order.id,
            store_id: shop.store,
            total_amount: dec("50.00"),
            item_count: 1,
        }
    );
}

#[tokio::test]
async fn broker_failure_does_not_undo_a_confirmed_order() {
    let db = Arc::new(MemoryDatabase::new());
    let seeded = shop_with(TestApp::with_db((*db).clone())).await;

    let mut registry = Registry::default();
    let services = DependenciesInject::new(
        DependenciesInjectDeps::in_memory(db.clone(), Arc::new(FailingPublisher)),
        &mut registry,
    );

    let order = services
        .order_command
        .place_order(&CreateOrderRequest::new(seeded.store, [(seeded.p1, 1)]))
        .await
        .unwrap()
        .data;

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(db.quantity(seeded.store, seeded.p1), Some(9));
}

#[tokio::test]
async fn reading_an_order_back_never_changes_it() {
    let shop = shop().await;
    let app = &shop.app;

    let placed = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 3), (shop.p2, 2)]))
        .await
        .unwrap()
        .data;

    let first = app.services.order_query.find_by_id(placed.id).await.unwrap().data;
    let second = app.services.order_query.find_by_id(placed.id).await.unwrap().data;

    assert_eq!(first.total_amount, placed.total_amount);
    assert_eq!(first.status, OrderStatus::Confirmed);
    assert_eq!(first, second);

    let lines = |items: &[OrderItemResponse]| {
        let mut lines: Vec<_> = items
            .iter()
            .map(|i| (i.product_id, i.quantity, i.unit_price))
            .collect();
        lines.sort();
        lines
    };
    let expected = lines(&placed.items);
    let actual = lines(&first.items);
    assert_eq!(actual, expected);

    assert_eq!(app.db.quantity(shop.store, shop.p1), Some(7));
    assert_eq!(app.db.quantity(shop.store, shop.p2), Some(1));
    assert_eq!(app.publisher.messages().len(), 1);
}

#[tokio::test]
async fn missing_order_is_not_found() {
    let app = TestApp::new();
    let result = app.services.order_query.find_by_id(41).await;
    assert!(matches!(result, Err(ServiceError::NotFound(msg)) if msg == "Order 41 not found"));
}

#[tokio::test]
async fn listing_filters_by_status_and_store() {
    let shop = shop().await;
    let app = &shop.app;
    let command = &app.services.order_command;

    command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 1)]))
        .await
        .unwrap();
    command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p2, 9)]))
        .await
        .unwrap();

    let rejected = app
        .services
        .order_query
        .find_all(&OrderListQuery {
            store_id: Some(shop.store),
            status: Some("rejected".into()),
        })
        .await
        .unwrap()
        .data;
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].status, OrderStatus::Rejected);
    assert_eq!(rejected[0].item_count, 0);
    assert_eq!(rejected[0].store_name, "Downtown");

    let all = app
        .services
        .order_query
        .find_all(&OrderListQuery::default())
        .await
        .unwrap()
        .data;
    assert_eq!(all.len(), 2);
    assert!(all[0].id > all[1].id);

    let bad = app
        .services
        .order_query
        .find_all(&OrderListQuery {
            store_id: None,
            status: Some("SHIPPED".into()),
        })
        .await;
    assert!(matches!(bad, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn stats_count_outcomes_and_confirmed_revenue() {
    let shop = shop().await;
    let app = &shop.app;
    let command = &app.services.order_command;

    command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 2)]))
        .await
        .unwrap();
    command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p2, 1)]))
        .await
        .unwrap();
    command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p2, 50)]))
        .await
        .unwrap();

    let stats = app.services.order_query.stats(Some(shop.store)).await.unwrap().data;
    assert_eq!(stats.total_orders, 3);
    assert_eq!(stats.confirmed_orders, 2);
    assert_eq!(stats.rejected_orders, 1);
    assert_eq!(stats.pending_orders, 0);
    assert_eq!(stats.total_revenue, dec("62.50"));
    assert_eq!(stats.avg_order_value, dec("31.25"));

    let empty = app.services.order_query.stats(Some(12345)).await.unwrap().data;
    assert_eq!(empty.total_orders, 0);
    assert_eq!(empty.avg_order_value, Decimal::ZERO);
}

/// Delegates to a real transaction but fails when order items are written,
/// after stock has already been decremented inside the transaction.
struct FailOnItems {
    inner: DynOrderTransactionManager,
}

struct FailingTransaction {
    inner: Box<dyn OrderTransactionTrait>,
}

#[async_trait]
impl OrderTransactionManagerTrait for FailOnItems {
    async fn begin(&self) -> Result<Box<dyn OrderTransactionTrait>, RepositoryError> {
        Ok(Box::new(FailingTransaction {
            inner: self.inner.begin().await?,
        }))
    }
}

#[async_trait]
impl OrderTransactionTrait for FailingTransaction {
    async fn create_pending_order(&mut self, store_id: i32) -> Result<Order, RepositoryError> {
        self.inner.create_pending_order(store_id).await
    }

    async fn lock_for_update(
        &mut self,
        store_id: i32,
        product_ids: &BTreeSet<i32>,
    ) -> Result<HashMap<i32, Inventory>, RepositoryError> {
        self.inner.lock_for_update(store_id, product_ids).await
    }

    async fn decrement_stock(
        &mut self,
        store_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        self.inner.decrement_stock(store_id, product_id, quantity).await
    }

    async fn insert_order_items(
        &mut self,
        _order_id: i32,
        _items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        Err(RepositoryError::Custom("disk full".into()))
    }

    async fn confirm_order(
        &mut self,
        order_id: i32,
        total_amount: Decimal,
    ) -> Result<Order, RepositoryError> {
        self.inner.confirm_order(order_id, total_amount).await
    }

    async fn reject_order(&mut self, order_id: i32, reason: &str) -> Result<Order, RepositoryError> {
        self.inner.reject_order(order_id, reason).await
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.inner.rollback().await
    }
}

#[tokio::test]
async fn failure_mid_transaction_rolls_everything_back() {
    let shop = shop().await;
    let app = &shop.app;

    let mut deps = app.deps();
    deps.transactions = Arc::new(FailOnItems {
        inner: deps.transactions.clone(),
    });
    let mut registry = Registry::default();
    let services = DependenciesInject::new(deps, &mut registry);

    let result = services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 2), (shop.p2, 1)]))
        .await;

    assert!(matches!(result, Err(ServiceError::Internal(_))));
    assert_eq!(app.db.quantity(shop.store, shop.p1), Some(10));
    assert_eq!(app.db.quantity(shop.store, shop.p2), Some(3));
    assert_eq!(app.db.order_count(), 0);
    assert_eq!(app.db.order_item_count(), 0);
    assert!(app.publisher.messages().is_empty());

    // Locks were released, so the next order goes through.
    let order = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 2)]))
        .await
        .unwrap()
        .data;
    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn lock_wait_timeout_aborts_without_writes() {
    let shop = shop_with(TestApp::with_db(MemoryDatabase::with_lock_timeout(
        Duration::from_millis(50),
    )))
    .await;
    let app = &shop.app;

    let mut holder = app.db.begin().await.unwrap();
    holder
        .lock_for_update(shop.store, &BTreeSet::from([shop.p1]))
        .await
        .unwrap();

    let result = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 1)]))
        .await;

    assert!(matches!(result, Err(ServiceError::Internal(_))));
    assert_eq!(app.db.quantity(shop.store, shop.p1), Some(10));
    assert_eq!(app.db.order_count(), 0);

    holder.rollback().await.unwrap();

    let order = app
        .services
        .order_command
        .place_order(&CreateOrderRequest::new(shop.store, [(shop.p1, 1)]))
        .await
        .unwrap()
        .data;
    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
async fn stock_update_waits_for_the_order_holding_the_row() {
    let shop = shop().await;
    let app = &shop.app;
    let store = app.store("Harbor").await;
    let row = app.stock(store, shop.p1, 10).await;

    let mut holder = app.db.begin().await.unwrap();
    holder
        .lock_for_update(store, &BTreeSet::from([shop.p1]))
        .await
        .unwrap();

    let inventory = app.services.inventory_service.clone();
    let mut update = tokio::spawn(async move {
        inventory
            .update(
                row,
                &UpdateInventoryRequest {
                    quantity: Some(15),
                    ..Default::default()
                },
            )
            .await
    });

    assert!(
        tokio::time::timeout(Duration::from_millis(50), &mut update)
            .await
            .is_err(),
        "update finished while the row was locked"
    );

    holder.decrement_stock(store, shop.p1, 10).await.unwrap();
    holder.commit().await.unwrap();
    assert_eq!(app.db.quantity(store, shop.p1), Some(0));

    let updated = update.await.unwrap().unwrap().data;
    assert_eq!(updated.quantity, 15);
    assert_eq!(app.db.quantity(store, shop.p1), Some(15));
    assert_eq!(app.db.tracked_row_locks(), 0);
}
