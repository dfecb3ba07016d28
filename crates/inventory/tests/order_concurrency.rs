mod common;

use common::{TestApp, shop};
use inventory::{
    abstract_trait::order::OrderCommandServiceTrait, domain::requests::order::CreateOrderRequest,
    model::order::OrderStatus,
};
use std::time::Duration;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn contended_stock_is_never_oversold() {
    let app = TestApp::new();
    let category = app.category("Tickets").await;
    let product = app.product("Front row", "99.00", category).await;
    let store = app.store("Box office").await;
    app.stock(store, product, 5).await;

    let mut tasks = JoinSet::new();
    for _ in 0..40 {
        let command = app.services.order_command.clone();
        tasks.spawn(async move {
            command
                .place_order(&CreateOrderRequest::new(store, [(product, 1)]))
                .await
                .map(|response| response.data.status)
        });
    }

    let mut confirmed = 0;
    let mut rejected = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap().unwrap() {
            OrderStatus::Confirmed => confirmed += 1,
            OrderStatus::Rejected => rejected += 1,
            OrderStatus::Pending => panic!("order left pending"),
        }
    }

    assert_eq!(confirmed, 5);
    assert_eq!(rejected, 35);
    assert_eq!(app.db.quantity(store, product), Some(0));
    assert_eq!(app.db.order_item_count(), 5);
    assert_eq!(app.publisher.messages().len(), 5);
    assert_eq!(app.db.tracked_row_locks(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn opposite_line_order_does_not_deadlock() {
    let shop = shop().await;
    let app = &shop.app;
    let (store, p1, p2) = (shop.store, shop.p1, shop.p2);

    // Restock so every order below fits.
    let category = app.category("Bulk").await;
    let a = app.product("Bolt", "0.10", category).await;
    let b = app.product("Nut", "0.05", category).await;
    app.stock(store, a, 200).await;
    app.stock(store, b, 200).await;

    let mut tasks = JoinSet::new();
    for i in 0..100 {
        let command = app.services.order_command.clone();
        let lines = if i % 2 == 0 { [(a, 1), (b, 1)] } else { [(b, 1), (a, 1)] };
        tasks.spawn(async move {
            command
                .place_order(&CreateOrderRequest::new(store, lines))
                .await
                .map(|response| response.data.status)
        });
    }

    let all = tokio::time::timeout(Duration::from_secs(20), async {
        let mut statuses = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            statuses.push(joined.unwrap().unwrap());
        }
        statuses
    })
    .await
    .expect("orders deadlocked");

    assert_eq!(all.len(), 100);
    assert!(all.iter().all(|s| *s == OrderStatus::Confirmed));
    assert_eq!(app.db.quantity(store, a), Some(100));
    assert_eq!(app.db.quantity(store, b), Some(100));
    assert_eq!(app.db.quantity(store, p1), Some(10));
    assert_eq!(app.db.quantity(store, p2), Some(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disjoint_products_proceed_independently() {
    let shop = shop().await;
    let app = &shop.app;

    let mut tasks = JoinSet::new();
    for product in [shop.p1, shop.p2] {
        let command = app.services.order_command.clone();
        let store = shop.store;
        tasks.spawn(async move {
            command
                .place_order(&CreateOrderRequest::new(store, [(product, 3)]))
                .await
                .map(|response| response.data.status)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        assert_eq!(joined.unwrap().unwrap(), OrderStatus::Confirmed);
    }

    assert_eq!(app.db.quantity(shop.store, shop.p1), Some(7));
    assert_eq!(app.db.quantity(shop.store, shop.p2), Some(0));
}
