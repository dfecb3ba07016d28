//! Runs against a real database. Set `DATABASE_URL` and use
//! `cargo test -p inventory -- --ignored`.

mod common;

use common::{RecordingPublisher, dec};
use inventory::{
    abstract_trait::{
        category::CategoryServiceTrait, inventory::InventoryServiceTrait,
        order::OrderCommandServiceTrait, product::ProductServiceTrait, store::StoreServiceTrait,
    },
    di::{DependenciesInject, DependenciesInjectDeps},
    domain::requests::{
        category::CreateCategoryRequest, inventory::CreateInventoryRequest,
        order::CreateOrderRequest, product::CreateProductRequest, store::CreateStoreRequest,
    },
    model::order::OrderStatus,
};
use prometheus_client::registry::Registry;
use shared::config::{ConnectionManager, ConnectionPool};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinSet;

async fn pool() -> ConnectionPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = ConnectionManager::new_pool(&url, 1, 20).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

fn services(pool: ConnectionPool) -> DependenciesInject {
    let mut registry = Registry::default();
    DependenciesInject::new(
        DependenciesInjectDeps::postgres(
            pool,
            Arc::new(RecordingPublisher::default()),
            Duration::from_secs(5),
            Duration::from_secs(30),
        ),
        &mut registry,
    )
}

/// Seeds a store with one product and returns `(store_id, product_id)`.
async fn seed(services: &DependenciesInject, quantity: i32) -> (i32, i32) {
    let tag = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();

    let category = services
        .category_service
        .create(&CreateCategoryRequest {
            name: format!("pg-category-{tag}"),
        })
        .await
        .unwrap()
        .data
        .id;
    let product = services
        .product_service
        .create(&CreateProductRequest {
            title: format!("pg-product-{tag}"),
            description: String::new(),
            price: dec("9.99"),
            category_id: category,
            is_active: true,
        })
        .await
        .unwrap()
        .data
        .id;
    let store = services
        .store_service
        .create(&CreateStoreRequest {
            name: format!("pg-store-{tag}"),
            location: "test".into(),
            is_active: true,
        })
        .await
        .unwrap()
        .data
        .id;
    services
        .inventory_service
        .create(&CreateInventoryRequest {
            store_id: store,
            product_id: product,
            quantity,
            low_stock_threshold: None,
        })
        .await
        .unwrap();

    (store, product)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore = "requires PostgreSQL"]
async fn postgres_never_oversells_under_contention() {
    let services = services(pool().await);
    let (store, product) = seed(&services, 3).await;

    let mut tasks = JoinSet::new();
    for _ in 0..12 {
        let command = services.order_command.clone();
        tasks.spawn(async move {
            command
                .place_order(&CreateOrderRequest::new(store, [(product, 1)]))
                .await
                .map(|response| response.data.status)
        });
    }

    let mut confirmed = 0;
    while let Some(joined) = tasks.join_next().await {
        if joined.unwrap().unwrap() == OrderStatus::Confirmed {
            confirmed += 1;
        }
    }
    assert_eq!(confirmed, 3);

    let rejected = services
        .order_command
        .place_order(&CreateOrderRequest::new(store, [(product, 1)]))
        .await
        .unwrap()
        .data;
    assert_eq!(rejected.status, OrderStatus::Rejected);
    assert!(
        rejected
            .rejection_reason
            .unwrap()
            .ends_with("requested 1, available 0")
    );
}
