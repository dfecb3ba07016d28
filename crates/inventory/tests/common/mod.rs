#![allow(dead_code)]

use async_trait::async_trait;
use inventory::{
    abstract_trait::{
        category::CategoryServiceTrait, inventory::InventoryServiceTrait,
        product::ProductServiceTrait, store::StoreServiceTrait,
    },
    di::{DependenciesInject, DependenciesInjectDeps},
    domain::requests::{
        category::CreateCategoryRequest, inventory::CreateInventoryRequest,
        product::CreateProductRequest, store::CreateStoreRequest,
    },
    repository::memory::MemoryDatabase,
    state::AppState,
};
use parking_lot::Mutex;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    abstract_trait::{DynRateLimiter, EventPublisherTrait},
    cache::{DisabledRateLimiter, RateLimitPolicy},
    config::AllowedHosts,
    domain::OrderEvent,
    errors::ServiceError,
};
use std::{str::FromStr, sync::Arc};

#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub topic: String,
    pub key: String,
    pub event: OrderEvent,
}

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
}

impl RecordingPublisher {
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl EventPublisherTrait for RecordingPublisher {
    async fn publish(&self, topic: &str, key: &str, value: &[u8]) -> Result<(), ServiceError> {
        let event: OrderEvent = serde_json::from_slice(value)
            .map_err(|e| ServiceError::Internal(format!("bad payload: {e}")))?;
        self.messages.lock().push(PublishedMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            event,
        });
        Ok(())
    }
}

/// Broker that is always down.
pub struct FailingPublisher;

#[async_trait]
impl EventPublisherTrait for FailingPublisher {
    async fn publish(&self, _: &str, _: &str, _: &[u8]) -> Result<(), ServiceError> {
        Err(ServiceError::Kafka("broker unavailable".into()))
    }
}

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

pub struct TestApp {
    pub db: Arc<MemoryDatabase>,
    pub publisher: Arc<RecordingPublisher>,
    pub services: DependenciesInject,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_db(MemoryDatabase::new())
    }

    pub fn with_db(db: MemoryDatabase) -> Self {
        let db = Arc::new(db);
        let publisher = Arc::new(RecordingPublisher::default());
        let mut registry = Registry::default();
        let services = DependenciesInject::new(
            DependenciesInjectDeps::in_memory(db.clone(), publisher.clone()),
            &mut registry,
        );

        Self {
            db,
            publisher,
            services,
        }
    }

    pub fn deps(&self) -> DependenciesInjectDeps {
        DependenciesInjectDeps::in_memory(self.db.clone(), self.publisher.clone())
    }

    /// Application state over the same database, for router tests.
    pub fn state(&self, rate_limiter: DynRateLimiter, hosts: AllowedHosts) -> AppState {
        AppState::from_deps(self.deps(), rate_limiter, hosts)
    }

    pub fn open_state(&self) -> AppState {
        self.state(
            Arc::new(DisabledRateLimiter::new(RateLimitPolicy::default())),
            AllowedHosts::any(),
        )
    }

    pub async fn category(&self, name: &str) -> i32 {
        self.services
            .category_service
            .create(&CreateCategoryRequest { name: name.into() })
            .await
            .unwrap()
            .data
            .id
    }

    pub async fn product(&self, title: &str, price: &str, category_id: i32) -> i32 {
        self.services
            .product_service
            .create(&CreateProductRequest {
                title: title.into(),
                description: format!("{title} description"),
                price: dec(price),
                category_id,
                is_active: true,
            })
            .await
            .unwrap()
            .data
            .id
    }

    pub async fn store(&self, name: &str) -> i32 {
        self.services
            .store_service
            .create(&CreateStoreRequest {
                name: name.into(),
                location: format!("{name} street 1"),
                is_active: true,
            })
            .await
            .unwrap()
            .data
            .id
    }

    pub async fn stock(&self, store_id: i32, product_id: i32, quantity: i32) -> i32 {
        self.services
            .inventory_service
            .create(&CreateInventoryRequest {
                store_id,
                product_id,
                quantity,
                low_stock_threshold: None,
            })
            .await
            .unwrap()
            .data
            .id
    }
}

/// Store 1 with P1 (25.00, 10 units) and P2 (12.50, 3 units).
pub struct Shop {
    pub app: TestApp,
    pub store: i32,
    pub p1: i32,
    pub p2: i32,
}

pub async fn shop() -> Shop {
    shop_with(TestApp::new()).await
}

pub async fn shop_with(app: TestApp) -> Shop {
    let category = app.category("Tools").await;
    let p1 = app.product("Hammer", "25.00", category).await;
    let p2 = app.product("Wrench", "12.50", category).await;
    let store = app.store("Downtown").await;
    app.stock(store, p1, 10).await;
    app.stock(store, p2, 3).await;

    Shop { app, store, p1, p2 }
}
