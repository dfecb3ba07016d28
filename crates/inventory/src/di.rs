use shared::{abstract_trait::DynEventPublisher, config::ConnectionPool};
use prometheus_client::registry::Registry;
use std::{fmt, sync::Arc, time::Duration};

use crate::{
    abstract_trait::{
        category::{DynCategoryRepository, DynCategoryService},
        inventory::{DynInventoryRepository, DynInventoryService},
        order::{
            DynOrderCommandService, DynOrderQueryRepository, DynOrderQueryService,
            DynOrderTransactionManager,
        },
        product::{DynProductRepository, DynProductService},
        store::{DynStoreRepository, DynStoreService},
    },
    repository::{
        memory::MemoryDatabase,
        postgres::{
            CategoryRepository, InventoryRepository, OrderQueryRepository,
            OrderTransactionManager, ProductRepository, StoreRepository,
        },
    },
    service::{
        CategoryService, InventoryService, InventoryServiceDeps, OrderCommandService,
        OrderCommandServiceDeps, OrderQueryService, OrderQueryServiceDeps, ProductService,
        StoreService,
    },
};

#[derive(Clone)]
pub struct DependenciesInject {
    pub category_service: DynCategoryService,
    pub product_service: DynProductService,
    pub store_service: DynStoreService,
    pub inventory_service: DynInventoryService,
    pub order_command: DynOrderCommandService,
    pub order_query: DynOrderQueryService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("category_service", &"CategoryService")
            .field("product_service", &"ProductService")
            .field("store_service", &"StoreService")
            .field("inventory_service", &"InventoryService")
            .field("order_command", &"OrderCommandService")
            .field("order_query", &"OrderQueryService")
            .finish()
    }
}

/// Storage and messaging backends the services are wired onto.
#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub categories: DynCategoryRepository,
    pub products: DynProductRepository,
    pub stores: DynStoreRepository,
    pub inventory: DynInventoryRepository,
    pub orders: DynOrderQueryRepository,
    pub transactions: DynOrderTransactionManager,
    pub publisher: DynEventPublisher,
}

impl DependenciesInjectDeps {
    pub fn postgres(
        pool: ConnectionPool,
        publisher: DynEventPublisher,
        lock_timeout: Duration,
        statement_timeout: Duration,
    ) -> Self {
        Self {
            categories: Arc::new(CategoryRepository::new(pool.clone())),
            products: Arc::new(ProductRepository::new(pool.clone())),
            stores: Arc::new(StoreRepository::new(pool.clone())),
            inventory: Arc::new(InventoryRepository::new(pool.clone())),
            orders: Arc::new(OrderQueryRepository::new(pool.clone())),
            transactions: Arc::new(OrderTransactionManager::new(
                pool,
                lock_timeout,
                statement_timeout,
            )),
            publisher,
        }
    }

    pub fn in_memory(db: Arc<MemoryDatabase>, publisher: DynEventPublisher) -> Self {
        Self {
            categories: db.clone(),
            products: db.clone(),
            stores: db.clone(),
            inventory: db.clone(),
            orders: db.clone(),
            transactions: db,
            publisher,
        }
    }
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Self {
        let DependenciesInjectDeps {
            categories,
            products,
            stores,
            inventory,
            orders,
            transactions,
            publisher,
        } = deps;

        let category_service = Arc::new(CategoryService::new(categories.clone(), registry));

        let product_service = Arc::new(ProductService::new(
            products.clone(),
            categories,
            registry,
        ));

        let store_service = Arc::new(StoreService::new(stores.clone(), registry));

        let inventory_service = Arc::new(InventoryService::new(
            InventoryServiceDeps {
                inventory,
                stores: stores.clone(),
                products: products.clone(),
            },
            registry,
        ));

        let order_command = Arc::new(OrderCommandService::new(
            OrderCommandServiceDeps {
                stores: stores.clone(),
                products,
                transactions,
                publisher,
            },
            registry,
        ));

        let order_query = Arc::new(OrderQueryService::new(
            OrderQueryServiceDeps { orders, stores },
            registry,
        ));

        Self {
            category_service,
            product_service,
            store_service,
            inventory_service,
            order_command,
            order_query,
        }
    }
}
