use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::ApiResponse,
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, ServiceTracer},
};
use tracing::{info, warn};

use crate::{
    abstract_trait::{
        inventory::{DynInventoryRepository, InventoryServiceTrait},
        product::DynProductRepository,
        store::DynStoreRepository,
    },
    domain::{
        requests::inventory::{CreateInventoryRequest, InventoryFilter, UpdateInventoryRequest},
        response::inventory::InventoryResponse,
    },
};

pub struct InventoryServiceDeps {
    pub inventory: DynInventoryRepository,
    pub stores: DynStoreRepository,
    pub products: DynProductRepository,
}

#[derive(Clone)]
pub struct InventoryService {
    inventory: DynInventoryRepository,
    stores: DynStoreRepository,
    products: DynProductRepository,
    tracer: ServiceTracer,
}

impl InventoryService {
    pub fn new(deps: InventoryServiceDeps, registry: &mut Registry) -> Self {
        let InventoryServiceDeps {
            inventory,
            stores,
            products,
        } = deps;

        let metrics = Metrics::new();
        metrics.register("inventory_service", registry);

        Self {
            inventory,
            stores,
            products,
            tracer: ServiceTracer::new("inventory-service", metrics),
        }
    }
}

#[async_trait]
impl InventoryServiceTrait for InventoryService {
    async fn find_all(
        &self,
        filter: &InventoryFilter,
    ) -> Result<ApiResponse<Vec<InventoryResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "list_inventory",
            vec![
                KeyValue::new("inventory.store_id", format!("{:?}", filter.store_id)),
                KeyValue::new("inventory.low_stock", filter.low_stock.unwrap_or(false)),
            ],
        );

        let rows = self.inventory.find_all(filter).await.inspect_err(|_| {
            self.tracer
                .complete_error(&tracing_ctx, method.clone(), "Failed to list inventory")
        })?;

        let data: Vec<InventoryResponse> = rows.into_iter().map(InventoryResponse::from).collect();
        self.tracer.complete_success(
            &tracing_ctx,
            method,
            &format!("Listed {} inventory rows", data.len()),
        );

        Ok(ApiResponse::success("Inventory retrieved successfully", data))
    }

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<InventoryResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_inventory_by_id",
            vec![KeyValue::new("inventory.id", id.to_string())],
        );

        match self.inventory.find_by_id(id).await {
            Ok(Some(row)) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Inventory retrieved");
                Ok(ApiResponse::success(
                    "Inventory retrieved successfully",
                    InventoryResponse::from(row),
                ))
            }
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Inventory not found");
                Err(ServiceError::NotFound(format!("Inventory {id} not found")))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch inventory");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn create(
        &self,
        req: &CreateInventoryRequest,
    ) -> Result<ApiResponse<InventoryResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracer.start(
            "create_inventory",
            vec![
                KeyValue::new("inventory.store_id", req.store_id.to_string()),
                KeyValue::new("inventory.product_id", req.product_id.to_string()),
            ],
        );

        if req.quantity < 0 {
            self.tracer
                .complete_error(&tracing_ctx, method, "Negative quantity");
            return Err(ServiceError::Validation(vec![
                "quantity: quantity must not be negative".into(),
            ]));
        }

        let store = self.stores.find_by_id(req.store_id).await?;
        let product = self.products.find_by_id(req.product_id).await?;

        if store.is_none() || product.is_none() {
            let what = if store.is_none() {
                format!("Store {} not found", req.store_id)
            } else {
                format!("Product {} not found", req.product_id)
            };
            self.tracer.complete_error(&tracing_ctx, method, &what);
            return Err(ServiceError::NotFound(what));
        }

        match self.inventory.create(req).await {
            Ok(row) => {
                info!(
                    "📦 Stocked product {} in store {} with {} units",
                    req.product_id, req.store_id, req.quantity
                );
                self.tracer
                    .complete_success(&tracing_ctx, method, "Inventory created");
                Ok(ApiResponse::success(
                    "Inventory created successfully",
                    InventoryResponse::from(row),
                ))
            }
            Err(RepositoryError::AlreadyExists(_)) => {
                warn!(
                    "⚠️ Inventory for store {} product {} already exists",
                    req.store_id, req.product_id
                );
                self.tracer
                    .complete_error(&tracing_ctx, method, "Duplicate inventory row");
                Err(ServiceError::Conflict(format!(
                    "Inventory for store {} and product {} already exists",
                    req.store_id, req.product_id
                )))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to create inventory");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn update(
        &self,
        id: i32,
        req: &UpdateInventoryRequest,
    ) -> Result<ApiResponse<InventoryResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracer.start(
            "update_inventory",
            vec![KeyValue::new("inventory.id", id.to_string())],
        );

        if req.quantity.is_some_and(|q| q < 0) {
            self.tracer
                .complete_error(&tracing_ctx, method, "Negative quantity");
            return Err(ServiceError::Validation(vec![
                "quantity: quantity must not be negative".into(),
            ]));
        }

        match self.inventory.update(id, req).await {
            Ok(Some(row)) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Inventory updated");
                Ok(ApiResponse::success(
                    "Inventory updated successfully",
                    InventoryResponse::from(row),
                ))
            }
            Ok(None) | Err(RepositoryError::NotFound) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Inventory not found");
                Err(ServiceError::NotFound(format!("Inventory {id} not found")))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to update inventory");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn delete(&self, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.tracer.start(
            "delete_inventory",
            vec![KeyValue::new("inventory.id", id.to_string())],
        );

        match self.inventory.delete(id).await {
            Ok(true) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Inventory deleted");
                Ok(ApiResponse::success("Inventory deleted successfully", ()))
            }
            Ok(false) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Inventory not found");
                Err(ServiceError::NotFound(format!("Inventory {id} not found")))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to delete inventory");
                Err(ServiceError::Repo(e))
            }
        }
    }
}
