use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::ApiResponse,
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, ServiceTracer},
};

use crate::{
    abstract_trait::store::{DynStoreRepository, StoreServiceTrait},
    domain::{
        requests::store::{CreateStoreRequest, UpdateStoreRequest},
        response::store::StoreResponse,
    },
};

#[derive(Clone)]
pub struct StoreService {
    repository: DynStoreRepository,
    tracer: ServiceTracer,
}

impl StoreService {
    pub fn new(repository: DynStoreRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register("store_service", registry);

        Self {
            repository,
            tracer: ServiceTracer::new("store-service", metrics),
        }
    }
}

#[async_trait]
impl StoreServiceTrait for StoreService {
    async fn find_all(&self) -> Result<ApiResponse<Vec<StoreResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start("find_active_stores", vec![]);

        let stores = self.repository.find_active().await.inspect_err(|_| {
            self.tracer
                .complete_error(&tracing_ctx, method.clone(), "Failed to fetch stores")
        })?;

        let data: Vec<StoreResponse> = stores.into_iter().map(StoreResponse::from).collect();
        self.tracer.complete_success(
            &tracing_ctx,
            method,
            &format!("Fetched {} stores", data.len()),
        );

        Ok(ApiResponse::success("Stores retrieved successfully", data))
    }

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<StoreResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_store_by_id",
            vec![KeyValue::new("store.id", id.to_string())],
        );

        match self.repository.find_by_id(id).await {
            Ok(Some(store)) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Store retrieved");
                Ok(ApiResponse::success(
                    "Store retrieved successfully",
                    StoreResponse::from(store),
                ))
            }
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Store not found");
                Err(ServiceError::NotFound(format!("Store {id} not found")))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch store");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn create(
        &self,
        req: &CreateStoreRequest,
    ) -> Result<ApiResponse<StoreResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracer.start(
            "create_store",
            vec![KeyValue::new("store.name", req.name.clone())],
        );

        match self.repository.create(req).await {
            Ok(store) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Store created");
                Ok(ApiResponse::success(
                    "Store created successfully",
                    StoreResponse::from(store),
                ))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to create store");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn update(
        &self,
        id: i32,
        req: &UpdateStoreRequest,
    ) -> Result<ApiResponse<StoreResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracer.start(
            "update_store",
            vec![KeyValue::new("store.id", id.to_string())],
        );

        match self.repository.update(id, req).await {
            Ok(Some(store)) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Store updated");
                Ok(ApiResponse::success(
                    "Store updated successfully",
                    StoreResponse::from(store),
                ))
            }
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Store not found");
                Err(ServiceError::NotFound(format!("Store {id} not found")))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to update store");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn delete(&self, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.tracer.start(
            "delete_store",
            vec![KeyValue::new("store.id", id.to_string())],
        );

        match self.repository.delete(id).await {
            Ok(true) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Store deleted");
                Ok(ApiResponse::success("Store deleted successfully", ()))
            }
            Ok(false) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Store not found");
                Err(ServiceError::NotFound(format!("Store {id} not found")))
            }
            Err(RepositoryError::ForeignKey(_)) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Store still referenced");
                Err(ServiceError::Conflict(format!(
                    "Store {id} is still referenced by orders"
                )))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to delete store");
                Err(ServiceError::Repo(e))
            }
        }
    }
}
