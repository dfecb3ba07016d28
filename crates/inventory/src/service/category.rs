use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::ApiResponse,
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, ServiceTracer},
};
use tracing::info;

use crate::{
    abstract_trait::category::{CategoryServiceTrait, DynCategoryRepository},
    domain::{
        requests::category::{CreateCategoryRequest, UpdateCategoryRequest},
        response::category::CategoryResponse,
    },
};

#[derive(Clone)]
pub struct CategoryService {
    repository: DynCategoryRepository,
    tracer: ServiceTracer,
}

impl CategoryService {
    pub fn new(repository: DynCategoryRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register("category_service", registry);

        Self {
            repository,
            tracer: ServiceTracer::new("category-service", metrics),
        }
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    async fn find_all(&self) -> Result<ApiResponse<Vec<CategoryResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start("find_all_categories", vec![]);

        match self.repository.find_all().await {
            Ok(categories) => {
                let data: Vec<CategoryResponse> =
                    categories.into_iter().map(CategoryResponse::from).collect();
                self.tracer.complete_success(
                    &tracing_ctx,
                    method,
                    &format!("Fetched {} categories", data.len()),
                );
                Ok(ApiResponse::success("Categories retrieved successfully", data))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch categories");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<CategoryResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_category_by_id",
            vec![KeyValue::new("category.id", id.to_string())],
        );

        match self.repository.find_by_id(id).await {
            Ok(Some(category)) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Category retrieved");
                Ok(ApiResponse::success(
                    "Category retrieved successfully",
                    CategoryResponse::from(category),
                ))
            }
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category not found");
                Err(ServiceError::NotFound(format!("Category {id} not found")))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch category");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn create(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<ApiResponse<CategoryResponse>, ServiceError> {
        let method = Method::Post;
        let name = req.name.trim();
        let tracing_ctx = self.tracer.start(
            "create_category",
            vec![KeyValue::new("category.name", name.to_string())],
        );

        info!("🏷️ Creating category {name}");

        match self.repository.create(name).await {
            Ok(category) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Category created");
                Ok(ApiResponse::success(
                    "Category created successfully",
                    CategoryResponse::from(category),
                ))
            }
            Err(RepositoryError::AlreadyExists(_)) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category name taken");
                Err(ServiceError::Conflict(format!(
                    "Category with name '{name}' already exists"
                )))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to create category");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn update(
        &self,
        id: i32,
        req: &UpdateCategoryRequest,
    ) -> Result<ApiResponse<CategoryResponse>, ServiceError> {
        let method = Method::Put;
        let name = req.name.trim();
        let tracing_ctx = self.tracer.start(
            "update_category",
            vec![
                KeyValue::new("category.id", id.to_string()),
                KeyValue::new("category.name", name.to_string()),
            ],
        );

        info!("🏷️ Renaming category {id} to {name}");

        match self.repository.update(id, name).await {
            Ok(Some(category)) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Category updated");
                Ok(ApiResponse::success(
                    "Category updated successfully",
                    CategoryResponse::from(category),
                ))
            }
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category not found");
                Err(ServiceError::NotFound(format!("Category {id} not found")))
            }
            Err(RepositoryError::AlreadyExists(_)) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category name taken");
                Err(ServiceError::Conflict(format!(
                    "Category with name '{name}' already exists"
                )))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to update category");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn delete(&self, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.tracer.start(
            "delete_category",
            vec![KeyValue::new("category.id", id.to_string())],
        );

        match self.repository.delete(id).await {
            Ok(true) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Category deleted");
                Ok(ApiResponse::success("Category deleted successfully", ()))
            }
            Ok(false) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category not found");
                Err(ServiceError::NotFound(format!("Category {id} not found")))
            }
            Err(RepositoryError::ForeignKey(_)) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category still referenced");
                Err(ServiceError::Conflict(format!(
                    "Category {id} is still referenced by products"
                )))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to delete category");
                Err(ServiceError::Repo(e))
            }
        }
    }
}
