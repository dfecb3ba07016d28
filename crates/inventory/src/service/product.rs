use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::ApiResponse,
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, ServiceTracer},
};
use tracing::info;
use validator::Validate;

use crate::{
    abstract_trait::{
        category::DynCategoryRepository,
        product::{DynProductRepository, ProductChanges, ProductServiceTrait},
    },
    domain::{
        requests::product::{
            CreateProductRequest, ProductSearchFilter, ProductSearchQuery, UpdateProductRequest,
            valid_price,
        },
        response::product::{ProductAutocompleteResponse, ProductResponse},
    },
    middleware::validate::field_messages,
};

pub const AUTOCOMPLETE_MIN_CHARS: usize = 3;
pub const AUTOCOMPLETE_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct ProductService {
    repository: DynProductRepository,
    categories: DynCategoryRepository,
    tracer: ServiceTracer,
}

impl ProductService {
    pub fn new(
        repository: DynProductRepository,
        categories: DynCategoryRepository,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register("product_service", registry);

        Self {
            repository,
            categories,
            tracer: ServiceTracer::new("product-service", metrics),
        }
    }
}

#[async_trait]
impl ProductServiceTrait for ProductService {
    async fn find_all(&self) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start("find_active_products", vec![]);

        let products = self.repository.find_active().await.inspect_err(|_| {
            self.tracer
                .complete_error(&tracing_ctx, method.clone(), "Failed to fetch products")
        })?;

        let data: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
        self.tracer.complete_success(
            &tracing_ctx,
            method,
            &format!("Fetched {} products", data.len()),
        );

        Ok(ApiResponse::success("Products retrieved successfully", data))
    }

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_product_by_id",
            vec![KeyValue::new("product.id", id.to_string())],
        );

        match self.repository.find_by_id(id).await {
            Ok(Some(product)) if product.is_active => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Product retrieved");
                Ok(ApiResponse::success(
                    "Product retrieved successfully",
                    ProductResponse::from(product),
                ))
            }
            Ok(_) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Product not found");
                Err(ServiceError::NotFound(format!("Product {id} not found")))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch product");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn search(
        &self,
        query: &ProductSearchQuery,
    ) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError> {
        let method = Method::Get;
        let filter = ProductSearchFilter::from(query);
        let tracing_ctx = self.tracer.start(
            "search_products",
            vec![KeyValue::new(
                "search.query",
                filter.query.clone().unwrap_or_default(),
            )],
        );

        let products = self.repository.search(&filter).await.inspect_err(|_| {
            self.tracer
                .complete_error(&tracing_ctx, method.clone(), "Product search failed")
        })?;

        let data: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
        self.tracer.complete_success(
            &tracing_ctx,
            method,
            &format!("Search matched {} products", data.len()),
        );

        Ok(ApiResponse::success(
            format!("Found {} products", data.len()),
            data,
        ))
    }

    async fn autocomplete(
        &self,
        query: &str,
    ) -> Result<ApiResponse<Vec<ProductAutocompleteResponse>>, ServiceError> {
        let method = Method::Get;
        let prefix = query.trim();

        if prefix.chars().count() < AUTOCOMPLETE_MIN_CHARS {
            return Err(ServiceError::Validation(vec![format!(
                "Query must be at least {AUTOCOMPLETE_MIN_CHARS} characters"
            )]));
        }

        let tracing_ctx = self.tracer.start(
            "autocomplete_products",
            vec![KeyValue::new("search.prefix", prefix.to_string())],
        );

        let products = self
            .repository
            .autocomplete(prefix, AUTOCOMPLETE_LIMIT)
            .await
            .inspect_err(|_| {
                self.tracer
                    .complete_error(&tracing_ctx, method.clone(), "Autocomplete failed")
            })?;

        let data: Vec<ProductAutocompleteResponse> = products
            .into_iter()
            .map(ProductAutocompleteResponse::from)
            .collect();
        self.tracer.complete_success(
            &tracing_ctx,
            method,
            &format!("Autocomplete returned {} suggestions", data.len()),
        );

        Ok(ApiResponse::success("Suggestions retrieved successfully", data))
    }

    async fn create(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let method = Method::Post;

        if let Err(errors) = req.validate() {
            return Err(ServiceError::Validation(field_messages(&errors)));
        }

        let tracing_ctx = self.tracer.start(
            "create_product",
            vec![
                KeyValue::new("product.title", req.title.clone()),
                KeyValue::new("product.category_id", req.category_id.to_string()),
            ],
        );

        match self.categories.find_by_id(req.category_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category not found");
                return Err(ServiceError::NotFound(format!(
                    "Category {} not found",
                    req.category_id
                )));
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch category");
                return Err(ServiceError::Repo(e));
            }
        }

        info!("📦 Creating product {}", req.title);

        match self.repository.create(req).await {
            Ok(product) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Product created");
                Ok(ApiResponse::success(
                    "Product created successfully",
                    ProductResponse::from(product),
                ))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to create product");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn update(
        &self,
        id: i32,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let method = Method::Put;

        if let Some(Err(err)) = req.price.as_ref().map(valid_price) {
            let message = err.message.unwrap_or_default();
            return Err(ServiceError::Validation(vec![format!("price: {message}")]));
        }

        let tracing_ctx = self.tracer.start(
            "update_product",
            vec![KeyValue::new("product.id", id.to_string())],
        );

        let changes = ProductChanges {
            price: req.price,
            description: req.description.clone(),
            is_active: req.is_active,
        };

        match self.repository.update(id, &changes).await {
            Ok(Some(product)) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Product updated");
                Ok(ApiResponse::success(
                    "Product updated successfully",
                    ProductResponse::from(product),
                ))
            }
            Ok(None) | Err(RepositoryError::NotFound) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Product not found");
                Err(ServiceError::NotFound(format!("Product {id} not found")))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to update product");
                Err(ServiceError::Repo(e))
            }
        }
    }

    async fn delete(&self, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.tracer.start(
            "delete_product",
            vec![KeyValue::new("product.id", id.to_string())],
        );

        info!("🗑️ Deleting product {id} and its inventory rows");

        match self.repository.delete(id).await {
            Ok(true) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Product deleted");
                Ok(ApiResponse::success("Product deleted successfully", ()))
            }
            Ok(false) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Product not found");
                Err(ServiceError::NotFound(format!("Product {id} not found")))
            }
            Err(RepositoryError::ForeignKey(_)) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Product has order history");
                Err(ServiceError::Conflict(format!(
                    "Product {id} is still referenced by order items"
                )))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to delete product");
                Err(ServiceError::Repo(e))
            }
        }
    }
}
