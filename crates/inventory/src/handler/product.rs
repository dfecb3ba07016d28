use crate::{
    abstract_trait::product::DynProductService,
    domain::{
        requests::product::{
            AutocompleteQuery, CreateProductRequest, ProductSearchQuery, UpdateProductRequest,
        },
        response::product::{ProductAutocompleteResponse, ProductResponse},
    },
    middleware::{
        rate_limit::{RateLimitScope, rate_limit_middleware},
        validate::SimpleValidatedJson,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use shared::{domain::ApiResponse, errors::HttpError};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

const AUTOCOMPLETE_SCOPE: &str = "autocomplete";

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Product",
    responses(
        (status = 200, description = "List of active products", body = ApiResponse<Vec<ProductResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_products(
    Extension(service): Extension<DynProductService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Product",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    Extension(service): Extension<DynProductService>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/products/search",
    tag = "Product",
    params(ProductSearchQuery),
    responses(
        (status = 200, description = "Matching products", body = ApiResponse<Vec<ProductResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn search_products(
    Extension(service): Extension<DynProductService>,
    Query(params): Query<ProductSearchQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.search(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/products/autocomplete",
    tag = "Product",
    params(AutocompleteQuery),
    responses(
        (status = 200, description = "Title prefix matches", body = ApiResponse<Vec<ProductAutocompleteResponse>>),
        (status = 400, description = "Query shorter than 3 characters"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn autocomplete_products(
    Extension(service): Extension<DynProductService>,
    Query(params): Query<AutocompleteQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .autocomplete(params.q.as_deref().unwrap_or_default())
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Product",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn create_product(
    Extension(service): Extension<DynProductService>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Product",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    Extension(service): Extension<DynProductService>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update(id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Product",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = serde_json::Value),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product appears in orders")
    )
)]
pub async fn delete_product(
    Extension(service): Extension<DynProductService>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.delete(id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": response.status,
            "message": response.message,
        })),
    ))
}

pub fn product_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let service = app_state.di_container.product_service.clone();

    let limited = OpenApiRouter::new()
        .route("/api/products/autocomplete", get(autocomplete_products))
        .route_layer(middleware::from_fn_with_state(
            RateLimitScope::new(app_state.rate_limiter.clone(), AUTOCOMPLETE_SCOPE),
            rate_limit_middleware,
        ));

    OpenApiRouter::new()
        .route("/api/products", get(get_products).post(create_product))
        .route("/api/products/search", get(search_products))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .merge(limited)
        .layer(Extension(service))
}
