use crate::{
    abstract_trait::store::DynStoreService,
    domain::{
        requests::store::{CreateStoreRequest, UpdateStoreRequest},
        response::store::StoreResponse,
    },
    middleware::validate::SimpleValidatedJson,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use shared::{domain::ApiResponse, errors::HttpError};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/stores",
    tag = "Store",
    responses(
        (status = 200, description = "List of active stores", body = ApiResponse<Vec<StoreResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_stores(
    Extension(service): Extension<DynStoreService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    tag = "Store",
    params(("id" = i32, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store details", body = ApiResponse<StoreResponse>),
        (status = 404, description = "Store not found")
    )
)]
pub async fn get_store(
    Extension(service): Extension<DynStoreService>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/stores",
    tag = "Store",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = ApiResponse<StoreResponse>),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_store(
    Extension(service): Extension<DynStoreService>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateStoreRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/stores/{id}",
    tag = "Store",
    params(("id" = i32, Path, description = "Store ID")),
    request_body = UpdateStoreRequest,
    responses(
        (status = 200, description = "Store updated", body = ApiResponse<StoreResponse>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Store not found")
    )
)]
pub async fn update_store(
    Extension(service): Extension<DynStoreService>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateStoreRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update(id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/stores/{id}",
    tag = "Store",
    params(("id" = i32, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store deleted", body = serde_json::Value),
        (status = 404, description = "Store not found"),
        (status = 409, description = "Store has orders")
    )
)]
pub async fn delete_store(
    Extension(service): Extension<DynStoreService>,
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

pub fn store_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/stores", get(get_stores).post(create_store))
        .route(
            "/api/stores/{id}",
            get(get_store).put(update_store).delete(delete_store),
        )
        .layer(Extension(app_state.di_container.store_service.clone()))
}
