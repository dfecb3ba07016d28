use crate::{
    abstract_trait::inventory::DynInventoryService,
    domain::{
        requests::inventory::{CreateInventoryRequest, InventoryFilter, UpdateInventoryRequest},
        response::inventory::InventoryResponse,
    },
    middleware::validate::SimpleValidatedJson,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query},
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
    path = "/api/inventory",
    tag = "Inventory",
    params(InventoryFilter),
    responses(
        (status = 200, description = "Inventory rows", body = ApiResponse<Vec<InventoryResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_inventory(
    Extension(service): Extension<DynInventoryService>,
    Query(filter): Query<InventoryFilter>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all(&filter).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = i32, Path, description = "Inventory ID")),
    responses(
        (status = 200, description = "Inventory row", body = ApiResponse<InventoryResponse>),
        (status = 404, description = "Inventory row not found")
    )
)]
pub async fn get_inventory_row(
    Extension(service): Extension<DynInventoryService>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "Inventory",
    request_body = CreateInventoryRequest,
    responses(
        (status = 201, description = "Inventory row created", body = ApiResponse<InventoryResponse>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Store or product not found"),
        (status = 409, description = "Store already stocks this product")
    )
)]
pub async fn create_inventory(
    Extension(service): Extension<DynInventoryService>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateInventoryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = i32, Path, description = "Inventory ID")),
    request_body = UpdateInventoryRequest,
    responses(
        (status = 200, description = "Inventory row updated", body = ApiResponse<InventoryResponse>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Inventory row not found")
    )
)]
pub async fn update_inventory(
    Extension(service): Extension<DynInventoryService>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateInventoryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update(id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    params(("id" = i32, Path, description = "Inventory ID")),
    responses(
        (status = 200, description = "Inventory row deleted", body = serde_json::Value),
        (status = 404, description = "Inventory row not found")
    )
)]
pub async fn delete_inventory(
    Extension(service): Extension<DynInventoryService>,
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

pub fn inventory_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/inventory", get(get_inventory).post(create_inventory))
        .route(
            "/api/inventory/{id}",
            get(get_inventory_row)
                .put(update_inventory)
                .delete(delete_inventory),
        )
        .layer(Extension(app_state.di_container.inventory_service.clone()))
}
