use crate::{
    abstract_trait::order::{DynOrderCommandService, DynOrderQueryService},
    domain::{
        requests::order::{CreateOrderRequest, OrderListQuery, OrderStatsQuery},
        response::order::{OrderListResponse, OrderResponse, OrderStatsResponse},
    },
    model::order::OrderStatus,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use shared::{domain::ApiResponse, errors::HttpError};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order confirmed and stock deducted", body = ApiResponse<OrderResponse>),
        (status = 200, description = "Order rejected for insufficient stock", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Store or products not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_order(
    Extension(service): Extension<DynOrderCommandService>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body.map_err(|rejection| HttpError::BadRequest(rejection.body_text()))?;

    let response = service.place_order(&body).await?;

    let status = match response.data.status {
        OrderStatus::Confirmed => StatusCode::CREATED,
        _ => StatusCode::OK,
    };

    Ok((status, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Order",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders, newest first", body = ApiResponse<Vec<OrderListResponse>>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn get_orders(
    Extension(service): Extension<DynOrderQueryService>,
    Query(params): Query<OrderListQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all(&params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Order",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    Extension(service): Extension<DynOrderQueryService>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders/stats",
    tag = "Order",
    params(OrderStatsQuery),
    responses(
        (status = 200, description = "Order statistics", body = ApiResponse<OrderStatsResponse>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_order_stats(
    Extension(service): Extension<DynOrderQueryService>,
    Query(params): Query<OrderStatsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.stats(params.store_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/orders", get(get_orders).post(create_order))
        .route("/api/orders/stats", get(get_order_stats))
        .route("/api/orders/{id}", get(get_order))
        .layer(Extension(app_state.di_container.order_command.clone()))
        .layer(Extension(app_state.di_container.order_query.clone()))
}
