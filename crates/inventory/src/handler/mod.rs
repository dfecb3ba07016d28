mod category;
mod inventory;
mod order;
mod product;
mod store;

use crate::{
    metrics::metrics_handler, middleware::allowed_hosts::allowed_hosts_middleware,
    state::AppState,
};
use anyhow::{Context, Result};
use axum::{
    Extension, Json, Router, ServiceExt,
    extract::{DefaultBodyLimit, Request},
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use shared::utils::shutdown_signal;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, normalize_path::NormalizePath, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub use self::category::category_routes;
pub use self::inventory::inventory_routes;
pub use self::order::order_routes;
pub use self::product::product_routes;
pub use self::store::store_routes;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,

        category::get_categories,
        category::get_category,
        category::create_category,
        category::update_category,
        category::delete_category,

        product::get_products,
        product::get_product,
        product::search_products,
        product::autocomplete_products,
        product::create_product,
        product::update_product,
        product::delete_product,

        store::get_stores,
        store::get_store,
        store::create_store,
        store::update_store,
        store::delete_store,

        inventory::get_inventory,
        inventory::get_inventory_row,
        inventory::create_inventory,
        inventory::update_inventory,
        inventory::delete_inventory,

        order::create_order,
        order::get_orders,
        order::get_order,
        order::get_order_stats,
    ),
    tags(
        (name = "Health", description = "Liveness check"),
        (name = "Category", description = "Category endpoints"),
        (name = "Product", description = "Product catalog, search and autocomplete"),
        (name = "Store", description = "Store endpoints"),
        (name = "Inventory", description = "Per-store stock levels"),
        (name = "Order", description = "Order placement and reporting"),
    )
)]
struct ApiDoc;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "inventory-api",
    }))
}

pub struct AppRouter;

impl AppRouter {
    /// Full application service. Trailing slashes are trimmed before routing,
    /// so `/api/orders/` and `/api/orders` reach the same handler.
    pub fn build(app_state: Arc<AppState>) -> NormalizePath<Router> {
        let api_router = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .route("/health", get(health_check))
            .route("/metrics", get(metrics_handler))
            .with_state(app_state.clone())
            .merge(category_routes(app_state.clone()))
            .merge(product_routes(app_state.clone()))
            .merge(store_routes(app_state.clone()))
            .merge(inventory_routes(app_state.clone()))
            .merge(order_routes(app_state.clone()));

        let router_with_layers = api_router
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

        let (app_router, api) = router_with_layers.split_for_parts();

        let app = app_router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
            .layer(middleware::from_fn(allowed_hosts_middleware))
            .layer(Extension(app_state.allowed_hosts.clone()))
            .layer(TraceLayer::new_for_http());

        NormalizePath::trim_trailing_slash(app)
    }

    pub async fn serve(port: u16, app_state: AppState) -> Result<()> {
        let app = Self::build(Arc::new(app_state));

        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        let local = listener.local_addr()?;
        info!("🚀 Server running on http://{local}");
        info!("📖 Swagger UI: http://localhost:{port}/swagger-ui");
        info!("📊 Metrics: http://localhost:{port}/metrics");

        axum::serve(
            listener,
            ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

        info!("🛑 Server stopped");
        Ok(())
    }
}
