use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::ApiResponse,
    errors::ServiceError,
    utils::{Method, Metrics, ServiceTracer},
};

use crate::{
    abstract_trait::{
        order::{DynOrderQueryRepository, OrderQueryServiceTrait},
        store::DynStoreRepository,
    },
    domain::{
        requests::order::{OrderFilter, OrderListQuery},
        response::order::{OrderListResponse, OrderResponse, OrderStatsResponse},
    },
    model::order::OrderStatus,
};

pub struct OrderQueryServiceDeps {
    pub orders: DynOrderQueryRepository,
    pub stores: DynStoreRepository,
}

#[derive(Clone)]
pub struct OrderQueryService {
    orders: DynOrderQueryRepository,
    stores: DynStoreRepository,
    tracer: ServiceTracer,
}

impl OrderQueryService {
    pub fn new(deps: OrderQueryServiceDeps, registry: &mut Registry) -> Self {
        let OrderQueryServiceDeps { orders, stores } = deps;

        let metrics = Metrics::new();
        metrics.register("order_query_service", registry);

        Self {
            orders,
            stores,
            tracer: ServiceTracer::new("order-query-service", metrics),
        }
    }

    async fn load(&self, id: i32) -> Result<OrderResponse, ServiceError> {
        let Some(order) = self.orders.find_by_id(id).await? else {
            return Err(ServiceError::NotFound(format!("Order {id} not found")));
        };
        let store = self
            .stores
            .find_by_id(order.store_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", order.store_id)))?;
        let items = self.orders.find_items(order.order_id).await?;

        Ok(OrderResponse::from_parts(order, store, items))
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_order_by_id",
            vec![KeyValue::new("order.id", id.to_string())],
        );

        match self.load(id).await {
            Ok(order) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Order retrieved");
                Ok(ApiResponse::success("Order retrieved successfully", order))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, &e.to_string());
                Err(e)
            }
        }
    }

    async fn find_all(
        &self,
        query: &OrderListQuery,
    ) -> Result<ApiResponse<Vec<OrderListResponse>>, ServiceError> {
        let method = Method::Get;

        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<OrderStatus>()
                    .map_err(|e| ServiceError::Validation(vec![format!("status: {e}")]))?,
            ),
        };
        let filter = OrderFilter {
            store_id: query.store_id,
            status,
        };

        let tracing_ctx = self.tracer.start(
            "list_orders",
            vec![KeyValue::new("order.filter", format!("{filter:?}"))],
        );

        let rows = self.orders.find_all(&filter).await.inspect_err(|_| {
            self.tracer
                .complete_error(&tracing_ctx, method.clone(), "Failed to list orders")
        })?;

        let data: Vec<OrderListResponse> = rows.into_iter().map(OrderListResponse::from).collect();
        self.tracer.complete_success(
            &tracing_ctx,
            method,
            &format!("Listed {} orders", data.len()),
        );

        Ok(ApiResponse::success("Orders retrieved successfully", data))
    }

    async fn stats(
        &self,
        store_id: Option<i32>,
    ) -> Result<ApiResponse<OrderStatsResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "order_stats",
            vec![KeyValue::new("order.store_id", format!("{store_id:?}"))],
        );

        match self.orders.stats(store_id).await {
            Ok(stats) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Order stats computed");
                Ok(ApiResponse::success(
                    "Order statistics retrieved successfully",
                    OrderStatsResponse::from(stats),
                ))
            }
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to compute order stats");
                Err(ServiceError::Repo(e))
            }
        }
    }
}
