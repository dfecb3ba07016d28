use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    abstract_trait::DynEventPublisher,
    domain::{ApiResponse, ORDER_CONFIRMED_TOPIC, OrderEvent},
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, ServiceTracer},
};
use std::collections::{BTreeSet, HashMap};
use tracing::{error, info, warn};

use super::fulfillment::{self, OrderLine};
use crate::{
    abstract_trait::{
        order::{DynOrderTransactionManager, OrderCommandServiceTrait, OrderTransactionTrait},
        product::DynProductRepository,
        store::DynStoreRepository,
    },
    domain::{requests::order::CreateOrderRequest, response::order::OrderResponse},
    metrics::{OrderOutcome, OrderOutcomeMetrics},
    model::{
        order::{Order, OrderStatus},
        order_item::{OrderItem, OrderItemDetail},
        product::Product,
        store::Store,
    },
};

pub struct OrderCommandServiceDeps {
    pub stores: DynStoreRepository,
    pub products: DynProductRepository,
    pub transactions: DynOrderTransactionManager,
    pub publisher: DynEventPublisher,
}

#[derive(Clone)]
pub struct OrderCommandService {
    stores: DynStoreRepository,
    products: DynProductRepository,
    transactions: DynOrderTransactionManager,
    publisher: DynEventPublisher,
    outcomes: OrderOutcomeMetrics,
    tracer: ServiceTracer,
}

struct PlacedOrder {
    order: Order,
    items: Vec<OrderItem>,
}

impl OrderCommandService {
    pub fn new(deps: OrderCommandServiceDeps, registry: &mut Registry) -> Self {
        let OrderCommandServiceDeps {
            stores,
            products,
            transactions,
            publisher,
        } = deps;

        let metrics = Metrics::new();
        metrics.register("order_command_service", registry);

        let outcomes = OrderOutcomeMetrics::default();
        outcomes.register(registry);

        Self {
            stores,
            products,
            transactions,
            publisher,
            outcomes,
            tracer: ServiceTracer::new("order-command-service", metrics),
        }
    }

    async fn active_store(&self, store_id: i32) -> Result<Store, ServiceError> {
        match self.stores.find_by_id(store_id).await? {
            Some(store) if store.is_active => Ok(store),
            _ => Err(ServiceError::NotFound(format!("Store {store_id} not found"))),
        }
    }

    /// Active products for every requested id, keyed by id.
    async fn active_products(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<HashMap<i32, Product>, ServiceError> {
        let ids: Vec<i32> = req.items.iter().map(|item| item.product_id).collect();

        let products: HashMap<i32, Product> = self
            .products
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .map(|p| (p.product_id, p))
            .collect();

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !products.contains_key(id))
            .map(|id| id.to_string())
            .collect();

        if missing.is_empty() {
            Ok(products)
        } else {
            Err(ServiceError::NotFound(format!(
                "Products not found: {}",
                missing.join(", ")
            )))
        }
    }

    /// Runs the whole placement inside one transaction. Any error rolls back
    /// everything written so far, including the pending order row.
    async fn fulfil(
        &self,
        store_id: i32,
        lines: &[OrderLine<'_>],
        total: Decimal,
    ) -> Result<PlacedOrder, RepositoryError> {
        let mut tx = self.transactions.begin().await?;

        match Self::fulfil_within(tx.as_mut(), store_id, lines, total).await {
            Ok(placed) => {
                tx.commit().await?;
                Ok(placed)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!("❌ Failed to roll back order transaction: {rollback_err:?}");
                }
                Err(e)
            }
        }
    }

    async fn fulfil_within(
        tx: &mut dyn OrderTransactionTrait,
        store_id: i32,
        lines: &[OrderLine<'_>],
        total: Decimal,
    ) -> Result<PlacedOrder, RepositoryError> {
        let pending = tx.create_pending_order(store_id).await?;

        let product_ids: BTreeSet<i32> = lines.iter().map(|l| l.product.product_id).collect();
        let locked = tx.lock_for_update(store_id, &product_ids).await?;

        // Pass 1 decides for every line; pass 2 applies all of it or none.
        let outcomes = fulfillment::evaluate(lines, &locked);

        if let Some(reason) = fulfillment::rejection_reason(&outcomes) {
            let order = tx.reject_order(pending.order_id, &reason).await?;
            return Ok(PlacedOrder {
                order,
                items: Vec::new(),
            });
        }

        let new_items = fulfillment::accepted_items(&outcomes);
        for item in &new_items {
            tx.decrement_stock(store_id, item.product_id, item.quantity)
                .await?;
        }

        let items = tx.insert_order_items(pending.order_id, &new_items).await?;
        // A covered order holds every requested line, so `total` applies as is.
        let order = tx.confirm_order(pending.order_id, total).await?;

        Ok(PlacedOrder { order, items })
    }

    /// Hand-off after commit. Failure here never touches the stored order.
    async fn publish_confirmation(&self, order: &Order, item_count: usize) {
        let event = OrderEvent::Confirmed {
            order_id: order.order_id,
            store_id: order.store_id,
            total_amount: order.total_amount,
            item_count,
        };

        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                error!("❌ Failed to serialize order event {}: {e}", order.order_id);
                return;
            }
        };

        let key = order.order_id.to_string();
        match self
            .publisher
            .publish(ORDER_CONFIRMED_TOPIC, &key, &payload)
            .await
        {
            Ok(()) => info!("📨 Queued confirmation for order {}", order.order_id),
            Err(e) => warn!(
                "⚠️ Order {} confirmed but notification was not queued: {e}",
                order.order_id
            ),
        }
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn place_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracer.start(
            "place_order",
            vec![
                KeyValue::new("order.store_id", req.store_id.to_string()),
                KeyValue::new("order.lines", req.items.len() as i64),
            ],
        );

        if let Err(errors) = req.validate_lines() {
            self.tracer
                .complete_error(&tracing_ctx, method, "Order request is invalid");
            return Err(ServiceError::Validation(errors));
        }

        let store = match self.active_store(req.store_id).await {
            Ok(store) => store,
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Store lookup failed");
                return Err(e);
            }
        };

        let products = match self.active_products(req).await {
            Ok(products) => products,
            Err(e) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Product lookup failed");
                return Err(e);
            }
        };

        let lines: Vec<OrderLine<'_>> = req
            .items
            .iter()
            .filter_map(|item| {
                products.get(&item.product_id).map(|product| OrderLine {
                    product,
                    quantity: item.quantity,
                })
            })
            .collect();

        let Some(total) = fulfillment::order_total(&fulfillment::requested_items(&lines)) else {
            self.tracer
                .complete_error(&tracing_ctx, method, "Order total out of range");
            return Err(ServiceError::Validation(vec![format!(
                "Order total exceeds the maximum of {}",
                fulfillment::MAX_ORDER_TOTAL
            )]));
        };

        let placed = match self.fulfil(store.store_id, &lines, total).await {
            Ok(placed) => placed,
            Err(e) => {
                error!("❌ Order transaction for store {} aborted: {e:?}", store.store_id);
                self.outcomes.record(OrderOutcome::Failed);
                self.tracer
                    .complete_error(&tracing_ctx, method, "Order transaction aborted");
                return Err(ServiceError::Internal(format!(
                    "Order could not be processed: {e}"
                )));
            }
        };

        let message = match placed.order.status {
            OrderStatus::Confirmed => {
                self.outcomes.record(OrderOutcome::Confirmed);
                info!(
                    "✅ Order {} confirmed for {}",
                    placed.order.order_id, placed.order.total_amount
                );
                self.publish_confirmation(&placed.order, placed.items.len())
                    .await;
                "Order confirmed"
            }
            _ => {
                self.outcomes.record(OrderOutcome::Rejected);
                info!(
                    "🚫 Order {} rejected: {}",
                    placed.order.order_id,
                    placed.order.rejection_reason.as_deref().unwrap_or_default()
                );
                "Order rejected: insufficient stock"
            }
        };

        self.tracer.complete_success(&tracing_ctx, method, message);

        let items = placed
            .items
            .into_iter()
            .map(|item| OrderItemDetail {
                product_title: products
                    .get(&item.product_id)
                    .map(|p| p.title.clone())
                    .unwrap_or_default(),
                item,
            })
            .collect();

        Ok(ApiResponse::success(
            message,
            OrderResponse::from_parts(placed.order, store, items),
        ))
    }
}
