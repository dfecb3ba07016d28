use axum::{
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use prometheus_client::{
    encoding::text::encode,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};
use std::sync::Arc;
use tracing::error;

use crate::state::AppState;

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let mut buffer = String::new();

    if let Err(e) = encode(&mut buffer, &state.registry) {
        error!("❌ Failed to encode metrics: {e}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {e}"),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        buffer,
    )
        .into_response()
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum OrderOutcome {
    Confirmed,
    Rejected,
    Failed,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabels {
    pub outcome: OrderOutcome,
}

/// Business outcome of every order placement attempt that reached the
/// transaction.
#[derive(Clone, Debug, Default)]
pub struct OrderOutcomeMetrics {
    orders: Family<OutcomeLabels, Counter>,
}

impl OrderOutcomeMetrics {
    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "order_outcomes",
            "Orders placed by outcome",
            self.orders.clone(),
        );
    }

    pub fn record(&self, outcome: OrderOutcome) {
        self.orders.get_or_create(&OutcomeLabels { outcome }).inc();
    }

    pub fn count(&self, outcome: OrderOutcome) -> u64 {
        self.orders.get_or_create(&OutcomeLabels { outcome }).get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_are_counted_and_encoded() {
        let mut registry = Registry::default();
        let outcomes = OrderOutcomeMetrics::default();
        outcomes.register(&mut registry);

        outcomes.record(OrderOutcome::Confirmed);
        outcomes.record(OrderOutcome::Confirmed);
        outcomes.record(OrderOutcome::Rejected);

        assert_eq!(outcomes.count(OrderOutcome::Confirmed), 2);
        assert_eq!(outcomes.count(OrderOutcome::Rejected), 1);
        assert_eq!(outcomes.count(OrderOutcome::Failed), 0);

        let mut text = String::new();
        encode(&mut text, &registry).unwrap();
        assert!(text.contains("order_outcomes_total{outcome=\"Confirmed\"} 2"));
    }
}
