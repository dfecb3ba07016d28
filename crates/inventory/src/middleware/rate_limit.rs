use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use shared::{
    abstract_trait::DynRateLimiter,
    cache::RateLimitDecision,
    errors::{HttpError, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET},
};
use std::net::SocketAddr;
use tracing::warn;

/// Limiter plus the name its keys are counted under, so routes that share a
/// scope share one budget per client.
#[derive(Clone)]
pub struct RateLimitScope {
    pub limiter: DynRateLimiter,
    pub name: &'static str,
}

impl RateLimitScope {
    pub fn new(limiter: DynRateLimiter, name: &'static str) -> Self {
        Self { limiter, name }
    }

    pub fn key(&self, client_ip: &str) -> String {
        format!("rate_limit:{}:{client_ip}", self.name)
    }
}

/// Limits per client address under `rate_limit:{scope}:{ip}`.
pub async fn rate_limit_middleware(
    State(scope): State<RateLimitScope>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let client_ip = client_ip(&req);
    let key = scope.key(&client_ip);
    let limiter = &scope.limiter;

    match limiter.allow(&key).await {
        RateLimitDecision::Allowed {
            limit,
            remaining,
            reset_seconds,
        } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
            headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
            headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_seconds));
            Ok(response)
        }
        RateLimitDecision::Blocked {
            limit,
            reset_seconds,
        } => {
            warn!(
                "⛔ Rate limit exceeded for {client_ip} on {}, retry in {reset_seconds}s",
                scope.name
            );
            Err(HttpError::TooManyRequests {
                limit,
                window_seconds: limiter.policy().window_seconds(),
                retry_after: reset_seconds,
            })
        }
        RateLimitDecision::Bypassed => Ok(next.run(req).await),
    }
}

/// First `X-Forwarded-For` entry, else the socket peer, else `unknown`.
pub fn client_ip(req: &Request) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use shared::cache::{InMemoryRateLimiter, RateLimitPolicy};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn key_uses_the_scope_name() {
        let scope = RateLimitScope::new(
            Arc::new(InMemoryRateLimiter::new(RateLimitPolicy::default())),
            "autocomplete",
        );
        assert_eq!(scope.key("203.0.113.7"), "rate_limit:autocomplete:203.0.113.7");
    }

    #[tokio::test]
    async fn routes_in_one_scope_share_the_budget_whatever_their_path() {
        let scope = RateLimitScope::new(
            Arc::new(InMemoryRateLimiter::new(RateLimitPolicy::new(1, 60))),
            "autocomplete",
        );
        let app = Router::new()
            .route("/api/products/autocomplete", get(|| async { "ok" }))
            .route("/api/v2/suggest/{term}", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(scope, rate_limit_middleware));

        let request = |uri: &str| {
            Request::builder()
                .uri(uri)
                .header("x-forwarded-for", "198.51.100.1")
                .body(Body::empty())
                .unwrap()
        };

        let first = app
            .clone()
            .oneshot(request("/api/products/autocomplete"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request("/api/v2/suggest/ham")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn forwarded_for_takes_the_first_hop() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn peer_address_is_the_fallback() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 5555))));
        assert_eq!(client_ip(&req), "192.0.2.4");
    }

    #[test]
    fn unknown_without_any_source() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&req), "unknown");
    }
}
