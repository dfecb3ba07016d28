use axum::{
    Extension,
    extract::Request,
    http::header::HOST,
    middleware::Next,
    response::Response,
};
use shared::{config::AllowedHosts, errors::HttpError};
use tracing::warn;

pub async fn allowed_hosts_middleware(
    Extension(hosts): Extension<AllowedHosts>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let host = req
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| req.uri().host())
        .unwrap_or_default()
        .to_string();

    if !hosts.is_allowed(&host) {
        warn!("🚫 Rejected request for disallowed host {host:?}");
        return Err(HttpError::BadRequest(format!(
            "Invalid HTTP_HOST header: '{host}'"
        )));
    }

    Ok(next.run(req).await)
}
