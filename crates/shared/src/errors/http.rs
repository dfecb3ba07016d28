use crate::errors::{error::ErrorResponse, repository::RepositoryError, service::ServiceError};
use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use tracing::error;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Validation(Vec<String>),
    NotFound(String),
    Conflict(String),
    TooManyRequests {
        limit: u32,
        window_seconds: u64,
        retry_after: u64,
    },
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => HttpError::Validation(errors),

            ServiceError::NotFound(msg) => HttpError::NotFound(msg),

            ServiceError::Conflict(msg) => HttpError::Conflict(msg),

            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => HttpError::NotFound("Not found".into()),
                RepositoryError::Conflict(msg) => HttpError::Conflict(msg),
                RepositoryError::AlreadyExists(msg) => HttpError::Conflict(msg),
                RepositoryError::ForeignKey(msg) => {
                    HttpError::BadRequest(format!("Foreign key violation: {msg}"))
                }
                other => HttpError::Internal(other.to_string()),
            },

            ServiceError::Kafka(msg) => HttpError::Internal(format!("Kafka error: {msg}")),

            ServiceError::Internal(msg) => HttpError::Internal(msg),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Bad Request", msg)),
            )
                .into_response(),

            HttpError::Validation(fields) => {
                let body = ErrorResponse {
                    error: "Validation Error".into(),
                    detail: fields.join("; "),
                    fields,
                    retry_after: None,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }

            HttpError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Not Found", msg)),
            )
                .into_response(),

            HttpError::Conflict(msg) => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::new("Conflict", msg)),
            )
                .into_response(),

            HttpError::TooManyRequests {
                limit,
                window_seconds,
                retry_after,
            } => {
                let body = ErrorResponse {
                    error: "Rate limit exceeded".into(),
                    detail: format!(
                        "Maximum {limit} requests per {window_seconds} seconds allowed."
                    ),
                    fields: Vec::new(),
                    retry_after: Some(retry_after),
                };

                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                let headers = response.headers_mut();
                headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
                headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(0u32));
                headers.insert(X_RATELIMIT_RESET, HeaderValue::from(retry_after));
                headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }

            HttpError::Internal(msg) => {
                error!("❌ Internal server error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(
                        "Server Error",
                        "An unexpected error occurred",
                    )),
                )
                    .into_response()
            }
        }
    }
}
