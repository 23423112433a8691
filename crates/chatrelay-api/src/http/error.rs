//! HTTP error mapping.
//!
//! Domain failures stay as [`GatewayError`] values until they cross this
//! boundary; only here do they pick a status code and a wire body. Every
//! error response carries a single-field JSON body: `{"detail": "..."}`.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chatrelay_types::error::GatewayError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// Request failed validation before any upstream work was done.
    Validation(String),
    /// Shared-secret or loopback gate rejected the caller.
    Forbidden(String),
    /// Caller exceeded the per-key request budget.
    RateLimited { retry_after_secs: u64 },
    /// Failure raised by the dispatch or upstream layers.
    Gateway(GatewayError),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        Self::Gateway(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Gateway(GatewayError::Config(_)) => StatusCode::BAD_REQUEST,
            Self::Gateway(GatewayError::UpstreamStatus { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Gateway(GatewayError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Forbidden(msg) => msg.clone(),
            Self::RateLimited { .. } => "rate limit exceeded, slow down".to_string(),
            Self::Gateway(GatewayError::UpstreamStatus { body, .. }) => body.clone(),
            Self::Gateway(err) => err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = ?self, "request failed");
        } else {
            tracing::debug!(%status, error = ?self, "request rejected");
        }
        let mut response = (status, Json(json!({ "detail": self.detail() }))).into_response();
        if let Self::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_maps_to_bad_request() {
        let err = AppError::from(GatewayError::Config("missing credentials".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "missing credentials");
    }

    #[test]
    fn test_upstream_status_is_forwarded() {
        let err = AppError::from(GatewayError::UpstreamStatus {
            status: 503,
            body: "overloaded".into(),
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.detail(), "overloaded");
    }

    #[test]
    fn test_unmappable_upstream_status_falls_back_to_bad_gateway() {
        let err = AppError::from(GatewayError::UpstreamStatus {
            status: 42,
            body: "odd".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited {
            retry_after_secs: 17,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            &HeaderValue::from_static("17")
        );
    }
}
