use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// Non-2xx from the completion API, surfaced with its own status and body.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Timeout(String),

    #[error("Method {0} is not allowed on this route")]
    MethodNotAllowed(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn with_request_id(self, request_id: Uuid) -> ApiError {
        ApiError {
            error: self,
            request_id: Some(request_id),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Api { status, message } => AppError::Upstream { status, message },
            e @ LlmError::Timeout { .. } => AppError::Timeout(e.to_string()),
            e @ (LlmError::Http(_) | LlmError::Parse(_)) => AppError::BadGateway(e.to_string()),
        }
    }
}

/// An `AppError` tagged with the request id it occurred under.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub request_id: Option<Uuid>,
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let message = self.error.to_string();

        match &self.error {
            AppError::Validation(_) | AppError::MethodNotAllowed(_) => {
                tracing::debug!("Rejected request: {message}")
            }
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => tracing::error!("Request failed with {status}: {message}"),
        }

        let body = match self.request_id {
            Some(id) => json!({ "error": message, "request_id": id }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_surfaced_as_is() {
        let err = AppError::from(LlmError::Api {
            status: 401,
            message: "bad key".into(),
        });
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "bad key");
    }

    #[test]
    fn test_non_error_upstream_status_becomes_bad_gateway() {
        let err = AppError::Upstream {
            status: 302,
            message: "moved".into(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = AppError::from(LlmError::Timeout {
            model: "gpt-4.1-mini".into(),
            timeout_ms: 3000,
        });
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(err.to_string().contains("timed out after 3000ms"));
    }

    #[test]
    fn test_parse_failure_maps_to_bad_gateway() {
        let parse = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = AppError::from(LlmError::Parse(parse));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_error_body_carries_request_id() {
        let id = Uuid::new_v4();
        let response = AppError::Validation("role is required".into())
            .with_request_id(id)
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "role is required");
        assert_eq!(body["request_id"], id.to_string());
    }
}
