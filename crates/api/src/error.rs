//! API error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use case_queue::QueueError;
use serde_json::json;
use thiserror::Error;
use triage_engine::TriageError;
use uuid::Uuid;

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),
    #[error(transparent)]
    Triage(#[from] TriageError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("Metrics exporter not installed")]
    MetricsUnavailable,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) | ApiError::Queue(QueueError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Triage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Queue(QueueError::LockPoisoned) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MetricsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::SessionNotFound(Uuid::nil()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(TriageError::EmptyMessage).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(QueueError::NotFound(Uuid::nil())).status(),
            StatusCode::NOT_FOUND
        );
    }
}
