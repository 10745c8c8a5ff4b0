//! API error responses
//!
//! Every failure is returned as `{code, message}` with a matching status.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use jobmatch_core::{EmbeddingError, MatchError};

/// Message returned while the index is degraded
pub const DEGRADED_MESSAGE: &str = "service degraded, no matches available";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("service degraded, no matches available")]
    Degraded,
    #[error("{0}")]
    EmbeddingUnavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Degraded | ApiError::EmbeddingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Degraded => "service_degraded",
            ApiError::EmbeddingUnavailable(_) => "embedding_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::Validation(e) => ApiError::Validation(e.to_string()),
            // Blank candidate text is the caller's fault, not the backend's
            MatchError::EmbeddingFailure(EmbeddingError::InvalidInput(reason)) => ApiError::Validation(reason),
            MatchError::EmbeddingFailure(e) => ApiError::EmbeddingUnavailable(e.to_string()),
            MatchError::Degraded(_) | MatchError::DimensionMismatch { .. } => ApiError::Degraded,
            MatchError::NotFound(what) => ApiError::NotFound(what),
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::Internal("internal error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
