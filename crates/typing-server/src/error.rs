//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use typing_core::ContainerError;

/// Application-level errors, each mapped to one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Map a store or signin error. Client errors keep their message;
    /// anything else is logged and reported as `context`.
    pub fn with_context(err: typing_core::Error, context: &str) -> Self {
        match err {
            typing_core::Error::Validation(msg) => ApiError::BadRequest(msg),
            typing_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            unauthorized @ typing_core::Error::Unauthorized => {
                ApiError::Unauthorized(unauthorized.to_string())
            }
            other => {
                error!("{}: {}", context, other);
                ApiError::Internal(context.to_string())
            }
        }
    }
}

impl From<typing_core::Error> for ApiError {
    fn from(err: typing_core::Error) -> Self {
        ApiError::with_context(err, "internal server error")
    }
}

impl From<ContainerError> for ApiError {
    fn from(err: ContainerError) -> Self {
        error!("{}", err);
        ApiError::Internal("internal server error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            message: String,
            code: &'static str,
        }

        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorBody {
            message: self.to_string(),
            code,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
