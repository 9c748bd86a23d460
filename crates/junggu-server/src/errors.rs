//! HTTP error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use junggu_runtime::RuntimeError;
use serde_json::json;

/// Errors returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unknown session.
    #[error("{0}")]
    NotFound(String),
    /// Server cannot take more sessions.
    #[error("{0}")]
    Unavailable(String),
    /// Request body missing, malformed or of the wrong shape.
    #[error("{message}")]
    InvalidBody {
        /// 400, 415 or 422, as decided by the JSON extractor.
        status: StatusCode,
        /// What was wrong with the body.
        message: String,
    },
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidBody { status, .. } => *status,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "SESSION_NOT_FOUND",
            Self::Unavailable(_) => "SESSION_LIMIT",
            Self::InvalidBody { .. } => "INVALID_BODY",
        }
    }
}

impl From<RuntimeError> for ApiError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::SessionNotFound(_) => Self::NotFound(err.to_string()),
            RuntimeError::SessionLimit { .. } => Self::Unavailable(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}
