//! Access Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AccessError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, AccessError>;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AccessError::UnknownRole(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_ROLE"),
            AccessError::UnknownPermission(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_PERMISSION"),
            AccessError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AccessError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AccessError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AccessError::Json(_) => (StatusCode::BAD_REQUEST, "INVALID_JSON"),
            AccessError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
