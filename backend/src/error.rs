//! Error handling for the store inventory service
//!
//! Every error becomes a JSON body of the form
//! `{"error": {"code": "...", "message": "..."}}`.

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Seconds a client should wait before retrying after a backend outage
pub const RETRY_AFTER_SECS: u32 = 5;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient stock for {item}: requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: i64,
        available: i64,
    },

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    // Record store errors
    #[error("Record store unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Record store error: {0}")]
    Backend(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a single-field validation failure
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Whether the client may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::BackendUnavailable(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::BackendUnavailable(msg),
            other => AppError::Backend(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("request".to_string(), "Invalid request".to_string()));
        AppError::Validation { field, message }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            retryable: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid username or password"),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("TOKEN_EXPIRED", "Token has expired"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Invalid token"),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action",
                ),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone()),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    field: Some(field.clone()),
                    ..ErrorDetail::new("VALIDATION_ERROR", message.clone())
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InsufficientStock { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("INSUFFICIENT_STOCK", self.to_string()),
            ),
            AppError::DataIntegrity(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATA_INTEGRITY_ERROR", msg.clone()),
            ),
            AppError::BackendUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    retryable: true,
                    ..ErrorDetail::new(
                        "BACKEND_UNAVAILABLE",
                        "The inventory store is temporarily unavailable",
                    )
                },
            ),
            AppError::Backend(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new("BACKEND_ERROR", "The inventory store rejected the request"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone()),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let mut response = (status, Json(ErrorResponse { error: error_detail })).into_response();
        if self.is_retryable() {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unavailable_maps_to_retryable() {
        let err: AppError = StoreError::Unavailable("timeout".into()).into();
        assert!(matches!(err, AppError::BackendUnavailable(_)));
        assert!(err.is_retryable());

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "5");
    }

    #[test]
    fn test_store_rejection_maps_to_bad_gateway() {
        let err: AppError = StoreError::Rejected {
            status: 403,
            message: "forbidden".into(),
        }
        .into();
        assert!(!err.is_retryable());
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_insufficient_stock_status() {
        let err = AppError::InsufficientStock {
            item: "Bolt".into(),
            requested: 20,
            available: 15,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Bolt: requested 20, available 15"
        );
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
