//! Error handling for the Dairy Herd Management Platform
//!
//! Provides consistent JSON error responses with machine-readable codes.
//! Every mutating operation either fully succeeds or fails with exactly one
//! of these kinds; transactions roll back on any error propagation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Duplicate record: {0}")]
    DuplicateRecord(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Delete window expired")]
    DeleteWindowExpired,

    /// Concurrent transactions contended for the same rows; the caller may
    /// retry the whole operation
    #[error("Transaction conflict")]
    TransactionConflict,

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

// Postgres reports serialization failures (40001) and deadlocks (40P01) as
// retryable; surface them as TransactionConflict instead of a generic 500.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if let Some(code) = db_err.code() {
                if code == "40001" || code == "40P01" {
                    return AppError::TransactionConflict;
                }
            }
        }
        AppError::DatabaseError(err)
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
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message: "Invalid email or password".to_string(),
                    field: None,
                },
            ),
            AppError::Unauthorized(message) => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "UNAUTHORIZED".to_string(),
                    message: message.clone(),
                    field: None,
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ENTRY".to_string(),
                    message: format!("A record with this {} already exists", field),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::DuplicateRecord(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_RECORD".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::DeleteWindowExpired => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "DELETE_WINDOW_EXPIRED".to_string(),
                    message: "Sales can only be deleted within 12 hours of creation".to_string(),
                    field: None,
                },
            ),
            AppError::TransactionConflict => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "TRANSACTION_CONFLICT".to_string(),
                    message: "The operation conflicted with a concurrent request; please retry"
                        .to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A database error occurred".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
