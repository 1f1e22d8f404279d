//! Error handling for the Cold Storage Management Platform
//!
//! Every failure is rendered as `{"error": {"code", "message", "field"?}}`
//! so the browser forms can surface the server's message verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{ErrorDetail, ErrorResponse, FieldError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation {
            field: err.field.to_string(),
            message: err.message,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .min_by_key(|(field, _)| *field)
            .and_then(|(field, errs)| errs.first().map(|e| (field, e.clone())));

        match first {
            Some((field, err)) => AppError::Validation {
                field: field.to_string(),
                message: err
                    .message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            },
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

fn detail(code: &str, message: impl Into<String>, field: Option<String>) -> ErrorDetail {
    ErrorDetail {
        code: code.to_string(),
        message: message.into(),
        field,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                detail("INVALID_CREDENTIALS", "Invalid credentials", None),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::FORBIDDEN,
                detail("UNAUTHORIZED", message.clone(), None),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                detail(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action",
                    None,
                ),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                detail("VALIDATION_ERROR", message.clone(), Some(field.clone())),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                detail("VALIDATION_ERROR", msg.clone(), None),
            ),
            AppError::DuplicateEntry(msg) => (
                StatusCode::CONFLICT,
                detail("DUPLICATE_ENTRY", msg.clone(), None),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                detail("CONFLICT", msg.clone(), None),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                detail("NOT_FOUND", format!("{} not found", resource), None),
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                detail("INSUFFICIENT_STOCK", msg.clone(), None),
            ),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                detail(
                    "EXTERNAL_SERVICE_ERROR",
                    format!("External service error: {}", msg),
                    None,
                ),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail(
                    "CONFIGURATION_ERROR",
                    format!("Configuration error: {}", msg),
                    None,
                ),
            ),
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation() =>
            {
                (
                    StatusCode::CONFLICT,
                    detail("DUPLICATE_ENTRY", "A record with these details already exists", None),
                )
            }
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if db_err.is_foreign_key_violation() =>
            {
                (
                    StatusCode::CONFLICT,
                    detail("CONFLICT", "The record is still referenced by other records", None),
                )
            }
            // string_data_right_truncation
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("22001") =>
            {
                (
                    StatusCode::BAD_REQUEST,
                    detail("VALIDATION_ERROR", "A value is too long for its field", None),
                )
            }
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("DATABASE_ERROR", "A database error occurred", None),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("INTERNAL_ERROR", msg.clone(), None),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("INTERNAL_ERROR", "An internal server error occurred", None),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
