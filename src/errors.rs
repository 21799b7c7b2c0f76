//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion. Every variant is tagged
//! with an [`ErrorClass`] when it is raised, which the error monitor
//! uses to decide whether an operator gets notified.

use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Generic message shown in place of unexpected server errors.
pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "An unexpected error occurred in the application. Please contact an advisor to resolve it.";

/// Default message for errors that must reach the user verbatim.
pub const FATAL_ERROR_MESSAGE: &str =
    "The operation could not be completed. Please contact us to resolve it.";

/// How a failure is treated by the error monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller-correctable 4xx failure; never notified
    Client,
    /// Must reach the caller unchanged, but is still notified
    Fatal,
    /// Unexpected failure; notified and redacted
    Server,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid origin")]
    InvalidOrigin,

    // Resource errors
    #[error("User already exists. Use another email.")]
    UserAlreadyExists,

    #[error("Resource not found")]
    NotFound,

    // Validation
    #[error("{0}")]
    Validation(String),

    // Client-status error that still needs operator attention
    #[error("{0}")]
    Fatal(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Session cache error")]
    SessionCache(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),

    /// Redacted replacement for unexpected errors
    #[error("An unexpected error occurred in the application. Please contact an advisor to resolve it.")]
    Unexpected,
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "INVALID_EMAIL_OR_PASSWORD",
            AppError::InvalidOrigin => "INVALID_ORIGIN",
            AppError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            AppError::NotFound => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Fatal(_) => "OPERATION_FAILED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::SessionCache(_) => "SESSION_CACHE_ERROR",
            AppError::Internal(_) | AppError::Unexpected => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InvalidOrigin => StatusCode::FORBIDDEN,
            AppError::UserAlreadyExists => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Fatal(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::SessionCache(_)
            | AppError::Internal(_)
            | AppError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error must be surfaced verbatim.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Fatal(_))
    }

    /// Classify the error for notification purposes.
    pub fn class(&self) -> ErrorClass {
        if self.is_fatal() {
            ErrorClass::Fatal
        } else if self.status().is_client_error() {
            ErrorClass::Client
        } else {
            ErrorClass::Server
        }
    }

    /// Diagnostic detail for operators: debug form plus the source chain.
    pub fn detail(&self) -> String {
        let mut detail = format!("{:?}", self);
        let mut source = self.source();
        while let Some(err) = source {
            detail.push_str(&format!("\nCaused by: {}", err));
            source = err.source();
        }
        detail
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::Fatal(msg) => msg.clone(),

            // Hide details for internal errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::SessionCache(e) => {
                tracing::error!("Session cache error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Fatal error with the standard "contact us" message.
    pub fn bug() -> Self {
        AppError::Fatal(FATAL_ERROR_MESSAGE.to_string())
    }
}
