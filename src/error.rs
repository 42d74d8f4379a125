// HTTP error types rendered through the uniform error page
use axum::{http::StatusCode, response::IntoResponse};
use std::collections::BTreeMap;

use crate::database::StoreError;
use crate::views;

pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

/// Errors raised by handlers and interceptors. Every variant maps to a status
/// code and a client-safe message.
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: BTreeMap<String, String>,
    },
    /// Identifier not in the storage engine's format (cast failure)
    InvalidId(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        let message = match self {
            AppError::BadRequest(msg) => msg,
            AppError::ValidationError { message, .. } => message,
            AppError::InvalidId(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::Conflict(msg) => msg,
            AppError::InternalServerError(msg) => msg,
            AppError::ServiceUnavailable(msg) => msg,
        };

        if message.is_empty() {
            DEFAULT_ERROR_MESSAGE
        } else {
            message
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::InvalidId(_) => "INVALID_ID",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    /// Build a validation error whose message joins every field message with ","
    pub fn validation_error(field_errors: BTreeMap<String, String>) -> Self {
        let message = field_errors.values().cloned().collect::<Vec<_>>().join(",");
        AppError::ValidationError {
            message,
            field_errors,
        }
    }

    pub fn invalid_id() -> Self {
        AppError::InvalidId("Invalid ID".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        AppError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        AppError::ServiceUnavailable(message.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::not_found(msg),
            StoreError::Conflict(msg) => AppError::conflict(msg),
            StoreError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                AppError::internal_server_error(DEFAULT_ERROR_MESSAGE)
            }
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        tracing::error!("Session error: {}", err);
        AppError::internal_server_error(DEFAULT_ERROR_MESSAGE)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        AppError::internal_server_error(DEFAULT_ERROR_MESSAGE)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

// Every error reaches the client through the same page
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{} ({}): {}", status, self.error_code(), self.message());
        } else {
            tracing::debug!("{} ({}): {}", status, self.error_code(), self.message());
        }

        (status, views::error::page(status, self.message())).into_response()
    }
}
