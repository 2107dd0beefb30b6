//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more required fields are missing (joined list of messages)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid email format")]
    InvalidEmail,

    /// Password policy violation
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Session cookie missing, signature invalid, or session expired
    #[error("No active session found")]
    SessionInvalid,

    /// Stored role id is not one of the known roles
    #[error("Role not found")]
    RoleNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid ID format")]
    InvalidId,

    #[error("No data provided")]
    NoUpdateData,

    /// Caller is neither the account owner nor an admin
    #[error("Access denied")]
    AccessDenied,

    /// Error raised by a value object or platform helper
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_)
            | AuthError::InvalidEmail
            | AuthError::WeakPassword(_)
            | AuthError::EmailTaken
            | AuthError::RoleNotFound
            | AuthError::InvalidId
            | AuthError::NoUpdateData => ErrorKind::BadRequest,
            AuthError::InvalidCredentials | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::AccessDenied => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::App(err) => err.kind(),
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to the response-facing AppError
    ///
    /// Database and internal failures collapse to a generic message.
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Validation(fields) => {
                AppError::bad_request("Validation failed").with_detail(fields)
            }
            AuthError::InvalidEmail => AppError::bad_request("Invalid email format")
                .with_detail("Please provide a valid email address"),
            AuthError::WeakPassword(reason) => {
                AppError::bad_request("Password too weak").with_detail(reason)
            }
            AuthError::EmailTaken => AppError::bad_request("Email is already registered"),
            AuthError::InvalidCredentials => AppError::unauthorized("Invalid email or password"),
            AuthError::SessionInvalid => {
                AppError::unauthorized("Unauthorized").with_detail("No active session found")
            }
            AuthError::RoleNotFound => {
                AppError::bad_request("Role not found").with_detail("User has no role assigned")
            }
            AuthError::UserNotFound => AppError::not_found("User not found")
                .with_detail("The specified user does not exist"),
            AuthError::InvalidId => AppError::bad_request("Invalid ID format")
                .with_detail("The provided ID is not in the correct format"),
            AuthError::NoUpdateData => {
                AppError::bad_request("No data provided").with_detail("Update data is required")
            }
            AuthError::AccessDenied => AppError::forbidden("Unauthorized access")
                .with_detail("You can only access your own account"),
            AuthError::App(err) => err,
            AuthError::Database(e) => {
                let kind = AppError::from(e).kind();
                AppError::new(kind, "An internal server error occurred")
            }
            AuthError::Internal(_) => AppError::internal("An internal server error occurred"),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::App(err) if err.is_server_error() => {
                tracing::error!(error = %err, "Auth platform error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccessDenied => {
                tracing::warn!("Cross-account access attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}
