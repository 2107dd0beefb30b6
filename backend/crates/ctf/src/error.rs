//! CTF Error Types
//!
//! Challenge and aggregation error variants that integrate with the unified
//! `kernel::error::AppError` system.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_objects::SoalField;

/// CTF result type alias
pub type CtfResult<T> = Result<T, CtfError>;

#[derive(Debug, Error)]
pub enum CtfError {
    /// Required body fields absent or blank; carries the client-facing hint
    #[error("Missing required fields: {0}")]
    MissingFields(&'static str),

    #[error("Invalid ID format")]
    InvalidId,

    #[error("User ID is required")]
    UserIdRequired,

    #[error("Search query is required")]
    SearchQueryRequired,

    #[error("Invalid URL format")]
    InvalidUrl,

    #[error("No data provided")]
    NoUpdateData,

    #[error("Invalid favorite status")]
    InvalidFavorite,

    /// Create collided with existing soals on these columns
    #[error("Duplicate entry detected: {0:?}")]
    Duplicate(Vec<SoalField>),

    #[error("Soal not found")]
    SoalNotFound,

    #[error("User not found")]
    UserNotFound,

    /// Soal still has completions and cannot be deleted
    #[error("Cannot delete soal")]
    SoalInUse,

    #[error("You have already solved this challenge")]
    AlreadySolved,

    #[error("Incorrect flag")]
    IncorrectFlag,

    /// Failure from the user / session store
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CtfError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CtfError::MissingFields(_)
            | CtfError::InvalidId
            | CtfError::UserIdRequired
            | CtfError::SearchQueryRequired
            | CtfError::InvalidUrl
            | CtfError::NoUpdateData
            | CtfError::InvalidFavorite
            | CtfError::Duplicate(_)
            | CtfError::AlreadySolved
            | CtfError::IncorrectFlag => ErrorKind::BadRequest,
            CtfError::SoalNotFound | CtfError::UserNotFound => ErrorKind::NotFound,
            CtfError::SoalInUse => ErrorKind::Conflict,
            CtfError::Auth(err) => err.kind(),
            CtfError::App(err) => err.kind(),
            CtfError::Database(_) | CtfError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to the response-facing AppError
    pub fn into_app_error(self) -> AppError {
        match self {
            CtfError::MissingFields(hint) => {
                AppError::bad_request("Missing required fields").with_detail(hint)
            }
            CtfError::InvalidId => AppError::bad_request("Invalid ID format")
                .with_detail("The provided ID is not in the correct format"),
            CtfError::UserIdRequired => AppError::bad_request("User ID is required"),
            CtfError::SearchQueryRequired => AppError::bad_request("Search query is required"),
            CtfError::InvalidUrl => {
                AppError::bad_request("Invalid URL format").with_detail("Please provide a valid URL")
            }
            CtfError::NoUpdateData => {
                AppError::bad_request("No data provided").with_detail("Update data is required")
            }
            CtfError::InvalidFavorite => AppError::bad_request("Invalid favorite status"),
            CtfError::Duplicate(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
                AppError::bad_request("Duplicate entry detected").with_detail(format!(
                    "The following fields already exist: {}",
                    names.join(", ")
                ))
            }
            CtfError::SoalNotFound => AppError::not_found("Soal not found")
                .with_detail("The specified soal does not exist"),
            CtfError::UserNotFound => AppError::not_found("User not found"),
            CtfError::SoalInUse => AppError::conflict("Cannot delete soal")
                .with_detail("This soal has associated user attempts and cannot be deleted"),
            CtfError::AlreadySolved => {
                AppError::bad_request("You have already solved this challenge")
            }
            CtfError::IncorrectFlag => AppError::bad_request("Incorrect flag"),
            CtfError::Auth(err) => err.into_app_error(),
            CtfError::App(err) => err,
            CtfError::Database(e) => {
                let kind = AppError::from(e).kind();
                AppError::new(kind, "An internal server error occurred")
            }
            CtfError::Internal(_) => AppError::internal("An internal server error occurred"),
        }
    }

    fn log(&self) {
        match self {
            CtfError::Database(e) => {
                tracing::error!(error = %e, "CTF database error");
            }
            CtfError::Internal(msg) => {
                tracing::error!(message = %msg, "CTF internal error");
            }
            CtfError::Auth(err) if err.kind().is_server_error() => {
                tracing::error!(error = %err, "CTF user store error");
            }
            CtfError::App(err) if err.is_server_error() => {
                tracing::error!(error = %err, "CTF platform error");
            }
            _ => {
                tracing::debug!(error = %self, "CTF error");
            }
        }
    }
}

impl IntoResponse for CtfError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}
