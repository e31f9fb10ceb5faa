//! Error types for finboard.

use thiserror::Error;

/// Common error type for finboard.
#[derive(Error, Debug)]
pub enum FinboardError {
    /// Database error.
    ///
    /// Wraps errors from any sqlx backend. Errors from sqlx are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error (missing login, bad credentials, bad token).
    #[error("authentication error: {0}")]
    Auth(String),

    /// The principal lacks the capability for the requested operation.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A unique value is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for FinboardError {
    fn from(e: sqlx::Error) -> Self {
        FinboardError::Database(e.to_string())
    }
}

/// Result type alias for finboard operations.
pub type Result<T> = std::result::Result<T, FinboardError>;
