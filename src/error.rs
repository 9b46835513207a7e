//! Error types for Shelfstock
//!
//! One crate-wide error enum built with thiserror. Variants are grouped by
//! how the HTTP layer classifies them: caller mistakes (validation,
//! not-found, conflict, unauthorized) carry a message that is safe to show
//! to the client; storage and serialization failures are logged and
//! surfaced as a generic server error.

use thiserror::Error;

/// Result type alias using our ShelfstockError type
pub type Result<T> = std::result::Result<T, ShelfstockError>;

/// Main error type for Shelfstock
#[derive(Error, Debug)]
pub enum ShelfstockError {
    // ===== Caller errors =====

    /// Missing or malformed required input (e.g. a zero-quantity add)
    #[error("{0}")]
    Validation(String),

    /// A referenced book, shelf, or user does not exist
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique key: ISBN, shelf location, or user email
    #[error("{0}")]
    Conflict(String),

    /// Missing or invalid bearer credential
    #[error("{0}")]
    Unauthorized(String),

    // ===== Server faults =====

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Embedded shelf data could not be encoded or decoded
    #[error("invalid embedded data: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShelfstockError {
    /// Validation error with a caller-visible message
    pub fn validation(message: impl Into<String>) -> Self {
        ShelfstockError::Validation(message.into())
    }

    /// Not-found error for a named entity ("book" → "book not found")
    pub fn not_found(entity: &str) -> Self {
        ShelfstockError::NotFound(format!("{entity} not found"))
    }

    /// Conflict error for a duplicate unique key
    pub fn conflict(message: impl Into<String>) -> Self {
        ShelfstockError::Conflict(message.into())
    }

    /// Unauthorized error with a caller-visible message
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ShelfstockError::Unauthorized(message.into())
    }

    /// Whether this error was caused by the caller (4xx class)
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ShelfstockError::Validation(_)
                | ShelfstockError::NotFound(_)
                | ShelfstockError::Conflict(_)
                | ShelfstockError::Unauthorized(_)
        )
    }

    /// Message suitable for the client response
    ///
    /// Caller errors pass their message through; server faults are reduced
    /// to a generic message so internals never leak into responses.
    pub fn user_message(&self) -> String {
        if self.is_caller_error() {
            self.to_string()
        } else {
            "server error".to_string()
        }
    }
}

/// Map a sqlx error to a Conflict with the given message when it is a
/// UNIQUE constraint violation, passing everything else through.
pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> ShelfstockError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ShelfstockError::Conflict(message.to_string())
        }
        _ => ShelfstockError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_keep_their_message() {
        let err = ShelfstockError::not_found("book");
        assert!(err.is_caller_error());
        assert_eq!(err.user_message(), "book not found");
    }

    #[test]
    fn server_faults_are_generic() {
        let err = ShelfstockError::Internal("pool exhausted".to_string());
        assert!(!err.is_caller_error());
        assert_eq!(err.user_message(), "server error");
    }
}
