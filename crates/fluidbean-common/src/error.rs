//! Common error types used throughout fluidbean.
//!
//! This module provides a unified error type covering the failure cases the
//! workspace deals with: missing rows, database errors, record validation,
//! and length-limit violations on typed columns.

/// Common error type for fluidbean.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested bean or record was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Record validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A value exceeded a column's declared length limit.
    #[error("Value exceeds length limit of {limit} for column '{column}'")]
    LengthExceeded { column: String, limit: usize },

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("bean 12");
        assert_eq!(err.to_string(), "Not found: bean 12");

        let err = Error::Unauthorized;
        assert_eq!(err.to_string(), "Unauthorized");

        let err = Error::database("connection failed");
        assert_eq!(err.to_string(), "Database error: connection failed");

        let err = Error::validation("email: notblank");
        assert_eq!(err.to_string(), "Validation error: email: notblank");

        let err = Error::LengthExceeded {
            column: "title".to_string(),
            limit: 64,
        };
        assert_eq!(
            err.to_string(),
            "Value exceeds length limit of 64 for column 'title'"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_result_type() {
        fn ok_fn() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(ok_fn().unwrap(), 42);

        fn error_fn() -> Result<i32> {
            Err(Error::Unauthorized)
        }
        assert!(error_fn().is_err());
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(Error::not_found("x"), Error::NotFound(_)));
        assert!(matches!(Error::database("x"), Error::Database(_)));
        assert!(matches!(Error::validation("x"), Error::Validation(_)));
        assert!(matches!(Error::invalid_input("x"), Error::InvalidInput(_)));
        assert!(matches!(Error::internal("x"), Error::Internal(_)));
    }
}
