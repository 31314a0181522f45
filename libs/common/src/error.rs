//! Custom error types for the common library

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error raised while verifying or issuing tokens
#[derive(Error, Debug)]
pub enum TokenError {
    /// The token could not be decoded or its signature is invalid
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The token decoded fine but is of the wrong kind for this use
    #[error("Expected a {expected} token")]
    WrongType { expected: &'static str },

    /// Key material could not be loaded
    #[error("Key error: {0}")]
    Key(String),
}
