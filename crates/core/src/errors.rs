//! Core error types for the security master.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use thiserror::Error;

pub use secmaster_market_data::{MarketDataError, RetryClass};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the security master.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Invalid configuration value: {0}")]
    Config(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Whether retrying the failed operation later may succeed.
    ///
    /// Ingestion errors carry their own classification; storage errors are
    /// transient only when the database itself was unavailable.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Error::MarketData(e) => e.retry_class(),
            Error::Database(
                DatabaseError::ConnectionFailed(_)
                | DatabaseError::PoolCreationFailed(_)
                | DatabaseError::TransactionFailed(_),
            ) => RetryClass::Transient,
            _ => RetryClass::Never,
        }
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// An insert in `Fail` mode found the target table already present.
    #[error("Table already exists: {0}")]
    TableExists(String),

    /// An existing table lacks the columns the rows need.
    #[error("Incompatible table schema: {0}")]
    SchemaMismatch(String),

    /// A table name that cannot be safely interpolated into SQL.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}
