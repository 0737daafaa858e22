//! Common error types for MLR

use thiserror::Error;

use crate::db::gateway::StoreError;

/// Common result type for MLR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the MLR crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored-procedure call failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
