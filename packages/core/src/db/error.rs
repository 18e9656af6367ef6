//! Database Error Types
//!
//! This module defines error types for database operations, providing
//! clear error handling for store discovery, connection and query failures.

use std::path::PathBuf;
use thiserror::Error;

/// Database operation errors
///
/// Covers store discovery, connection and basic query failures. Higher-level
/// lookups map "no such row" to `Ok(None)` and never use these variants for it.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The store file does not exist (the upstream collector has not run)
    #[error("Structure store missing at {}", .path.display())]
    StoreMissing { path: PathBuf },

    /// Failed to establish database connection
    #[error("Failed to connect to database at {}: {source}", .path.display())]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Failed to initialize database schema
    #[error("Failed to initialize database schema: {0}")]
    InitializationFailed(String),

    /// Filesystem failure (store directory, overflow blob file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// SQL execution error with context
    #[error("SQL execution failed: {context}")]
    SqlExecutionError { context: String },
}

impl DatabaseError {
    /// Create a store missing error
    pub fn store_missing(path: PathBuf) -> Self {
        Self::StoreMissing { path }
    }

    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create an initialization failed error
    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    /// Create a SQL execution error with context
    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }
}
