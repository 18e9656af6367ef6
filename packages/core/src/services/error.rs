//! Service Layer Error Types
//!
//! "Not found" is never an error in this layer: lookups return `Ok(None)`.
//! These types cover the failures a caller must be able to tell apart from
//! absence, most importantly a blob that exists but cannot be decoded.

use crate::db::DatabaseError;
use thiserror::Error;

/// Blob loading errors
#[derive(Error, Debug)]
pub enum BlobError {
    /// Store lookup failed
    #[error("Blob lookup failed: {0}")]
    Database(#[from] DatabaseError),

    /// The record exists but its payload cannot be decoded (bad gzip stream)
    #[error("Blob {blob_uid} is corrupt: {reason}")]
    Corrupt { blob_uid: String, reason: String },
}

impl BlobError {
    /// Create a corrupt blob error
    pub fn corrupt(blob_uid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            blob_uid: blob_uid.into(),
            reason: reason.into(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}

/// Read-path errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database operation failed
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    /// Blob could not be loaded
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// A row did not have the expected shape
    #[error("Invalid {context} row: {reason}")]
    InvalidRow { context: String, reason: String },
}

impl StoreError {
    /// Create an invalid row error
    pub fn invalid_row(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRow {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

impl From<libsql::Error> for StoreError {
    fn from(err: libsql::Error) -> Self {
        Self::Database(DatabaseError::LibsqlError(err))
    }
}
