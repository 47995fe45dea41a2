//! Storage error types.
//!
//! Every failure at the store boundary is reported as a [`StorageError`]; callers
//! must treat the record(s) involved as not persisted.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StorageError::AlreadyExists(db.message().to_string())
            }
            sqlx::Error::Decode(e) => StorageError::Encoding(e.to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                StorageError::Encoding(format!("column {}: {}", index, source))
            }
            _ => StorageError::Database(err.to_string()),
        }
    }
}
