use storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session busy: a page load is in progress")]
    Busy,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Seed generation error: {0}")]
    Seed(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
