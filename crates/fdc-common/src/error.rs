//! Error types shared by the store adapters and the ingest pipeline

use thiserror::Error;

/// Result type alias for store and shared operations
pub type Result<T> = std::result::Result<T, FdcError>;

/// Main error type for fdc-common
#[derive(Error, Debug)]
pub enum FdcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid document key: {0:?}")]
    InvalidKey(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl FdcError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
