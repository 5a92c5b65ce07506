//! Error types for the ingest pipeline

use fdc_common::FdcError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors that end a loader or worker
///
/// Per-row problems (unparsable numbers or dates, unknown keys) are logged and
/// never surface as an `IngestError`.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv_async::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] FdcError),

    #[error("Failed to load {category} dictionary: {source}")]
    Dictionary {
        category: String,
        #[source]
        source: FdcError,
    },

    #[error("{worker} worker did not finish: {message}")]
    Worker { worker: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
