//! Store error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record carries the requested id.
    #[error("No data was found for passed id")]
    NotFound { id: String },

    /// The database file could not be read.
    #[error("failed to read database file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database file does not hold a valid document.
    #[error("failed to decode database file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory document could not be serialized.
    #[error("failed to encode database document: {0}")]
    Encode(#[source] serde_json::Error),

    /// The serialized document could not be written to disk.
    #[error("failed to persist database to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
