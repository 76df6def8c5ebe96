//! CSV import subsystem.
//!
//! # Data Flow
//! ```text
//! multipart upload
//!     → csv.rs (media type check per file part)
//!     → temp file under import.tmp_dir
//!     → re-read + parse (header row = field names)
//!     → save callback with every record
//!     → handlers::import (one in-process create per record)
//! ```
//!
//! # Design Decisions
//! - The media type must be exactly `text/csv`
//! - Nothing is saved unless every file part was received and parsed
//! - Per-record create failures are skipped, never rolled back

pub mod csv;

use std::collections::BTreeMap;

use axum::http::StatusCode;
use thiserror::Error;

pub use self::csv::{ensure_csv, parse_csv, receive_csv, CSV_MEDIA_TYPE};

/// One parsed CSV row, keyed by header.
pub type CsvRecord = BTreeMap<String, String>;

/// Errors raised while receiving or parsing an upload.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A file part declared something other than `text/csv`.
    #[error("Invalid file type. Only CSV files are allowed")]
    UnsupportedMediaType { found: Option<String> },

    /// The multipart payload could not be decoded.
    #[error("Invalid multipart payload: {0}")]
    Multipart(String),

    /// The upload held no file part.
    #[error("Missing CSV file")]
    MissingFile,

    #[error("Error writing file")]
    Write(#[source] std::io::Error),

    #[error("Error reading file")]
    Read(#[source] std::io::Error),

    #[error("Error parsing file")]
    Parse(#[source] ::csv::Error),
}

impl ImportError {
    pub fn status(&self) -> StatusCode {
        match self {
            ImportError::UnsupportedMediaType { .. } => StatusCode::BAD_REQUEST,
            ImportError::Multipart(_) | ImportError::MissingFile => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ImportError::Write(_) | ImportError::Read(_) | ImportError::Parse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
