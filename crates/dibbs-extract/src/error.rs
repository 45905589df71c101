//! Error types for extraction and batch processing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur while extracting or processing solicitations.
///
/// A field that simply is not present never produces an error; it yields its
/// sentinel value instead.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] dibbs_config::ConfigError),

    #[error("{0}")]
    Core(#[from] dibbs_core::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unreadable PDF {path}: {message}")]
    UnreadablePdf { path: PathBuf, message: String },

    #[error("Malformed {table} table, row {row}: {message}")]
    MalformedTable {
        table: &'static str,
        row: usize,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),
}

impl ExtractError {
    pub(crate) fn malformed(table: &'static str, row: usize, message: impl Into<String>) -> Self {
        ExtractError::MalformedTable {
            table,
            row,
            message: message.into(),
        }
    }
}
