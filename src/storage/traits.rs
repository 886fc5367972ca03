//! Storage traits and error types
//!
//! This module defines the keyed-record interface the merge logic works on
//! and the error type shared by all collection file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Collection file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to replace {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

impl StorageError {
    /// True when the file exists but its content could not be decoded
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Json { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A record that may carry a stable identifier
///
/// Records without an identifier never take part in deduplication.
pub trait Keyed {
    /// The record's identifier, if it has one
    fn key(&self) -> Option<&str>;
}
