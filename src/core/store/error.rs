//! Store-specific error types.

use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing a validated path.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The read target does not exist.
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// The file on disk exceeds the size ceiling.
    #[error("File too large")]
    FileTooLarge { size: u64, limit: u64 },

    /// The content to write exceeds the size ceiling.
    #[error("Content too large")]
    ContentTooLarge { size: u64, limit: u64 },

    /// The file bytes are not valid UTF-8.
    #[error("Failed to read file: not valid UTF-8 text")]
    Decode { path: String },

    /// Reading failed for another reason (e.g. the target is a directory).
    #[error("Failed to read file: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The pre-write backup could not be created; the target is untouched.
    #[error("Failed to back up existing file: {path}")]
    BackupFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The destructive write failed; a rollback was attempted if possible.
    #[error("Failed to write file: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// A specialized Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
