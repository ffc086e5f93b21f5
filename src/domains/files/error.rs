//! Error taxonomy for file operations.

use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;

use super::request::RequestError;
use crate::core::security::GuardError;
use crate::core::store::StoreError;

/// Stable classification of every way a file request can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TraversalRejected,
    AccessDenied,
    InvalidFileType,
    NotFound,
    TooLarge,
    DecodeError,
    ReadFailed,
    BackupFailed,
    WriteFailed,
    RequestMalformed,
}

/// Any failure of a file request, from parsing through guard and store.
///
/// The `Display` output is the stable message shown to clients.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FileError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(_) => ErrorKind::RequestMalformed,
            Self::Guard(e) => match e {
                GuardError::TraversalRejected { .. } => ErrorKind::TraversalRejected,
                GuardError::AccessDenied { .. } => ErrorKind::AccessDenied,
                GuardError::InvalidFileType { .. } => ErrorKind::InvalidFileType,
            },
            Self::Store(e) => match e {
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::FileTooLarge { .. } | StoreError::ContentTooLarge { .. } => {
                    ErrorKind::TooLarge
                }
                StoreError::Decode { .. } => ErrorKind::DecodeError,
                StoreError::ReadFailed { .. } => ErrorKind::ReadFailed,
                StoreError::BackupFailed { .. } => ErrorKind::BackupFailed,
                StoreError::WriteFailed { .. } => ErrorKind::WriteFailed,
            },
        }
    }
}
