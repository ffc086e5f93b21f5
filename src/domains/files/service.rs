//! File service - composes the path guard and the safe file store.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Serialize;
use tracing::{info, instrument};

use super::error::FileError;
use super::request::FileRequest;
use crate::core::security::{AccessPolicy, validate};
use crate::core::store::SafeFileStore;

/// Result of a successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ReadOutcome {
    /// The file path as requested.
    pub file: String,
    /// Full text content of the file.
    pub content: String,
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct WriteOutcome {
    /// The file path as requested.
    pub file: String,
    /// Always true; failures are reported as errors.
    pub written: bool,
    /// File name of the backup taken before overwriting, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
}

/// Successful outcome of a [`FileRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Read(ReadOutcome),
    Written(WriteOutcome),
}

/// Validates requested paths and performs reads and writes on them.
///
/// Cheap to clone; share one instance between all transports.
#[derive(Debug, Clone)]
pub struct FileService {
    policy: Arc<AccessPolicy>,
    store: SafeFileStore,
}

impl FileService {
    /// Create a service on the local filesystem.
    pub fn new(policy: Arc<AccessPolicy>) -> Self {
        let store = SafeFileStore::new(policy.clone());
        Self { policy, store }
    }

    /// Create a service on an existing store (e.g. with a custom backend).
    pub fn with_store(store: SafeFileStore) -> Self {
        let policy = store.policy().clone();
        Self { policy, store }
    }

    /// The access policy in force.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Validate `file` and read it.
    #[instrument(skip(self))]
    pub fn read(&self, file: &str) -> Result<ReadOutcome, FileError> {
        let path = validate(file, &self.policy)?;
        let content = self.store.read(&path)?;

        info!("Served {}", file);
        Ok(ReadOutcome {
            file: file.to_string(),
            content,
        })
    }

    /// Validate `file` and write `content` to it.
    #[instrument(skip(self, content))]
    pub fn write(&self, file: &str, content: &str) -> Result<WriteOutcome, FileError> {
        let path = validate(file, &self.policy)?;
        let receipt = self.store.write(&path, content)?;

        info!("Saved {}", file);
        Ok(WriteOutcome {
            file: file.to_string(),
            written: true,
            backup: receipt.backup_name,
        })
    }

    /// Execute a parsed request.
    pub fn handle(&self, request: &FileRequest) -> Result<FileOutcome, FileError> {
        match request {
            FileRequest::Read { file } => self.read(file).map(FileOutcome::Read),
            FileRequest::Write { file, content } => {
                self.write(file, content).map(FileOutcome::Written)
            }
        }
    }
}
