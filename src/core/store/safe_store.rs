//! Read and crash-safe write of validated configuration files.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, instrument, warn};

use super::backend::{FileBackend, LocalFs};
use super::backup::create_backup;
use super::error::{StoreError, StoreResult};
use crate::core::security::{AccessPolicy, ValidatedPath};

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// File name (not full path) of the backup taken before overwriting, if any.
    pub backup_name: Option<String>,
}

/// Performs reads and backup-protected writes on paths accepted by the guard.
///
/// The store holds no mutable state, so it can be shared freely between
/// threads. The backup/write/rollback sequence is not serialized per path
/// though: two concurrent writers to the same file can interleave, letting
/// one writer's backup capture the other's content or one writer's rollback
/// clobber the other's successful write. Callers that need strict ordering
/// per path must serialize writes themselves.
///
/// All operations are blocking and carry no timeout.
#[derive(Clone)]
pub struct SafeFileStore {
    policy: Arc<AccessPolicy>,
    backend: Arc<dyn FileBackend>,
}

impl std::fmt::Debug for SafeFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeFileStore")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SafeFileStore {
    /// Create a store on the local filesystem.
    pub fn new(policy: Arc<AccessPolicy>) -> Self {
        Self::with_backend(policy, Arc::new(LocalFs))
    }

    /// Create a store on a custom backend.
    pub fn with_backend(policy: Arc<AccessPolicy>, backend: Arc<dyn FileBackend>) -> Self {
        Self { policy, backend }
    }

    /// The policy this store enforces size limits and backups from.
    pub fn policy(&self) -> &Arc<AccessPolicy> {
        &self.policy
    }

    /// Read the full text content of a file.
    ///
    /// The size ceiling is checked against the file's metadata before any
    /// content is loaded.
    #[instrument(skip_all, fields(path = %path))]
    pub fn read(&self, path: &ValidatedPath) -> StoreResult<String> {
        let target = path.canonical();
        let limit = self.policy.max_file_size();

        let size = match self.backend.file_len(target) {
            Ok(Some(size)) => size,
            Ok(None) => {
                return Err(StoreError::NotFound {
                    path: path.requested().to_string(),
                });
            }
            Err(e) => return Err(read_failed(path, e)),
        };

        if size > limit {
            warn!("File too large: {} bytes (limit {})", size, limit);
            return Err(StoreError::FileTooLarge { size, limit });
        }

        let bytes = self.backend.read(target).map_err(|e| read_failed(path, e))?;

        let content = String::from_utf8(bytes).map_err(|_| StoreError::Decode {
            path: path.requested().to_string(),
        })?;

        info!("Read {} bytes", content.len());
        Ok(content)
    }

    /// Replace the content of a file, backing up what was there first.
    ///
    /// The target is never left worse off than before the call: either the
    /// new content is fully written, or the original content is restored
    /// from the backup taken just before the write. A target that did not
    /// exist before is removed again. A failed restore is logged and
    /// swallowed; the caller still gets [`StoreError::WriteFailed`].
    #[instrument(skip_all, fields(path = %path, size = content.len()))]
    pub fn write(&self, path: &ValidatedPath, content: &str) -> StoreResult<WriteReceipt> {
        let target = path.canonical();
        let limit = self.policy.max_file_size();
        let size = content.len() as u64;

        if size > limit {
            warn!("Content too large: {} bytes (limit {})", size, limit);
            return Err(StoreError::ContentTooLarge { size, limit });
        }

        let existed = match self.backend.file_len(target) {
            Ok(len) => len.is_some(),
            Err(e) if self.policy.create_backups() => return Err(backup_failed(path, e)),
            Err(e) => return Err(write_failed(path, e)),
        };

        let backup = if existed && self.policy.create_backups() {
            Some(self.backup_existing(path)?)
        } else {
            None
        };

        if let Some(parent) = target.parent() {
            self.backend
                .create_dir_all(parent)
                .map_err(|e| write_failed(path, e))?;
        }

        if let Err(e) = self.backend.write(target, content.as_bytes()) {
            warn!("Write failed: {}", e);
            match &backup {
                Some(backup_path) => self.restore(path, backup_path),
                None if !existed => self.discard_partial(path),
                None => {}
            }
            return Err(write_failed(path, e));
        }

        let backup_name = backup
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().to_string());

        info!("Wrote {} bytes (backup: {:?})", size, backup_name);
        Ok(WriteReceipt { backup_name })
    }

    /// Copy the current content of an existing target to a timestamped sibling.
    fn backup_existing(&self, path: &ValidatedPath) -> StoreResult<PathBuf> {
        let target = path.canonical();

        let original = self.backend.read(target).map_err(|e| backup_failed(path, e))?;
        let backup_path = create_backup(self.backend.as_ref(), target, &original, &Local::now())
            .map_err(|e| backup_failed(path, e))?;

        info!("Backed up to {}", backup_path.display());
        Ok(backup_path)
    }

    /// Remove whatever a failed write left at a target that did not exist before.
    fn discard_partial(&self, path: &ValidatedPath) {
        match self.backend.remove_file(path.canonical()) {
            Ok(()) => info!("Removed partially written file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => error!("Could not remove partially written file: {}", e),
        }
    }

    /// Best-effort rollback of the target from its backup.
    fn restore(&self, path: &ValidatedPath, backup_path: &Path) {
        let result = self
            .backend
            .read(backup_path)
            .and_then(|original| self.backend.write(path.canonical(), &original));

        match result {
            Ok(()) => info!("Restored original content from {}", backup_path.display()),
            Err(e) => error!(
                "Rollback from {} failed, target may be inconsistent: {}",
                backup_path.display(),
                e
            ),
        }
    }
}

fn read_failed(path: &ValidatedPath, source: io::Error) -> StoreError {
    if source.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound {
            path: path.requested().to_string(),
        }
    } else {
        StoreError::ReadFailed {
            path: path.requested().to_string(),
            source,
        }
    }
}

fn backup_failed(path: &ValidatedPath, source: io::Error) -> StoreError {
    error!("Backup failed, write aborted: {}", source);
    StoreError::BackupFailed {
        path: path.requested().to_string(),
        source,
    }
}

fn write_failed(path: &ValidatedPath, source: io::Error) -> StoreError {
    StoreError::WriteFailed {
        path: path.requested().to_string(),
        source,
    }
}
