//! Filesystem backend used by the safe file store.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Blocking filesystem operations needed by [`SafeFileStore`](super::SafeFileStore).
///
/// The store never touches `std::fs` directly, so a backend can be swapped
/// in to simulate failures of individual steps.
pub trait FileBackend: Send + Sync {
    /// Length in bytes of the file at `path`, or `None` if nothing exists there.
    ///
    /// Anything other than a regular file (after following symlinks) is an error.
    fn file_len(&self, path: &Path) -> io::Result<Option<u64>>;

    /// Read the whole file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the contents of `path`, creating it if needed.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Create `path` with `contents`, failing with `AlreadyExists` if it is taken.
    fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Create a directory and all of its missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Delete a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileBackend for LocalFs {
    fn file_len(&self, path: &Path) -> io::Result<Option<u64>> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(meta) if meta.is_dir() => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                "is a directory",
            )),
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
