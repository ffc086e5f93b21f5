//! Timestamped sibling backups.
//!
//! A backup of `/path/app.conf` taken at 14:03:09 on 2024-05-01 is written
//! to `/path/app.conf.2024-05-01-14-03-09`. Backups accumulate; nothing here
//! removes them.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::backend::FileBackend;

/// Timestamp layout appended to backup file names (second resolution, local time).
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Upper bound on `.N` suffixes tried when backups collide within one second.
const MAX_COLLISION_SUFFIX: u32 = 1000;

/// Backup path for `target` at the given instant.
pub fn backup_path(target: &Path, at: &DateTime<Local>) -> PathBuf {
    with_suffix(target, &at.format(BACKUP_TIMESTAMP_FORMAT).to_string())
}

/// Persist `contents` as a new backup of `target` and return its path.
///
/// An existing backup is never overwritten: when the timestamped name is
/// already taken, `.1`, `.2`, ... is appended until a free name is found.
pub fn create_backup(
    backend: &dyn FileBackend,
    target: &Path,
    contents: &[u8],
    at: &DateTime<Local>,
) -> io::Result<PathBuf> {
    let base = backup_path(target, at);

    match backend.create_new(&base, contents) {
        Ok(()) => return Ok(base),
        Err(e) if e.kind() != io::ErrorKind::AlreadyExists => return Err(e),
        Err(_) => {}
    }

    for n in 1..=MAX_COLLISION_SUFFIX {
        let candidate = with_suffix(&base, &n.to_string());
        match backend.create_new(&candidate, contents) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free backup name for {}", target.display()),
    ))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
