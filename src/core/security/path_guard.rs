use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::policy::AccessPolicy;

/// Errors that can occur during path validation.
///
/// Messages are stable and never embed filesystem error text, since they
/// describe security decisions.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("Directory traversal not allowed")]
    TraversalRejected { path: String },

    #[error("Access denied: {path}")]
    AccessDenied { path: String },

    #[error("Invalid file type: {path}")]
    InvalidFileType { path: String },
}

/// A path accepted by [`validate`].
///
/// Carries both the path as the caller wrote it (for messages) and the
/// canonical location the store operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPath {
    requested: String,
    canonical: PathBuf,
}

impl ValidatedPath {
    /// The path string exactly as it was requested.
    pub fn requested(&self) -> &str {
        &self.requested
    }

    /// The canonical, symlink-free location.
    pub fn canonical(&self) -> &Path {
        &self.canonical
    }
}

impl fmt::Display for ValidatedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical.display())
    }
}

/// Validates a requested path against the access policy.
///
/// Checks run in a fixed order:
/// 1. The raw string must not contain `..` anywhere (before any resolution)
/// 2. The canonical path must be equal to or nested under an allowed root
/// 3. The file name must carry an allowed extension or the special suffix
///
/// The target file does not need to exist; see [`resolve_canonical`].
pub fn validate(requested: &str, policy: &AccessPolicy) -> Result<ValidatedPath, GuardError> {
    if requested.contains("..") {
        warn!("Rejected traversal attempt: {}", requested);
        return Err(GuardError::TraversalRejected {
            path: requested.to_string(),
        });
    }

    let canonical = match resolve_canonical(Path::new(requested)) {
        Ok(p) => p,
        Err(e) => {
            warn!("Cannot resolve '{}': {}", requested, e);
            return Err(GuardError::AccessDenied {
                path: requested.to_string(),
            });
        }
    };

    if !policy.contains(&canonical) {
        warn!("Path outside allowed roots: {} -> {:?}", requested, canonical);
        return Err(GuardError::AccessDenied {
            path: requested.to_string(),
        });
    }

    let allowed_name = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| policy.allows_file_name(name));

    if !allowed_name {
        warn!("Disallowed file type: {}", requested);
        return Err(GuardError::InvalidFileType {
            path: requested.to_string(),
        });
    }

    debug!("Validated '{}' as {:?}", requested, canonical);

    Ok(ValidatedPath {
        requested: requested.to_string(),
        canonical,
    })
}

/// Resolves a path to an absolute, symlink-free form.
///
/// Existing paths are canonicalized directly. For a path that does not exist
/// yet (a file about to be created), the deepest existing ancestor is
/// canonicalized and the remaining components are appended. A dangling
/// symlink anywhere on the path is an error rather than a missing entry,
/// because writing through it would land wherever it points.
pub fn resolve_canonical(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();

    loop {
        match existing.symlink_metadata() {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    for name in tail.iter().rev() {
        resolved.push(name);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn policy_for(root: &Path) -> AccessPolicy {
        AccessPolicy::new(
            [root],
            [".conf", ".rc"],
            Some(".rtorrent.rc".to_string()),
            1024,
            true,
        )
    }

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_existing_file_within_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("app.conf");
        fs::write(&file, "x").unwrap();

        let policy = policy_for(temp_dir.path());
        let validated = validate(&path_str(&file), &policy).unwrap();

        assert_eq!(validated.canonical(), file.canonicalize().unwrap());
        assert_eq!(validated.requested(), path_str(&file));
    }

    #[test]
    fn test_missing_file_within_root_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("nested/dir/new.conf");

        let policy = policy_for(temp_dir.path());
        let validated = validate(&path_str(&file), &policy).unwrap();

        let expected = temp_dir
            .path()
            .canonicalize()
            .unwrap()
            .join("nested/dir/new.conf");
        assert_eq!(validated.canonical(), expected);
    }

    #[test]
    fn test_traversal_rejected_even_inside_root() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(temp_dir.path().join("app.conf"), "x").unwrap();

        let policy = policy_for(temp_dir.path());
        let requested = format!("{}/../app.conf", path_str(&sub));

        assert!(matches!(
            validate(&requested, &policy),
            Err(GuardError::TraversalRejected { .. })
        ));
    }

    #[test]
    fn test_double_dot_in_file_name_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("notes..bak.conf");

        let policy = policy_for(temp_dir.path());
        assert!(matches!(
            validate(&path_str(&file), &policy),
            Err(GuardError::TraversalRejected { .. })
        ));
    }

    #[test]
    fn test_outside_root_denied() {
        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let file = outside_dir.path().join("app.conf");
        fs::write(&file, "x").unwrap();

        let policy = policy_for(root_dir.path());
        assert!(matches!(
            validate(&path_str(&file), &policy),
            Err(GuardError::AccessDenied { .. })
        ));
    }

    #[test]
    fn test_sibling_prefix_denied() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ftp");
        let evil = temp_dir.path().join("ftp-evil");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&evil).unwrap();

        let policy = policy_for(&root);
        let requested = path_str(&evil.join("app.conf"));

        assert!(matches!(
            validate(&requested, &policy),
            Err(GuardError::AccessDenied { .. })
        ));
    }

    #[test]
    fn test_invalid_extension_inside_root() {
        let temp_dir = TempDir::new().unwrap();
        let policy = policy_for(temp_dir.path());
        let requested = path_str(&temp_dir.path().join("app.exe"));

        assert!(matches!(
            validate(&requested, &policy),
            Err(GuardError::InvalidFileType { .. })
        ));
    }

    #[test]
    fn test_special_suffix_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let policy = AccessPolicy::new(
            [temp_dir.path()],
            [".conf"],
            Some(".rtorrent.rc".to_string()),
            1024,
            true,
        );

        let requested = path_str(&temp_dir.path().join(".rtorrent.rc"));
        assert!(validate(&requested, &policy).is_ok());

        let other = path_str(&temp_dir.path().join("plain.rc"));
        assert!(matches!(
            validate(&other, &policy),
            Err(GuardError::InvalidFileType { .. })
        ));
    }

    #[test]
    fn test_root_itself_has_no_valid_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let policy = policy_for(temp_dir.path());

        assert!(matches!(
            validate(&path_str(temp_dir.path()), &policy),
            Err(GuardError::InvalidFileType { .. })
        ));
    }

    #[test]
    fn test_scenario_with_tmp_root() {
        let policy = AccessPolicy::new(["/tmp"], [".conf"], None, 1024, true);

        assert!(validate("/tmp/app.conf", &policy).is_ok());
        assert!(matches!(
            validate("/tmp/../etc/passwd", &policy),
            Err(GuardError::TraversalRejected { .. })
        ));
        assert!(matches!(
            validate("/tmp/app.exe", &policy),
            Err(GuardError::InvalidFileType { .. })
        ));
        assert!(matches!(
            validate("/etc/app.conf", &policy),
            Err(GuardError::AccessDenied { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_within_root() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let target_file = temp_dir.path().join("target.conf");
        let link_file = temp_dir.path().join("link.conf");
        fs::write(&target_file, "x").unwrap();
        symlink(&target_file, &link_file).unwrap();

        let policy = policy_for(temp_dir.path());
        let validated = validate(&path_str(&link_file), &policy).unwrap();

        assert_eq!(validated.canonical(), target_file.canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escaping_root_denied() {
        use std::os::unix::fs::symlink;

        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let target_file = outside_dir.path().join("target.conf");
        let link_file = root_dir.path().join("link.conf");
        fs::write(&target_file, "x").unwrap();
        symlink(&target_file, &link_file).unwrap();

        let policy = policy_for(root_dir.path());
        assert!(matches!(
            validate(&path_str(&link_file), &policy),
            Err(GuardError::AccessDenied { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_escaping_root_denied() {
        use std::os::unix::fs::symlink;

        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let link_dir = root_dir.path().join("escape");
        symlink(outside_dir.path(), &link_dir).unwrap();

        let policy = policy_for(root_dir.path());
        let requested = path_str(&link_dir.join("new.conf"));

        assert!(matches!(
            validate(&requested, &policy),
            Err(GuardError::AccessDenied { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_denied() {
        use std::os::unix::fs::symlink;

        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let link_file = root_dir.path().join("dangling.conf");
        symlink(outside_dir.path().join("missing.conf"), &link_file).unwrap();

        let policy = policy_for(root_dir.path());
        assert!(matches!(
            validate(&path_str(&link_file), &policy),
            Err(GuardError::AccessDenied { .. })
        ));
    }

    #[test]
    fn test_guard_messages_are_stable() {
        let err = GuardError::AccessDenied {
            path: "/etc/app.conf".to_string(),
        };
        assert_eq!(err.to_string(), "Access denied: /etc/app.conf");

        let err = GuardError::TraversalRejected {
            path: "/tmp/../x".to_string(),
        };
        assert_eq!(err.to_string(), "Directory traversal not allowed");
    }
}
