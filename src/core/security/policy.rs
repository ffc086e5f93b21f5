//! Immutable access policy shared by the path guard and the file store.

use std::path::{Path, PathBuf};
use tracing::warn;

use super::path_guard::resolve_canonical;
use crate::core::config::PolicyConfig;

/// Process-wide access policy.
///
/// Built once at startup from [`PolicyConfig`] and never mutated afterwards.
/// Wrap it in an `Arc` to share it between request handlers.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    special_suffix: Option<String>,
    max_file_size: u64,
    create_backups: bool,
}

impl AccessPolicy {
    /// Create a policy from explicit values.
    ///
    /// Roots are made absolute and resolved to canonical form so that
    /// containment checks compare like with like. Extensions are normalised
    /// to carry a leading dot.
    pub fn new<P, E>(
        roots: impl IntoIterator<Item = P>,
        extensions: impl IntoIterator<Item = E>,
        special_suffix: Option<String>,
        max_file_size: u64,
        create_backups: bool,
    ) -> Self
    where
        P: AsRef<Path>,
        E: AsRef<str>,
    {
        let roots = roots
            .into_iter()
            .filter_map(|root| canonical_root(root.as_ref()))
            .collect();

        let extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| ext.len() > 1)
            .collect();

        let special_suffix = special_suffix.filter(|s| !s.is_empty());

        Self {
            roots,
            extensions,
            special_suffix,
            max_file_size,
            create_backups,
        }
    }

    /// Build the policy from the loaded configuration.
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(
            &config.allowed_paths,
            &config.allowed_extensions,
            config.special_suffix.clone(),
            config.max_file_size,
            config.create_backups,
        )
    }

    /// Canonical allowed root directories.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Allowed extensions, each with a leading dot.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// The compound full-name suffix accepted regardless of extension.
    pub fn special_suffix(&self) -> Option<&str> {
        self.special_suffix.as_deref()
    }

    /// Maximum content size in bytes, for both reads and writes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Whether existing files are backed up before being overwritten.
    pub fn create_backups(&self) -> bool {
        self.create_backups
    }

    /// Whether a canonical path equals or is nested under an allowed root.
    ///
    /// `Path::starts_with` compares whole components, so a root of
    /// `/var/media/ftp` never matches `/var/media/ftp-evil`.
    pub fn contains(&self, canonical: &Path) -> bool {
        self.roots.iter().any(|root| canonical.starts_with(root))
    }

    /// Whether the file name carries an allowed extension or the special suffix.
    pub fn allows_file_name(&self, file_name: &str) -> bool {
        if let Some(suffix) = &self.special_suffix {
            if file_name.ends_with(suffix.as_str()) {
                return true;
            }
        }

        match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|allowed| &allowed[1..] == ext),
            None => false,
        }
    }
}

fn canonical_root(root: &Path) -> Option<PathBuf> {
    if !root.is_absolute() {
        warn!("Ignoring relative allowed root {:?}", root);
        return None;
    }

    match resolve_canonical(root) {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            warn!("Cannot resolve allowed root {:?}: {}", root, e);
            Some(root.to_path_buf())
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}
