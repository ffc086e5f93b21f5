//! Configuration management for the config editor server.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables (and an optional `.env` file) on top of defaults.
//! Configuration is read once at startup and never re-read per request.

use super::error::Result;
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default maximum file size (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default compound file-name suffix accepted regardless of extension.
pub const DEFAULT_SPECIAL_SUFFIX: &str = ".rtorrent.rc";

/// Main configuration structure for the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// File access policy configuration.
    pub policy: PolicyConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Raw access policy settings, turned into an
/// [`AccessPolicy`](crate::core::security::AccessPolicy) at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Directory created at startup to hold the editors' configuration files.
    pub base_dir: PathBuf,

    /// Absolute directories under which files may be read and written.
    pub allowed_paths: Vec<PathBuf>,

    /// Allowed file extensions (e.g. ".conf").
    pub allowed_extensions: Vec<String>,

    /// Full-name suffix accepted regardless of extension.
    pub special_suffix: Option<String>,

    /// Maximum file/content size in bytes.
    pub max_file_size: u64,

    /// Back up existing files before overwriting them.
    pub create_backups: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let base_dir = home_dir().join("rtorrent");

        Self {
            allowed_paths: vec![
                PathBuf::from("/var/media/ftp"),
                base_dir.clone(),
                PathBuf::from("/tmp"),
            ],
            base_dir,
            allowed_extensions: [".rc", ".php", ".ini", ".conf", ".template"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            special_suffix: Some(DEFAULT_SPECIAL_SUFFIX.to_string()),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            create_backups: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "conf-editor-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `CONF_`.
    /// For example: `CONF_ALLOWED_PATHS`, `CONF_LOG_LEVEL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("CONF_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("CONF_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();
        config.policy = PolicyConfig::from_env();

        config
    }
}

impl PolicyConfig {
    /// Load policy settings from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut policy = Self::default();

        if let Ok(base_dir) = std::env::var("CONF_BASE_DIR") {
            policy.base_dir = PathBuf::from(base_dir);
        }

        if let Ok(paths) = std::env::var("CONF_ALLOWED_PATHS") {
            policy.allowed_paths = split_list(&paths).map(PathBuf::from).collect();
            info!("Allowed paths: {:?}", policy.allowed_paths);
        }

        if let Ok(extensions) = std::env::var("CONF_ALLOWED_EXTENSIONS") {
            policy.allowed_extensions = split_list(&extensions).map(String::from).collect();
            info!("Allowed extensions: {:?}", policy.allowed_extensions);
        }

        if let Ok(suffix) = std::env::var("CONF_SPECIAL_SUFFIX") {
            let suffix = suffix.trim();
            policy.special_suffix = (!suffix.is_empty()).then(|| suffix.to_string());
        }

        if let Ok(size) = std::env::var("CONF_MAX_FILE_SIZE") {
            match size.trim().parse() {
                Ok(size) => policy.max_file_size = size,
                Err(_) => warn!(
                    "Invalid CONF_MAX_FILE_SIZE '{}', using {} bytes",
                    size, policy.max_file_size
                ),
            }
        }

        if let Ok(backups) = std::env::var("CONF_CREATE_BACKUPS") {
            match parse_bool(&backups) {
                Some(flag) => policy.create_backups = flag,
                None => warn!(
                    "Invalid CONF_CREATE_BACKUPS '{}', backups stay {}",
                    backups, policy.create_backups
                ),
            }
        }

        if !policy.create_backups {
            warn!("Backups disabled - overwritten files cannot be recovered");
        }

        policy
    }

    /// Create the base directory (and parents) if it does not exist yet.
    pub fn ensure_base_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        info!("Base directory ready: {:?}", self.base_dir);
        Ok(())
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/root"))
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
