//! Server handler and lifecycle management.
//!
//! The server owns the immutable access policy and the file service built
//! from it, and exposes them to every transport:
//! - STDIO/TCP: through the rmcp `ServerHandler` and its tool router
//! - HTTP: through `call_tool()` for JSON-RPC and `files()` for the legacy
//!   editor endpoint

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::{info, warn};

use super::config::Config;
use super::error::Error;
use super::security::AccessPolicy;
use crate::domains::{files::FileService, tools::build_tool_router};

#[cfg(feature = "http")]
use crate::domains::tools::{ToolError, ToolRegistry};

const INSTRUCTIONS: &str = "Reads and writes text configuration files under the configured \
     root directories. Use read_file to fetch a file and write_file to replace it; \
     overwritten files are backed up next to the original.";

/// The main server handler.
///
/// Implements the rmcp `ServerHandler` trait and hands file operations to
/// the shared [`FileService`].
#[derive(Clone)]
pub struct ConfEditorServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Guarded file operations shared by all transports.
    files: Arc<FileService>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl ConfEditorServer {
    /// Create a new server with the given configuration.
    ///
    /// Builds the access policy once; fails if none of the configured roots
    /// is usable, since every request would then be denied.
    pub fn new(config: Config) -> super::error::Result<Self> {
        let policy = AccessPolicy::from_config(&config.policy);
        if policy.roots().is_empty() {
            return Err(Error::config(
                "no usable allowed root directories (roots must be absolute paths)",
            ));
        }
        if policy.extensions().is_empty() && policy.special_suffix().is_none() {
            warn!("No allowed extensions configured - every file will be rejected");
        }

        info!(
            "Access policy: roots={:?} extensions={:?} special_suffix={:?} max_file_size={} backups={}",
            policy.roots(),
            policy.extensions(),
            policy.special_suffix(),
            policy.max_file_size(),
            policy.create_backups()
        );

        Ok(Self::with_service(config, FileService::new(Arc::new(policy))))
    }

    /// Create a server around an existing file service.
    pub fn with_service(config: Config, files: FileService) -> Self {
        let files = Arc::new(files);
        Self {
            tool_router: build_tool_router::<Self>(files.clone()),
            config: Arc::new(config),
            files,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// The shared file service.
    pub fn files(&self) -> &Arc<FileService> {
        &self.files
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError> {
        let registry = ToolRegistry::new(self.files.clone());
        registry.call_tool(name, arguments)
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for ConfEditorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config_for(root: PathBuf) -> Config {
        let mut config = Config::default();
        config.policy.allowed_paths = vec![root];
        config
    }

    #[test]
    fn test_server_lists_file_tools() {
        let temp_dir = TempDir::new().unwrap();
        let server = ConfEditorServer::new(config_for(temp_dir.path().to_path_buf())).unwrap();

        let names: Vec<String> = server
            .list_tools()
            .iter()
            .filter_map(|t| t["name"].as_str().map(String::from))
            .collect();
        assert!(names.contains(&"read_file".to_string()));
        assert!(names.contains(&"write_file".to_string()));
    }

    #[test]
    fn test_server_rejects_config_without_roots() {
        let mut config = Config::default();
        config.policy.allowed_paths = vec![PathBuf::from("relative/only")];

        assert!(matches!(
            ConfEditorServer::new(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_server_exposes_policy() {
        let temp_dir = TempDir::new().unwrap();
        let server = ConfEditorServer::new(config_for(temp_dir.path().to_path_buf())).unwrap();

        assert_eq!(
            server.files().policy().roots(),
            &[temp_dir.path().canonicalize().unwrap()]
        );
        assert!(server.get_info().capabilities.tools.is_some());
    }
}
