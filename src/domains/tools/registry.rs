//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - The names of all available tools
//! - HTTP dispatch for tool calls (when http feature is enabled)

#[cfg(feature = "http")]
use std::sync::Arc;
#[cfg(feature = "http")]
use tracing::warn;

#[cfg(feature = "http")]
use super::ToolError;
use super::definitions::{ReadFileTool, WriteFileTool};
#[cfg(feature = "http")]
use crate::domains::files::FileService;

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    #[cfg(feature = "http")]
    service: Arc<FileService>,
}

impl ToolRegistry {
    /// Create a new tool registry dispatching to `service`.
    #[cfg(feature = "http")]
    pub fn new(service: Arc<FileService>) -> Self {
        Self { service }
    }

    /// Get all tool names.
    pub fn tool_names() -> Vec<&'static str> {
        vec![ReadFileTool::NAME, WriteFileTool::NAME]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    #[cfg(feature = "http")]
    pub fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        match name {
            ReadFileTool::NAME => ReadFileTool::http_handler(arguments, self.service.clone()),
            WriteFileTool::NAME => WriteFileTool::http_handler(arguments, self.service.clone()),
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_tool_names() {
        assert_eq!(ToolRegistry::tool_names(), vec!["read_file", "write_file"]);
    }

    #[cfg(feature = "http")]
    fn test_service() -> Arc<FileService> {
        use crate::core::security::AccessPolicy;

        Arc::new(FileService::new(Arc::new(AccessPolicy::new(
            ["/tmp"],
            [".conf"],
            None,
            1024,
            true,
        ))))
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_registry_call_denied_path_is_tool_result() {
        let registry = ToolRegistry::new(test_service());
        let result = registry
            .call_tool("read_file", serde_json::json!({ "file": "/etc/app.conf" }))
            .unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["kind"], "access_denied");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_registry_call_unknown() {
        let registry = ToolRegistry::new(test_service());
        let result = registry.call_tool("delete_file", serde_json::json!({}));
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }
}
