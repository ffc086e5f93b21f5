//! Write file tool definition.
//!
//! A tool that replaces the content of a guarded configuration file,
//! backing up the previous version first.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{error_result, success_result};
use crate::domains::files::{FileService, WriteOutcome};
#[cfg(feature = "http")]
use crate::domains::tools::ToolError;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the write file tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    /// Path to the configuration file to write.
    pub file: String,

    /// New content of the file. Omitted means an empty file.
    #[serde(default)]
    pub content: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Write file tool - replaces a configuration file with backup and rollback.
pub struct WriteFileTool;

impl WriteFileTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "write_file";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Write a text configuration file, creating missing parent directories. \
         An existing file is backed up to '<file>.<YYYY-MM-DD-HH-MM-SS>' first and restored if the write fails.";

    /// Execute the tool logic (for STDIO/TCP transport via rmcp).
    #[instrument(skip_all, fields(file = %params.file, size = params.content.len()))]
    pub fn execute(params: &WriteFileParams, service: &FileService) -> CallToolResult {
        info!("Write file tool called for: {}", params.file);

        match service.write(&params.file, &params.content) {
            Ok(outcome) => {
                let summary = match &outcome.backup {
                    Some(backup) => format!(
                        "Wrote {} bytes to '{}' (previous version saved as '{}')",
                        params.content.len(),
                        outcome.file,
                        backup
                    ),
                    None => format!(
                        "Wrote {} bytes to '{}'",
                        params.content.len(),
                        outcome.file
                    ),
                };
                success_result(summary, &outcome)
            }
            Err(e) => {
                warn!("Write file failed: {}", e);
                error_result(&e)
            }
        }
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn http_handler(
        arguments: serde_json::Value,
        service: Arc<FileService>,
    ) -> Result<serde_json::Value, ToolError> {
        let params: WriteFileParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!("Write file tool (HTTP) called for: {}", params.file);

        let result = Self::execute(&params, &service);

        serde_json::to_value(&result).map_err(|e| ToolError::internal(e.to_string()))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<WriteFileParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<WriteOutcome>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    pub fn create_route<S>(service: Arc<FileService>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let service = service.clone();
            async move {
                let params: WriteFileParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                // File I/O is blocking; keep it off the async workers
                tokio::task::spawn_blocking(move || Self::execute(&params, &service))
                    .await
                    .map_err(|e| McpError::internal_error(e.to_string(), None))
            }
            .boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::security::AccessPolicy;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn service_for(root: &Path) -> FileService {
        FileService::new(Arc::new(AccessPolicy::new(
            [root],
            [".conf"],
            None,
            16,
            true,
        )))
    }

    #[test]
    fn test_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("sub/app.conf");
        let params = WriteFileParams {
            file: file.to_string_lossy().to_string(),
            content: "a = 1".to_string(),
        };

        let result = WriteFileTool::execute(&params, &service_for(temp_dir.path()));

        assert_eq!(result.is_error, Some(false));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["written"], true);
        assert!(structured.get("backup").is_none());
        assert_eq!(fs::read_to_string(&file).unwrap(), "a = 1");
    }

    #[test]
    fn test_overwrite_reports_backup() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("app.conf");
        fs::write(&file, "before").unwrap();
        let params = WriteFileParams {
            file: file.to_string_lossy().to_string(),
            content: "after".to_string(),
        };

        let result = WriteFileTool::execute(&params, &service_for(temp_dir.path()));

        let structured = result.structured_content.unwrap();
        let backup = structured["backup"].as_str().unwrap();
        assert!(backup.starts_with("app.conf."));
        assert_eq!(
            fs::read_to_string(temp_dir.path().join(backup)).unwrap(),
            "before"
        );
    }

    #[test]
    fn test_content_too_large_is_error_result() {
        let temp_dir = TempDir::new().unwrap();
        let params = WriteFileParams {
            file: temp_dir
                .path()
                .join("app.conf")
                .to_string_lossy()
                .to_string(),
            content: "x".repeat(17),
        };

        let result = WriteFileTool::execute(&params, &service_for(temp_dir.path()));

        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.structured_content.unwrap()["kind"], "too_large");
    }

    #[test]
    fn test_missing_content_defaults_to_empty() {
        let params: WriteFileParams =
            serde_json::from_value(serde_json::json!({ "file": "/tmp/a.conf" })).unwrap();
        assert_eq!(params.content, "");
    }
}
