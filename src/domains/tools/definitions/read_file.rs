//! Read file tool definition.
//!
//! A tool that returns the text content of a guarded configuration file.

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
use crate::domains::files::{FileService, ReadOutcome};
#[cfg(feature = "http")]
use crate::domains::tools::ToolError;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the read file tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    /// Path to the configuration file to read.
    pub file: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Read file tool - returns the content of an allowed configuration file.
pub struct ReadFileTool;

impl ReadFileTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "read_file";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Read a text configuration file. The path must lie under an allowed root directory and carry an allowed extension.";

    /// Execute the tool logic (for STDIO/TCP transport via rmcp).
    #[instrument(skip_all, fields(file = %params.file))]
    pub fn execute(params: &ReadFileParams, service: &FileService) -> CallToolResult {
        info!("Read file tool called for: {}", params.file);

        match service.read(&params.file) {
            Ok(outcome) => {
                let summary = format!(
                    "Read {} bytes from '{}'",
                    outcome.content.len(),
                    outcome.file
                );
                success_result(summary, &outcome)
            }
            Err(e) => {
                warn!("Read file failed: {}", e);
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
        let params: ReadFileParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        info!("Read file tool (HTTP) called for: {}", params.file);

        let result = Self::execute(&params, &service);

        // Serialize the full CallToolResult to preserve structuredContent
        serde_json::to_value(&result).map_err(|e| ToolError::internal(e.to_string()))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ReadFileParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<ReadOutcome>().into()),
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
                let params: ReadFileParams =
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
