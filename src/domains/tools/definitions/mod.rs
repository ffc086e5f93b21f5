//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod read_file;
pub mod write_file;

pub use read_file::{ReadFileParams, ReadFileTool};
pub use write_file::{WriteFileParams, WriteFileTool};

use rmcp::model::{CallToolResult, Content};

use crate::domains::files::FileError;

/// Tool result for a failed file operation.
///
/// The text content is the stable client message; the structured content
/// adds the machine-readable error kind.
pub(crate) fn error_result(error: &FileError) -> CallToolResult {
    let structured = serde_json::json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });

    CallToolResult {
        content: vec![Content::text(error.to_string())],
        structured_content: Some(structured),
        is_error: Some(true),
        meta: None,
    }
}

/// Tool result for a successful file operation.
pub(crate) fn success_result<T: serde::Serialize>(summary: String, output: &T) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(summary)],
        structured_content: serde_json::to_value(output).ok(),
        is_error: Some(false),
        meta: None,
    }
}
