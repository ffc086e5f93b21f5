//! Parsing of inbound file requests.
//!
//! Transports hand over the raw `action`, `file` and `content` parameters;
//! anything missing or unknown is rejected here, before the guard or the
//! store are involved.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Malformed request errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Missing action parameter")]
    MissingAction,

    #[error("Missing file parameter")]
    MissingFile,

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

/// Operation requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    ReadFile,
    WriteFile,
}

impl FileAction {
    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadFile => "read_file",
            Self::WriteFile => "write_file",
        }
    }
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileAction {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read_file" => Ok(Self::ReadFile),
            "write_file" => Ok(Self::WriteFile),
            other => Err(RequestError::UnknownAction(other.to_string())),
        }
    }
}

/// A parsed, well-formed file request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRequest {
    Read { file: String },
    Write { file: String, content: String },
}

impl FileRequest {
    /// Build a request from raw parameters.
    ///
    /// Empty values count as missing. An omitted `content` on a write means
    /// an empty file.
    pub fn from_params(
        action: Option<&str>,
        file: Option<&str>,
        content: Option<&str>,
    ) -> Result<Self, RequestError> {
        let action: FileAction = action
            .filter(|a| !a.is_empty())
            .ok_or(RequestError::MissingAction)?
            .parse()?;

        let file = file
            .filter(|f| !f.is_empty())
            .ok_or(RequestError::MissingFile)?
            .to_string();

        Ok(match action {
            FileAction::ReadFile => Self::Read { file },
            FileAction::WriteFile => Self::Write {
                file,
                content: content.unwrap_or_default().to_string(),
            },
        })
    }

    /// The action this request performs.
    pub fn action(&self) -> FileAction {
        match self {
            Self::Read { .. } => FileAction::ReadFile,
            Self::Write { .. } => FileAction::WriteFile,
        }
    }

    /// The requested file path, as given by the client.
    pub fn file(&self) -> &str {
        match self {
            Self::Read { file } | Self::Write { file, .. } => file,
        }
    }
}
