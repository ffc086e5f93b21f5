//! Error types and handling for the server.
//!
//! This module defines the crate-wide error type. Request-level failures of
//! file operations are values of [`FileError`](crate::domains::files::FileError)
//! and are answered to the client; this type covers everything that can stop
//! the server itself.

use thiserror::Error;

/// A specialized Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the transport layer.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from startup tasks.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::config("no roots").to_string(),
            "Configuration error: no roots"
        );

        let io: Error = std::io::Error::other("disk gone").into();
        assert_eq!(io.to_string(), "I/O error: disk gone");
    }
}
