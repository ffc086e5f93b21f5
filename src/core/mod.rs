//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks of the server:
//! configuration, error handling, the path guard, the safe file store,
//! the MCP server handler and the transport layer.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod store;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use security::{AccessPolicy, GuardError, ValidatedPath, validate};
pub use server::ConfEditorServer;
pub use store::SafeFileStore;
pub use transport::{TransportConfig, TransportService};
