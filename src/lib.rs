//! Configuration editor server.
//!
//! Backend for the rtorrent and ruTorrent configuration editors: reads and
//! writes text configuration files, but only under whitelisted root
//! directories and only for whitelisted file types. Every overwrite is
//! preceded by a timestamped backup and rolled back if the write fails.
//!
//! # Architecture
//!
//! - **core**: configuration, errors, the path guard (`security`), the safe
//!   file store (`store`), the MCP server handler and the transports
//! - **domains**: business logic organized by bounded contexts
//!   - **files**: request parsing, error taxonomy and the `FileService`
//!   - **tools**: the `read_file` and `write_file` MCP tools
//!
//! # Example
//!
//! ```rust,no_run
//! use conf_editor_server::core::{Config, ConfEditorServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = ConfEditorServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{ConfEditorServer, Config, Error, Result};
