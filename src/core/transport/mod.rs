//! Transport layer for the server.
//!
//! This module provides different transport implementations:
//! - **STDIO**: MCP over standard input/output - feature: `stdio`
//! - **TCP**: MCP over raw TCP sockets - feature: `tcp`
//! - **HTTP**: legacy editor endpoint plus JSON-RPC over POST - feature: `http`
//!
//! Every transport shares the same [`FileService`](crate::domains::files::FileService)
//! and therefore the same access policy.
//!
//! # Feature Flags
//!
//! - `stdio` (default): STDIO transport - minimal dependencies
//! - `tcp`: TCP transport - adds tokio/net
//! - `http` (default): HTTP transport - adds axum, tower, tower-http

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub mod legacy;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

// Re-export configs for convenience
#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
