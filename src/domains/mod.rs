//! Domains module containing business logic organized by bounded contexts.
//!
//! - **files**: request parsing, error taxonomy and the guarded file service
//! - **tools**: MCP tools exposing the file service to clients

pub mod files;
pub mod tools;
