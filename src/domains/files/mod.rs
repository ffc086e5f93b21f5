//! Files domain module.
//!
//! This module turns raw client requests into guarded reads and writes:
//!
//! - `request.rs` - Parsing of `action` / `file` / `content` parameters
//! - `service.rs` - `FileService`, composing the path guard and the safe store
//! - `error.rs` - The error taxonomy shared by every transport

mod error;
mod request;
mod service;

pub use error::{ErrorKind, FileError};
pub use request::{FileAction, FileRequest, RequestError};
pub use service::{FileOutcome, FileService, ReadOutcome, WriteOutcome};
