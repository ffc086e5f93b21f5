// Security module for path validation and access control
//
// This module decides whether a requested configuration file may be read or
// written: it confines paths to the configured root directories, rejects
// traversal attempts and enforces the file type whitelist.

pub mod path_guard;
pub mod policy;

pub use path_guard::{GuardError, ValidatedPath, resolve_canonical, validate};
pub use policy::AccessPolicy;
