//! Safe file store.
//!
//! Reads and writes configuration files at paths already accepted by the
//! path guard. Writes over an existing file are preceded by a timestamped
//! sibling backup and rolled back from it if the write fails.

mod backend;
pub mod backup;
mod error;
mod safe_store;

pub use backend::{FileBackend, LocalFs};
pub use error::{StoreError, StoreResult};
pub use safe_store::{SafeFileStore, WriteReceipt};
