//! Service layer for jade
//!
//! The service layer is the public API of the library: every CLI command
//! goes through [`BackupService`], which keeps the record/blob invariant and
//! owns the injected tools.

pub mod backup;

pub use backup::{BackupHandle, BackupService};
