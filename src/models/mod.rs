//! Core data models for jade
//!
//! A backup is a metadata record plus exactly one archive blob named by the
//! record's ID.

pub mod backup;
pub mod ids;

pub use backup::{BackupRecord, TIMESTAMP_FORMAT};
pub use ids::BackupId;
