//! Backup record model
//!
//! One row of the `backups` table: when a path was archived, which path, and
//! an optional free-form description.

use chrono::NaiveDateTime;
use std::path::PathBuf;

use super::ids::BackupId;

/// Format SQLite's `datetime('now', 'localtime')` produces
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metadata describing one backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Store-assigned identifier
    pub id: BackupId,

    /// Local creation time, assigned by the metadata store
    pub timestamp: String,

    /// Absolute path that was archived
    pub source: PathBuf,

    /// Optional user description
    pub description: Option<String>,
}

impl BackupRecord {
    /// Parse the stored timestamp, if it is in the standard format
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }

    /// Description text, empty when none was given
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}
