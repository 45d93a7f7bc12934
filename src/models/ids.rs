//! Strongly-typed backup identifier
//!
//! Backup IDs are assigned by the metadata store on insert. They are monotonic
//! and never reused, so an ID also names the archive blob on disk.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a backup record and its archive blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackupId(i64);

impl BackupId {
    /// Wrap a raw row ID
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

}

impl fmt::Display for BackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BackupId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl rusqlite::ToSql for BackupId {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}
