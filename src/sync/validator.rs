//! Store validation
//!
//! A store is valid when the set of blob locations on disk equals the set of
//! locations derived from the record IDs in the metadata store. Validation is
//! read-only and total: any directory tree yields a report, never an error.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::config::paths::StorePaths;
use crate::storage::{ArchiveStore, MetadataStore};

/// Outcome of inspecting a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Whether the archive directory exists
    pub has_archive_dir: bool,
    /// Whether the record IDs could be read from the metadata store
    pub metadata_readable: bool,
    /// Expected blob locations with nothing on disk
    pub missing: BTreeSet<PathBuf>,
    /// On-disk entries no record accounts for
    pub orphans: BTreeSet<PathBuf>,
}

impl ValidationReport {
    /// Check if both substrates agree exactly
    pub fn is_valid(&self) -> bool {
        self.has_archive_dir
            && self.metadata_readable
            && self.missing.is_empty()
            && self.orphans.is_empty()
    }

    /// Get a one-line summary of the problems found
    pub fn summary(&self) -> String {
        if !self.has_archive_dir {
            return "archive directory is missing".to_string();
        }
        if !self.metadata_readable {
            return "metadata store cannot be read".to_string();
        }
        if self.is_valid() {
            return "store is consistent".to_string();
        }

        let mut problems = Vec::new();
        if !self.missing.is_empty() {
            problems.push(format!("{} missing archive(s)", self.missing.len()));
        }
        if !self.orphans.is_empty() {
            problems.push(format!("{} orphan archive(s)", self.orphans.len()));
        }
        problems.join(", ")
    }
}

/// Inspect a store without modifying it
pub fn inspect(paths: &StorePaths) -> ValidationReport {
    let mut report = ValidationReport::default();

    let archives = ArchiveStore::new(paths.clone());
    if !archives.dir().is_dir() {
        return report;
    }
    report.has_archive_dir = true;

    let on_disk = match archives.entries() {
        Ok(entries) => entries,
        Err(e) => {
            debug!(error = %e, "cannot enumerate archives");
            report.has_archive_dir = false;
            return report;
        }
    };

    let ids = match MetadataStore::open_read_only(paths.database_file())
        .and_then(|metadata| metadata.all_ids())
    {
        Ok(ids) => ids,
        Err(e) => {
            debug!(error = %e, "cannot read record ids");
            return report;
        }
    };
    report.metadata_readable = true;

    let expected: BTreeSet<PathBuf> = ids
        .into_iter()
        .map(|id| paths.archive_location(id))
        .collect();

    report.missing = expected.difference(&on_disk).cloned().collect();
    report.orphans = on_disk.difference(&expected).cloned().collect();
    report
}

/// Whether the store at `paths` is consistent
pub fn check(paths: &StorePaths) -> bool {
    let report = inspect(paths);
    debug!(root = %paths.root().display(), summary = %report.summary(), "validated store");
    report.is_valid()
}
