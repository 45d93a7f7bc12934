//! Backup ledger
//!
//! The only component that mutates both the metadata store and the archive
//! store. Every record has exactly one blob at its derived location and no
//! blob exists without a record; a create or delete may break that briefly,
//! but repairs it before returning.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::paths::{absolute, StorePaths};
use crate::display::backup::format_backup;
use crate::error::{JadeError, JadeResult};
use crate::models::{BackupId, BackupRecord};
use crate::prompt::Confirm;
use crate::storage::archive::path_exists;
use crate::storage::{ArchiveStore, MetadataStore};
use crate::tools::Archiver;

/// Coordinates records and archive blobs for one store
pub struct Ledger<'a> {
    metadata: MetadataStore,
    archives: ArchiveStore,
    archiver: &'a dyn Archiver,
}

impl<'a> Ledger<'a> {
    /// Open the ledger of an existing store
    pub fn open(paths: &StorePaths, archiver: &'a dyn Archiver) -> JadeResult<Self> {
        Ok(Self {
            metadata: MetadataStore::open(paths.database_file())?,
            archives: ArchiveStore::new(paths.clone()),
            archiver,
        })
    }

    /// Derived blob location for a backup
    pub fn archive_location(&self, id: BackupId) -> PathBuf {
        self.archives.location(id)
    }

    /// Record and archive the current contents of `source`
    ///
    /// On failure neither a record nor a blob is left for this attempt.
    pub fn create(&self, source: &Path, description: Option<&str>) -> JadeResult<BackupRecord> {
        let source = absolute(source)?;
        let record = self.metadata.insert(&source, description)?;
        debug!(id = %record.id, source = %source.display(), "inserted backup record");

        if let Err(err) = self.materialize(&record) {
            warn!(id = %record.id, error = %err, "archive creation failed, rolling back");
            self.roll_back(record.id);
            return Err(err);
        }

        info!(id = %record.id, source = %source.display(), "created backup");
        Ok(record)
    }

    fn materialize(&self, record: &BackupRecord) -> JadeResult<()> {
        if !path_exists(&record.source) {
            return Err(JadeError::FileNotFound {
                path: record.source.clone(),
            });
        }

        let status = self
            .archiver
            .create(&record.source, &self.archives.location(record.id))?;
        if !status.success() || !self.archives.exists(record.id) {
            return Err(JadeError::ArchiveCreationFailed {
                path: record.source.clone(),
                exit_code: status.code(),
            });
        }

        Ok(())
    }

    /// Undo a half-finished create: blob first, then the record
    fn roll_back(&self, id: BackupId) {
        match self.archives.remove(id) {
            Ok(removed) => debug!(id = %id, removed, "rolled back archive blob"),
            Err(e) => error!(id = %id, error = %e, "failed to remove partial archive blob"),
        }

        if let Err(e) = self.metadata.delete(id) {
            error!(id = %id, error = %e, "failed to remove record during rollback");
        }
    }

    /// Delete a record and its blob
    ///
    /// A missing blob is fine. A missing record is reported, after removing
    /// any stray blob at the derived location.
    pub fn delete(&self, id: BackupId) -> JadeResult<()> {
        let removed = self.metadata.delete(id)?;
        let blob_removed = self.archives.remove(id)?;

        if !removed {
            if blob_removed {
                warn!(id = %id, "removed orphan archive blob");
            }
            return Err(JadeError::BackupNotFound { id });
        }

        info!(id = %id, blob_removed, "deleted backup");
        Ok(())
    }

    /// Fetch a record by ID
    pub fn get(&self, id: BackupId) -> JadeResult<BackupRecord> {
        self.metadata
            .get(id)?
            .ok_or(JadeError::BackupNotFound { id })
    }

    /// Records covering `path` (all records when `None`), newest first
    pub fn list_matching(&self, path: Option<&Path>) -> JadeResult<Vec<BackupRecord>> {
        match path {
            Some(path) => self.metadata.list_matching(&absolute(path)?),
            None => self.metadata.list_all(),
        }
    }

    /// The newest record covering `path`; ties go to the highest ID
    pub fn latest_matching(&self, path: &Path) -> JadeResult<BackupRecord> {
        let target = absolute(path)?;
        self.metadata
            .list_matching(&target)?
            .into_iter()
            .next()
            .ok_or(JadeError::NoBackupsMatch { target })
    }

    /// Restore a backup by ID; see [`Ledger::restore_record`]
    pub fn restore(
        &self,
        id: BackupId,
        target: Option<&Path>,
        prompt: &mut dyn Confirm,
    ) -> JadeResult<bool> {
        let record = self.get(id)?;
        self.restore_record(&record, target, prompt)
    }

    /// Extract a backup over `target` (default: the original source) after
    /// asking for confirmation
    ///
    /// Returns `false` when the user declines; nothing is touched then.
    pub fn restore_record(
        &self,
        record: &BackupRecord,
        target: Option<&Path>,
        prompt: &mut dyn Confirm,
    ) -> JadeResult<bool> {
        let target = match target {
            Some(path) => absolute(path)?,
            None => record.source.clone(),
        };

        let message = format!(
            "Restore {} from the following backup?\n{}",
            target.display(),
            format_backup(record)
        );
        if !prompt.confirm(&message)? {
            info!(id = %record.id, "restore declined");
            return Ok(false);
        }

        let status = self
            .archiver
            .extract(&self.archives.location(record.id), &target)?;
        if !status.success() {
            return Err(JadeError::RestorationFailed {
                exit_code: status.code(),
            });
        }

        info!(id = %record.id, target = %target.display(), "restored backup");
        Ok(true)
    }

    /// Stream a backup's raw blob to `sink`
    pub fn dump<W: Write + ?Sized>(&self, id: BackupId, sink: &mut W) -> JadeResult<u64> {
        self.get(id)?;
        self.archives.stream_to(id, sink)
    }
}
