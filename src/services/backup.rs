//! Backup service
//!
//! The public API behind every command: composes the ledger and the sync
//! engine for one store, with the archiving and mirroring tools injected.

use std::cell::OnceCell;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::backup::Ledger;
use crate::config::paths::StorePaths;
use crate::config::settings::Config;
use crate::error::{JadeError, JadeResult};
use crate::models::{BackupId, BackupRecord};
use crate::prompt::Confirm;
use crate::storage::archive::path_exists;
use crate::storage::create_store;
use crate::sync::{SyncEngine, ValidationReport};
use crate::tools::{Archiver, Mirror, RsyncMirror, TarArchiver};

/// A record plus a lazily fetched listing of its archive members
///
/// The listing is computed at most once per handle and never persisted.
pub struct BackupHandle<'a> {
    record: BackupRecord,
    archive: PathBuf,
    archiver: &'a dyn Archiver,
    contents: OnceCell<Vec<String>>,
}

impl<'a> BackupHandle<'a> {
    fn new(record: BackupRecord, archive: PathBuf, archiver: &'a dyn Archiver) -> Self {
        Self {
            record,
            archive,
            archiver,
            contents: OnceCell::new(),
        }
    }

    pub fn id(&self) -> BackupId {
        self.record.id
    }

    pub fn record(&self) -> &BackupRecord {
        &self.record
    }

    /// Member paths of the archive, in archive order
    pub fn contents(&self) -> JadeResult<&[String]> {
        if let Some(contents) = self.contents.get() {
            return Ok(contents.as_slice());
        }
        let listed = self.archiver.list(&self.archive)?;
        Ok(self.contents.get_or_init(|| listed).as_slice())
    }
}

impl fmt::Debug for BackupHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupHandle")
            .field("record", &self.record)
            .field("archive", &self.archive)
            .field("contents", &self.contents.get())
            .finish_non_exhaustive()
    }
}

/// Service for backup management
pub struct BackupService {
    paths: StorePaths,
    archiver: Box<dyn Archiver>,
    mirror: Box<dyn Mirror>,
}

impl BackupService {
    /// Create a service with explicit tool implementations
    pub fn new(paths: StorePaths, archiver: Box<dyn Archiver>, mirror: Box<dyn Mirror>) -> Self {
        Self {
            paths,
            archiver,
            mirror,
        }
    }

    /// Create a service using the configured tar and rsync binaries
    pub fn from_config(paths: StorePaths, config: &Config) -> Self {
        Self::new(
            paths,
            Box::new(TarArchiver::new(&config.tar_binary)),
            Box::new(RsyncMirror::new(&config.rsync_binary, config.rsync_args.clone())),
        )
    }

    /// Get the store paths
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn ledger(&self) -> JadeResult<Ledger<'_>> {
        Ledger::open(&self.paths, self.archiver.as_ref())
    }

    fn sync(&self) -> SyncEngine<'_> {
        SyncEngine::new(&self.paths, self.mirror.as_ref())
    }

    fn handle(&self, record: BackupRecord) -> BackupHandle<'_> {
        let archive = self.paths.archive_location(record.id);
        BackupHandle::new(record, archive, self.archiver.as_ref())
    }

    /// Lay out a new, empty store at this service's location
    pub fn create_store(&self) -> JadeResult<()> {
        create_store(&self.paths)
    }

    /// Back up `source`
    pub fn create(&self, source: &Path, description: Option<&str>) -> JadeResult<BackupHandle<'_>> {
        let record = self.ledger()?.create(source, description)?;
        Ok(self.handle(record))
    }

    /// Delete a backup and its archive
    pub fn delete(&self, id: BackupId) -> JadeResult<()> {
        self.ledger()?.delete(id)
    }

    /// Restore a backup by ID, returning whether anything was extracted
    pub fn restore(
        &self,
        id: BackupId,
        target: Option<&Path>,
        prompt: &mut dyn Confirm,
    ) -> JadeResult<bool> {
        self.ledger()?.restore(id, target, prompt)
    }

    /// Restore the newest backup covering `target` onto `target`
    pub fn restore_latest(&self, target: &Path, prompt: &mut dyn Confirm) -> JadeResult<bool> {
        let ledger = self.ledger()?;
        let record = ledger.latest_matching(target)?;
        ledger.restore_record(&record, Some(target), prompt)
    }

    /// All backups, or those covering `target`, newest first
    pub fn list(&self, target: Option<&Path>) -> JadeResult<Vec<BackupHandle<'_>>> {
        Ok(self
            .ledger()?
            .list_matching(target)?
            .into_iter()
            .map(|record| self.handle(record))
            .collect())
    }

    /// A single backup
    pub fn info(&self, id: BackupId) -> JadeResult<BackupHandle<'_>> {
        let record = self.ledger()?.get(id)?;
        Ok(self.handle(record))
    }

    /// Stream a backup's archive to `sink`
    pub fn dump_archive<W: Write + ?Sized>(&self, id: BackupId, sink: &mut W) -> JadeResult<u64> {
        self.ledger()?.dump(id, sink)
    }

    /// Write a backup's archive to a new file at `dest`
    ///
    /// Never overwrites; a partially written file is removed on failure.
    pub fn fetch_archive(&self, id: BackupId, dest: &Path) -> JadeResult<u64> {
        if path_exists(dest) {
            return Err(JadeError::BadDestination(format!(
                "{} already exists",
                dest.display()
            )));
        }
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                return Err(JadeError::BadDestination(format!(
                    "{} is not a directory",
                    parent.display()
                )));
            }
        }

        let ledger = self.ledger()?;
        ledger.get(id)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .map_err(|e| JadeError::BadDestination(format!("{}: {}", dest.display(), e)))?;

        match ledger.dump(id, &mut file) {
            Ok(written) => Ok(written),
            Err(err) => {
                drop(file);
                if let Err(cleanup) = fs::remove_file(dest) {
                    warn!(dest = %dest.display(), error = %cleanup, "failed to remove partial dump");
                }
                Err(err)
            }
        }
    }

    /// Mirror the store to `remote` or the default remote
    pub fn push(&self, remote: Option<&str>) -> JadeResult<String> {
        self.sync().push(remote)
    }

    /// Replace the store with a validated copy of `remote` or the default remote
    pub fn pull(&self, remote: Option<&str>) -> JadeResult<String> {
        self.sync().pull(remote)
    }

    /// Whether records and archives agree
    pub fn validate(&self) -> bool {
        self.sync().validate()
    }

    /// Detailed consistency report
    pub fn inspect(&self) -> ValidationReport {
        crate::sync::inspect(&self.paths)
    }

    pub fn default_remote(&self) -> JadeResult<Option<String>> {
        self.sync().default_remote()
    }

    pub fn set_default_remote(&self, remote: &str) -> JadeResult<()> {
        self.sync().set_default_remote(remote)
    }
}
