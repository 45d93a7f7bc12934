//! Sync engine
//!
//! Push mirrors the whole local store to a remote. Pull mirrors a remote into
//! a staging directory beside the live store, validates the staged copy, and
//! only then swaps it into place. A failed or invalid pull leaves the live
//! store exactly as it was.
//!
//! Two processes pulling into the same store at once are not coordinated.

use std::fs;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::config::paths::{with_trailing_slash, StorePaths};
use crate::error::{JadeError, JadeResult};
use crate::storage::archive::path_exists;
use crate::storage::MetadataStore;
use crate::tools::Mirror;

use super::validator;

/// Prefix of staging directories created next to the store root
pub const STAGING_PREFIX: &str = ".jade-pull-";

/// Pushes, pulls and validates one store
pub struct SyncEngine<'a> {
    paths: &'a StorePaths,
    mirror: &'a dyn Mirror,
}

impl<'a> SyncEngine<'a> {
    pub fn new(paths: &'a StorePaths, mirror: &'a dyn Mirror) -> Self {
        Self { paths, mirror }
    }

    /// Read the default remote from the store's settings row
    pub fn default_remote(&self) -> JadeResult<Option<String>> {
        MetadataStore::open_read_only(self.paths.database_file())?.default_remote()
    }

    /// Replace the default remote
    pub fn set_default_remote(&self, remote: &str) -> JadeResult<()> {
        MetadataStore::open(self.paths.database_file())?.set_default_remote(Some(remote))?;
        info!(remote, "set default remote");
        Ok(())
    }

    /// Use `remote` if given, else the configured default
    fn resolve_remote(&self, remote: Option<&str>) -> JadeResult<String> {
        if let Some(remote) = remote {
            return Ok(remote.to_string());
        }

        self.default_remote()?
            .ok_or_else(|| JadeError::NoRemoteConfigured {
                store: self.paths.root().to_path_buf(),
            })
    }

    /// Mirror the local store to the remote, deleting remote extras
    ///
    /// Returns the remote that was pushed to.
    pub fn push(&self, remote: Option<&str>) -> JadeResult<String> {
        let remote = self.resolve_remote(remote)?;
        let source = self.paths.root_as_mirror_source();

        info!(source = %source, remote = %remote, "pushing store");
        let status = self.mirror.mirror(&source, &remote)?;
        if !status.success() {
            return Err(JadeError::PushFailed {
                store: self.paths.root().to_path_buf(),
                remote,
                exit_code: status.code(),
            });
        }

        Ok(remote)
    }

    /// Replace the local store with a validated copy of the remote
    ///
    /// Returns the remote that was pulled from.
    pub fn pull(&self, remote: Option<&str>) -> JadeResult<String> {
        let remote = self.resolve_remote(remote)?;
        let root = self.paths.root();
        let parent = root.parent().ok_or_else(|| {
            JadeError::Io(format!("Store {} has no parent directory", root.display()))
        })?;
        fs::create_dir_all(parent)?;

        // Removed on every exit path when this guard drops.
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| JadeError::Io(format!("Failed to create staging directory: {}", e)))?;
        let staged = StorePaths::with_root(staging.path().join("store"));

        info!(remote = %remote, staging = %staged.root().display(), "pulling store");
        let status = self.mirror.mirror(
            &with_trailing_slash(&remote),
            &staged.root().to_string_lossy(),
        )?;
        if !status.success() {
            return Err(JadeError::PullFailed {
                staging: staged.root().to_path_buf(),
                remote,
                exit_code: status.code(),
            });
        }

        let report = validator::inspect(&staged);
        if !report.is_valid() {
            warn!(remote = %remote, problems = %report.summary(), "pulled store is invalid");
            return Err(JadeError::InvalidRemoteStore { remote });
        }

        swap_into_place(staged.root(), root, &staging.path().join("previous"))?;
        info!(remote = %remote, root = %root.display(), "replaced local store");
        Ok(remote)
    }

    /// Validate the live store without touching it
    pub fn validate(&self) -> bool {
        validator::check(self.paths)
    }
}

/// Move `staged` to `live`, parking the old tree at `aside`
///
/// If the second rename fails the old tree is moved back, so `live` is never
/// left missing or half-written.
fn swap_into_place(staged: &Path, live: &Path, aside: &Path) -> JadeResult<()> {
    let had_live = path_exists(live);
    if had_live {
        fs::rename(live, aside).map_err(|e| {
            JadeError::Io(format!("Failed to move {} aside: {}", live.display(), e))
        })?;
        debug!(aside = %aside.display(), "moved old store aside");
    }

    if let Err(e) = fs::rename(staged, live) {
        if had_live {
            if let Err(undo) = fs::rename(aside, live) {
                error!(
                    aside = %aside.display(),
                    error = %undo,
                    "failed to put old store back"
                );
            }
        }
        return Err(JadeError::Io(format!(
            "Failed to move pulled store into {}: {}",
            live.display(),
            e
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::Ledger;
    use crate::storage::create_store;
    use crate::test_support::{snapshot_tree, FakeArchiver, FakeMirror, Fixture};

    fn populated_store(fixture: &Fixture, name: &str) -> StorePaths {
        let archiver = FakeArchiver::default();
        let ledger = Ledger::open(&fixture.paths, &archiver).unwrap();
        ledger.create(&fixture.sample(name), Some(name)).unwrap();
        fixture.paths.clone()
    }

    fn remote_store(fixture: &Fixture) -> StorePaths {
        let paths = StorePaths::with_root(fixture.temp.path().join("remote"));
        create_store(&paths).unwrap();
        let archiver = FakeArchiver::default();
        let ledger = Ledger::open(&paths, &archiver).unwrap();
        ledger.create(&fixture.sample("remote-file"), None).unwrap();
        ledger.create(&fixture.sample("remote-file-2"), None).unwrap();
        paths
    }

    #[test]
    fn test_push_without_remote_fails() {
        let fixture = Fixture::new();
        let mirror = FakeMirror::default();
        let engine = SyncEngine::new(&fixture.paths, &mirror);

        let err = engine.push(None).unwrap_err();
        assert!(matches!(err, JadeError::NoRemoteConfigured { .. }));
        assert!(mirror.calls.borrow().is_empty());
    }

    #[test]
    fn test_push_uses_default_remote() {
        let fixture = Fixture::new();
        let paths = populated_store(&fixture, "a");
        let mirror = FakeMirror::default();
        let engine = SyncEngine::new(&paths, &mirror);
        let remote = fixture.temp.path().join("mirror");
        engine.set_default_remote(&remote.to_string_lossy()).unwrap();

        let pushed = engine.push(None).unwrap();

        assert_eq!(pushed, as_location(&remote));
        let (source, _) = mirror.calls.borrow()[0].clone();
        assert!(source.ends_with('/'));
        assert_eq!(snapshot_tree(&remote), snapshot_tree(paths.root()));
    }

    #[test]
    fn test_push_failure_carries_exit_code() {
        let fixture = Fixture::new();
        let mirror = FakeMirror::default();
        mirror.exit_code.set(23);
        let engine = SyncEngine::new(&fixture.paths, &mirror);

        let err = engine
            .push(Some(&as_location(&fixture.temp.path().join("mirror"))))
            .unwrap_err();
        assert!(matches!(err, JadeError::PushFailed { exit_code: 23, .. }));
    }

    #[test]
    fn test_pull_replaces_store() {
        let fixture = Fixture::new();
        let remote = remote_store(&fixture);
        populated_store(&fixture, "local");
        let mirror = FakeMirror::default();
        let engine = SyncEngine::new(&fixture.paths, &mirror);

        engine.pull(Some(&as_location(remote.root()))).unwrap();

        assert_eq!(snapshot_tree(fixture.paths.root()), snapshot_tree(remote.root()));
        assert!(engine.validate());
        assert_no_staging_left(&fixture);
    }

    #[test]
    fn test_pull_invalid_remote_leaves_store_untouched() {
        let fixture = Fixture::new();
        let remote = remote_store(&fixture);
        fs::write(remote.archive_dir().join("999.tar.gz"), b"orphan").unwrap();
        populated_store(&fixture, "local");
        let before = snapshot_tree(fixture.paths.root());
        let mirror = FakeMirror::default();
        let engine = SyncEngine::new(&fixture.paths, &mirror);

        let err = engine
            .pull(Some(&as_location(remote.root())))
            .unwrap_err();

        assert!(matches!(err, JadeError::InvalidRemoteStore { .. }));
        assert_eq!(snapshot_tree(fixture.paths.root()), before);
        assert_no_staging_left(&fixture);
    }

    #[test]
    fn test_pull_mirror_failure_leaves_store_untouched() {
        let fixture = Fixture::new();
        let remote = remote_store(&fixture);
        populated_store(&fixture, "local");
        let before = snapshot_tree(fixture.paths.root());
        let mirror = FakeMirror::default();
        mirror.exit_code.set(12);
        let engine = SyncEngine::new(&fixture.paths, &mirror);

        let err = engine
            .pull(Some(&as_location(remote.root())))
            .unwrap_err();

        assert!(matches!(err, JadeError::PullFailed { exit_code: 12, .. }));
        assert_eq!(snapshot_tree(fixture.paths.root()), before);
        assert_no_staging_left(&fixture);
    }

    #[test]
    fn test_pull_into_missing_store() {
        let fixture = Fixture::new();
        let remote = remote_store(&fixture);
        let paths = StorePaths::with_root(fixture.temp.path().join("fresh"));
        let mirror = FakeMirror::default();
        let engine = SyncEngine::new(&paths, &mirror);

        engine.pull(Some(&as_location(remote.root()))).unwrap();
        assert!(engine.validate());
    }

    #[test]
    fn test_swap_restores_old_tree_when_second_rename_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let live = temp_dir.path().join("live");
        fs::create_dir(&live).unwrap();
        fs::write(live.join("keep"), b"old").unwrap();
        let aside = temp_dir.path().join("aside");

        let err = swap_into_place(&temp_dir.path().join("no-such-staged"), &live, &aside);

        assert!(err.is_err());
        assert_eq!(fs::read(live.join("keep")).unwrap(), b"old");
    }

    fn as_location(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    fn assert_no_staging_left(fixture: &Fixture) {
        let leftovers: Vec<_> = fs::read_dir(fixture.temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(STAGING_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }
}
