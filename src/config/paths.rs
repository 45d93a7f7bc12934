//! Path management for jade
//!
//! A store is a directory holding the metadata database and the archive
//! directory. Every other path is derived from the store root.
//!
//! ## Store Resolution Order
//!
//! 1. `--store` command-line option (or `JADE_STORE_DIR`)
//! 2. `store_dir` from the configuration file
//! 3. `~/.jade`

use std::path::{Component, Path, PathBuf};

use directories::BaseDirs;

use crate::error::JadeError;
use crate::models::BackupId;

/// Name of the metadata database inside a store
pub const DATABASE_FILE: &str = "backups.db";

/// Name of the archive directory inside a store
pub const ARCHIVE_DIR: &str = "backup_archives";

/// Extension of every archive blob
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Resolves all paths belonging to one store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Store root directory
    root: PathBuf,
}

impl StorePaths {
    /// Resolve the store location from an explicit override, a configured
    /// directory, or the home-directory default, in that order
    ///
    /// # Errors
    ///
    /// Returns an error if no override is given and the home directory
    /// cannot be determined.
    pub fn resolve(
        explicit: Option<&Path>,
        configured: Option<&Path>,
    ) -> Result<Self, JadeError> {
        if let Some(root) = explicit.or(configured) {
            return Ok(Self::with_root(absolute(root)?));
        }

        let base = BaseDirs::new()
            .ok_or_else(|| JadeError::Config("Could not determine home directory".into()))?;
        Ok(Self::with_root(base.home_dir().join(".jade")))
    }

    /// Create StorePaths rooted at a specific directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the store root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path to the metadata database
    pub fn database_file(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    /// Get the archive directory
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(ARCHIVE_DIR)
    }

    /// Get the blob location for a backup
    pub fn archive_location(&self, id: BackupId) -> PathBuf {
        self.archive_dir()
            .join(format!("{}.{}", id, ARCHIVE_EXTENSION))
    }

    /// Root rendered with a trailing separator, the form the mirror tool
    /// needs to copy a directory's contents rather than the directory itself
    pub fn root_as_mirror_source(&self) -> String {
        with_trailing_slash(&self.root.to_string_lossy())
    }
}

/// Make `path` absolute against the current directory without touching the
/// filesystem
///
/// `.` and `..` are folded lexically and a trailing separator is dropped, so
/// stored sources and query paths always compare in the same form.
pub fn absolute(path: &Path) -> Result<PathBuf, JadeError> {
    let absolute = std::path::absolute(path)
        .map_err(|e| JadeError::Io(format!("Failed to resolve {}: {}", path.display(), e)))?;
    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Append a `/` unless one is already present
pub fn with_trailing_slash(location: &str) -> String {
    if location.ends_with('/') {
        location.to_string()
    } else {
        format!("{}/", location)
    }
}
