//! Store initialization
//!
//! Lays out a brand-new store: root directory, archive directory, schema and
//! the single settings row.

use std::fs;

use tracing::{info, warn};

use crate::config::paths::StorePaths;
use crate::error::{JadeError, JadeResult};

use super::metadata::MetadataStore;

/// Create a new, empty store
///
/// Fails if the root already exists. Anything created before a failure is
/// removed again before the error is returned.
pub fn create_store(paths: &StorePaths) -> JadeResult<()> {
    let root = paths.root();

    fs::create_dir(root).map_err(|e| {
        JadeError::StoreCreationFailed(format!("{}: {}", root.display(), e))
    })?;

    if let Err(e) = lay_out(paths) {
        if let Err(cleanup) = fs::remove_dir_all(root) {
            warn!(root = %root.display(), error = %cleanup, "failed to remove partial store");
        }
        return Err(JadeError::StoreCreationFailed(e));
    }

    info!(root = %root.display(), "created store");
    Ok(())
}

fn lay_out(paths: &StorePaths) -> Result<(), String> {
    let archive_dir = paths.archive_dir();
    fs::create_dir(&archive_dir).map_err(|e| format!("{}: {}", archive_dir.display(), e))?;

    MetadataStore::create(paths.database_file())
        .map_err(|e| format!("{}: {}", paths.database_file().display(), e))?;

    Ok(())
}
