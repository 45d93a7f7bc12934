//! Archive store
//!
//! Directory holding one opaque blob per backup ID. Blobs are written by the
//! archiving tool; this module only locates, enumerates, streams and removes
//! them.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::paths::StorePaths;
use crate::error::{JadeError, JadeResult};
use crate::models::BackupId;

/// Size of each chunk copied by [`ArchiveStore::stream_to`]
pub const DUMP_CHUNK_SIZE: usize = 64 * 1024;

/// Blob directory of one store
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    paths: StorePaths,
}

impl ArchiveStore {
    /// Create an ArchiveStore for the given store
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    /// Directory holding the blobs
    pub fn dir(&self) -> PathBuf {
        self.paths.archive_dir()
    }

    /// Derived blob location for a backup
    pub fn location(&self, id: BackupId) -> PathBuf {
        self.paths.archive_location(id)
    }

    /// Whether a blob exists for a backup
    pub fn exists(&self, id: BackupId) -> bool {
        self.location(id).is_file()
    }

    /// Remove a blob; a blob that was never written is not an error
    ///
    /// Returns whether a file was actually removed.
    pub fn remove(&self, id: BackupId) -> JadeResult<bool> {
        let location = self.location(id);
        match fs::remove_file(&location) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(JadeError::Io(format!(
                "Failed to remove {}: {}",
                location.display(),
                e
            ))),
        }
    }

    /// Every entry currently in the blob directory
    ///
    /// Entries that do not follow the `<id>.tar.gz` naming are included, so
    /// callers comparing against expected locations see them as strays.
    pub fn entries(&self) -> JadeResult<BTreeSet<PathBuf>> {
        let dir = self.dir();
        let mut entries = BTreeSet::new();

        for entry in fs::read_dir(&dir).map_err(|e| {
            JadeError::Io(format!("Failed to read {}: {}", dir.display(), e))
        })? {
            let entry = entry
                .map_err(|e| JadeError::Io(format!("Failed to read directory entry: {}", e)))?;
            entries.insert(entry.path());
        }

        Ok(entries)
    }

    /// Copy a blob to `sink` in fixed-size chunks
    ///
    /// Returns the number of bytes written.
    pub fn stream_to<W: Write + ?Sized>(&self, id: BackupId, sink: &mut W) -> JadeResult<u64> {
        let location = self.location(id);
        let mut archive = File::open(&location).map_err(|e| {
            JadeError::Io(format!("Failed to open {}: {}", location.display(), e))
        })?;

        copy_chunked(&mut archive, sink)
    }
}

fn copy_chunked<R: Read, W: Write + ?Sized>(reader: &mut R, sink: &mut W) -> JadeResult<u64> {
    let mut buffer = vec![0u8; DUMP_CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        sink.write_all(&buffer[..read])?;
        total += read as u64;
    }

    sink.flush()?;
    Ok(total)
}

/// Whether `path` exists without following a final symlink
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_archives() -> (ArchiveStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_root(temp_dir.path());
        fs::create_dir_all(paths.archive_dir()).unwrap();
        (ArchiveStore::new(paths), temp_dir)
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (archives, _temp) = create_test_archives();
        let id = BackupId::new(3);
        fs::write(archives.location(id), b"blob").unwrap();

        assert!(archives.remove(id).unwrap());
        assert!(!archives.remove(id).unwrap());
        assert!(!archives.exists(id));
    }

    #[test]
    fn test_entries_include_strays() {
        let (archives, _temp) = create_test_archives();
        fs::write(archives.location(BackupId::new(1)), b"a").unwrap();
        fs::write(archives.dir().join("notes.txt"), b"c").unwrap();

        let entries = archives.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&archives.location(BackupId::new(1))));
        assert!(entries.contains(&archives.dir().join("notes.txt")));
    }

    #[test]
    fn test_stream_is_byte_identical() {
        let (archives, _temp) = create_test_archives();
        let id = BackupId::new(9);
        let payload: Vec<u8> = (0..(DUMP_CHUNK_SIZE * 2 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        fs::write(archives.location(id), &payload).unwrap();

        let mut sink = Vec::new();
        let written = archives.stream_to(id, &mut sink).unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(sink, payload);
    }

    #[test]
    fn test_stream_missing_blob_fails() {
        let (archives, _temp) = create_test_archives();
        let mut sink = Vec::new();
        assert!(archives.stream_to(BackupId::new(1), &mut sink).is_err());
    }
}
