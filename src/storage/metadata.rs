//! Metadata store
//!
//! SQLite database with a `backups` table of records and a single-row
//! `settings` table holding the default remote. Each statement is atomic on
//! its own; multi-step sequences that also touch the archive directory are
//! coordinated by the ledger, not here.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension, Row};
use tracing::debug;

use crate::error::{JadeError, JadeResult};
use crate::models::{BackupId, BackupRecord};

/// Statements that lay out a fresh store
pub const SCHEMA: &str = "
    CREATE TABLE backups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
        source TEXT NOT NULL,
        description TEXT
    );
    CREATE TABLE settings (remote TEXT);
    INSERT INTO settings DEFAULT VALUES;
";

const RECORD_COLUMNS: &str = "id, timestamp, source, description";

/// Connection to one store's metadata database
pub struct MetadataStore {
    conn: Connection,
    location: PathBuf,
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl MetadataStore {
    /// Open an existing database for reading and writing
    ///
    /// The file is never created here; a missing database means the
    /// directory is not a store.
    pub fn open(path: impl AsRef<Path>) -> JadeResult<Self> {
        Self::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_WRITE)
    }

    /// Open an existing database without write access
    pub fn open_read_only(path: impl AsRef<Path>) -> JadeResult<Self> {
        Self::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)
    }

    /// Create a new database file and lay out the schema
    pub fn create(path: impl AsRef<Path>) -> JadeResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        conn.execute_batch(SCHEMA)?;
        debug!(location = %path.display(), "created metadata schema");

        Ok(Self {
            conn,
            location: path.to_path_buf(),
        })
    }

    fn open_with_flags(path: &Path, flags: OpenFlags) -> JadeResult<Self> {
        let conn = Connection::open_with_flags(path, flags | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .map_err(|_| JadeError::CorruptedStore {
                location: path.to_path_buf(),
            })?;

        Ok(Self {
            conn,
            location: path.to_path_buf(),
        })
    }

    fn corrupted(&self) -> JadeError {
        JadeError::CorruptedStore {
            location: self.location.clone(),
        }
    }

    /// A failed statement means a damaged store, unless another connection
    /// is holding the database
    fn query_error(&self, err: rusqlite::Error) -> JadeError {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => err.into(),
            _ => self.corrupted(),
        }
    }

    /// Insert a record stamped with the current local time
    pub fn insert(&self, source: &Path, description: Option<&str>) -> JadeResult<BackupRecord> {
        self.conn
            .execute(
                "INSERT INTO backups (source, description) VALUES (?1, ?2)",
                params![source.to_string_lossy().into_owned(), description],
            )
            .map_err(|e| self.query_error(e))?;

        let id = BackupId::new(self.conn.last_insert_rowid());
        self.get(id)?.ok_or_else(|| self.corrupted())
    }

    /// Insert a record with an explicit timestamp
    #[cfg(test)]
    pub(crate) fn insert_at(
        &self,
        timestamp: &str,
        source: &Path,
        description: Option<&str>,
    ) -> JadeResult<BackupRecord> {
        self.conn.execute(
            "INSERT INTO backups (timestamp, source, description) VALUES (?1, ?2, ?3)",
            params![timestamp, source.to_string_lossy().into_owned(), description],
        )?;
        let id = BackupId::new(self.conn.last_insert_rowid());
        self.get(id)?.ok_or_else(|| self.corrupted())
    }

    /// Fetch a record by ID
    pub fn get(&self, id: BackupId) -> JadeResult<Option<BackupRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM backups WHERE id = ?1"),
                [id],
                record_from_row,
            )
            .optional()
            .map_err(|e| self.query_error(e))
    }

    /// Delete a record, returning whether a row was removed
    pub fn delete(&self, id: BackupId) -> JadeResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM backups WHERE id = ?1", [id])
            .map_err(|e| self.query_error(e))?;
        Ok(removed > 0)
    }

    /// All records, newest first
    pub fn list_all(&self) -> JadeResult<Vec<BackupRecord>> {
        self.query_records(
            &format!("SELECT {RECORD_COLUMNS} FROM backups ORDER BY timestamp DESC, id DESC"),
            params![],
        )
    }

    /// Records whose source is a `LIKE` prefix of `path`, newest first
    ///
    /// A record for `/a` matches a query for `/a/b`, not the other way round.
    pub fn list_matching(&self, path: &Path) -> JadeResult<Vec<BackupRecord>> {
        self.query_records(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM backups \
                 WHERE ?1 LIKE source || '%' ORDER BY timestamp DESC, id DESC"
            ),
            [path.to_string_lossy().into_owned()],
        )
    }

    /// Every record ID
    pub fn all_ids(&self) -> JadeResult<Vec<BackupId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM backups")
            .map_err(|e| self.query_error(e))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, i64>(0).map(BackupId::new))
            .map_err(|e| self.query_error(e))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(|e| self.query_error(e))?);
        }
        Ok(ids)
    }

    /// Read the default remote from the single settings row
    pub fn default_remote(&self) -> JadeResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT remote FROM settings")
            .map_err(|e| self.query_error(e))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))
            .map_err(|e| self.query_error(e))?;

        let mut remotes = Vec::new();
        for row in rows {
            remotes.push(row.map_err(|e| self.query_error(e))?);
        }

        match remotes.len() {
            1 => Ok(remotes.remove(0)),
            _ => Err(self.corrupted()),
        }
    }

    /// Overwrite the default remote
    pub fn set_default_remote(&self, remote: Option<&str>) -> JadeResult<()> {
        let updated = self
            .conn
            .execute("UPDATE settings SET remote = ?1", [remote])
            .map_err(|e| self.query_error(e))?;
        if updated != 1 {
            return Err(self.corrupted());
        }
        Ok(())
    }

    fn query_records<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> JadeResult<Vec<BackupRecord>> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| self.query_error(e))?;
        let rows = stmt
            .query_map(params, record_from_row)
            .map_err(|e| self.query_error(e))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| self.query_error(e))?);
        }
        Ok(records)
    }

    /// Direct access for tests that need to damage the schema
    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<BackupRecord> {
    Ok(BackupRecord {
        id: BackupId::new(row.get(0)?),
        timestamp: row.get(1)?,
        source: PathBuf::from(row.get::<_, String>(2)?),
        description: row.get(3)?,
    })
}
