//! Error types for jade
//!
//! Every failure the ledger can report is one variant of [`JadeError`]. Errors
//! are raised where they are detected and propagate unhandled up to the
//! command boundary in `main`, which prints them and exits non-zero.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::BackupId;

/// The main error type for jade operations
#[derive(Error, Debug)]
pub enum JadeError {
    /// The path to back up does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// No record with the given ID
    #[error("No backups with ID {id}")]
    BackupNotFound { id: BackupId },

    /// A prefix query matched nothing
    #[error("No backups found for {}", target.display())]
    NoBackupsMatch { target: PathBuf },

    /// The archiving tool exited non-zero while writing a blob
    #[error("Backup failed: archiving {} exited with code {exit_code}", path.display())]
    ArchiveCreationFailed { path: PathBuf, exit_code: i32 },

    /// The archiving tool exited non-zero while extracting
    #[error("Restoration failed: extracting archive failed with exit code {exit_code}")]
    RestorationFailed { exit_code: i32 },

    /// The metadata store cannot be opened or queried
    #[error("Corrupted store: {}", location.display())]
    CorruptedStore { location: PathBuf },

    /// `create_db` could not lay out a new store
    #[error("Store creation failed: {0}")]
    StoreCreationFailed(String),

    /// The mirror tool exited non-zero while pushing
    #[error(
        "Push failed: mirroring {} to {remote} failed with exit code {exit_code}",
        store.display()
    )]
    PushFailed {
        store: PathBuf,
        remote: String,
        exit_code: i32,
    },

    /// The mirror tool exited non-zero while pulling
    #[error(
        "Pull failed: mirroring {remote} to {} failed with exit code {exit_code}",
        staging.display()
    )]
    PullFailed {
        staging: PathBuf,
        remote: String,
        exit_code: i32,
    },

    /// A pulled copy did not pass validation
    #[error("{remote} is not a valid jade store")]
    InvalidRemoteStore { remote: String },

    /// Neither an explicit remote nor a default remote is available
    #[error("No default remote configured in {}", store.display())]
    NoRemoteConfigured { store: PathBuf },

    /// The destination of an archive dump is unusable
    #[error("Bad destination: {0}")]
    BadDestination(String),

    /// Malformed command-line usage
    #[error("Bad usage: {0}")]
    BadUsage(String),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// SQLite errors not attributable to a specific store
    #[error("Database error: {0}")]
    Database(String),
}

impl From<std::io::Error> for JadeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<rusqlite::Error> for JadeError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for jade operations
pub type JadeResult<T> = Result<T, JadeError>;
