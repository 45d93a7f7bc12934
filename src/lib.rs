//! jade - a personal backup ledger
//!
//! jade archives files and directories into a local store and keeps one
//! metadata record per archive. The store can be mirrored to a remote and
//! pulled back, with every pulled copy validated before it replaces the local
//! store.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Store path resolution and tool configuration
//! - `error`: Custom error types
//! - `models`: Backup records and IDs
//! - `storage`: SQLite metadata store and archive blob directory
//! - `tools`: External archiving and mirroring tools
//! - `backup`: The ledger keeping records and blobs in step
//! - `sync`: Validation, push and pull
//! - `prompt`: Interactive confirmation
//! - `services`: Public backup API
//! - `display`: Terminal formatting
//! - `cli`: Command-line handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use jade::config::{Config, StorePaths};
//! use jade::services::BackupService;
//!
//! let paths = StorePaths::resolve(None, None)?;
//! let service = BackupService::from_config(paths, &Config::default());
//! let backup = service.create("notes".as_ref(), Some("before rewrite"))?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod prompt;
pub mod services;
pub mod storage;
pub mod sync;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use error::{JadeError, JadeResult};
