//! Storage layer for jade
//!
//! A store is two independent substrates with no shared transaction:
//!
//! - `metadata`: SQLite table of backup records plus the settings row
//! - `archive`: directory of archive blobs named by record ID
//!
//! Nothing in this module keeps the two in agreement; that is the ledger's job.

pub mod archive;
pub mod init;
pub mod metadata;

pub use archive::ArchiveStore;
pub use init::create_store;
pub use metadata::MetadataStore;
