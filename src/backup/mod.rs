//! Backup ledger for jade
//!
//! Records live in SQLite, archive blobs live on disk, and the two share no
//! transaction. The [`Ledger`] sequences every create and delete so that a
//! failure part-way through is compensated before the error propagates:
//!
//! - create: insert record, write blob; on failure remove blob then record
//! - delete: remove record, remove blob (a missing blob is not an error)
//!
//! # Example
//!
//! ```rust,ignore
//! use jade::backup::Ledger;
//! use jade::config::StorePaths;
//! use jade::tools::TarArchiver;
//!
//! let paths = StorePaths::with_root("/home/me/.jade");
//! let archiver = TarArchiver::default();
//! let ledger = Ledger::open(&paths, &archiver)?;
//!
//! let record = ledger.create("notes".as_ref(), Some("before rewrite"))?;
//! println!("backed up as {}", record.id);
//! ```

mod ledger;

pub use ledger::Ledger;
