//! Remote synchronisation for jade
//!
//! - `validator`: checks that records and blobs agree exactly
//! - `engine`: push, validated pull, default-remote settings

pub mod engine;
pub mod validator;

pub use engine::SyncEngine;
pub use validator::{check, inspect, ValidationReport};
