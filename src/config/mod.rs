//! Configuration module for jade
//!
//! - Store path resolution and layout
//! - Tool configuration file

pub mod paths;
pub mod settings;

pub use paths::StorePaths;
pub use settings::Config;
