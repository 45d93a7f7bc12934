//! Display formatting for terminal output
//!
//! Formats backup records for the terminal, as labelled detail blocks and
//! as tables.

pub mod backup;

pub use backup::{format_age, format_backup, format_backup_list, format_backup_verbose};
