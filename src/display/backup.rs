//! Backup display formatting
//!
//! Formats backup records for terminal output in table and detail views.

use chrono::NaiveDateTime;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::BackupRecord;

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Format a single record as labelled lines
pub fn format_backup(record: &BackupRecord) -> String {
    format!(
        "ID: {}\nTimestamp: {}\nSource: {}\nDescription: {}",
        record.id,
        record.timestamp,
        record.source.display(),
        record.description_or_empty()
    )
}

/// Format a record followed by its archive members
pub fn format_backup_verbose(record: &BackupRecord, contents: &[String]) -> String {
    let mut output = format_backup(record);
    output.push_str("\nContents:");
    for member in contents {
        output.push('\n');
        output.push_str(member);
    }
    output
}

/// Format records as a table, newest first as given
pub fn format_backup_list(records: &[BackupRecord], now: NaiveDateTime) -> String {
    if records.is_empty() {
        return "No backups found.".to_string();
    }

    let rows = records.iter().map(|record| BackupRow {
        id: record.id.to_string(),
        timestamp: record.timestamp.clone(),
        age: record
            .created_at()
            .map(|created| format_age(now - created))
            .unwrap_or_else(|| "?".to_string()),
        source: record.source.display().to_string(),
        description: record.description_or_empty().to_string(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

/// Format an age in the largest whole unit
pub fn format_age(age: chrono::Duration) -> String {
    let total_seconds = age.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}
