//! Backup CLI commands
//!
//! Implements CLI commands that create, restore, inspect and remove backups.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Args;

use crate::display::backup::{format_backup, format_backup_list, format_backup_verbose};
use crate::error::JadeResult;
use crate::models::{BackupId, BackupRecord};
use crate::prompt::{AutoConfirm, Confirm, LinePrompt};

use super::{AppContext, CommandHandler};

/// Stdout marker for `fetch_archive`
const STDOUT_DEST: &str = "-";

fn prompt_for(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(LinePrompt::stdio())
    }
}

fn report_restore(restored: bool) {
    if restored {
        println!("Restore complete.");
    } else {
        println!("Restore cancelled.");
    }
}

#[derive(Args)]
pub struct BackupArgs {
    /// File or directory to back up
    pub path: PathBuf,

    /// Free-form description
    pub description: Option<String>,
}

impl CommandHandler for BackupArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let service = ctx.service();
        let handle = service.create(&self.path, self.description.as_deref())?;
        println!("Backup {} created.", handle.id());
        println!("{}", format_backup(handle.record()));
        Ok(())
    }
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Backup ID
    pub id: BackupId,

    /// Where to extract to (default: the original path)
    pub target: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl CommandHandler for RestoreArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let mut prompt = prompt_for(self.yes);
        let restored = ctx
            .service()
            .restore(self.id, self.target.as_deref(), prompt.as_mut())?;
        report_restore(restored);
        Ok(())
    }
}

#[derive(Args)]
pub struct RestoreLatestArgs {
    /// Path to restore
    pub path: PathBuf,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl CommandHandler for RestoreLatestArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let mut prompt = prompt_for(self.yes);
        let restored = ctx.service().restore_latest(&self.path, prompt.as_mut())?;
        report_restore(restored);
        Ok(())
    }
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Backup ID
    pub id: BackupId,
}

impl CommandHandler for DeleteArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        ctx.service().delete(self.id)?;
        println!("Deleted backup {}.", self.id);
        Ok(())
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show backups covering this path
    pub path: Option<PathBuf>,
}

impl CommandHandler for ListArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let service = ctx.service();
        let records: Vec<BackupRecord> = service
            .list(self.path.as_deref())?
            .iter()
            .map(|handle| handle.record().clone())
            .collect();
        println!("{}", format_backup_list(&records, Local::now().naive_local()));
        Ok(())
    }
}

#[derive(Args)]
pub struct InfoArgs {
    /// Backup ID
    pub id: BackupId,
}

impl CommandHandler for InfoArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let service = ctx.service();
        let handle = service.info(self.id)?;
        println!("{}", format_backup_verbose(handle.record(), handle.contents()?));
        Ok(())
    }
}

#[derive(Args)]
pub struct FetchArchiveArgs {
    /// Backup ID
    pub id: BackupId,

    /// File to create, or `-` for stdout
    pub dest: String,
}

impl CommandHandler for FetchArchiveArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let service = ctx.service();
        if self.dest == STDOUT_DEST {
            let mut stdout = io::stdout().lock();
            service.dump_archive(self.id, &mut stdout)?;
            stdout.flush()?;
        } else {
            let written = service.fetch_archive(self.id, Path::new(&self.dest))?;
            eprintln!("Wrote {} bytes to {}", written, self.dest);
        }
        Ok(())
    }
}
