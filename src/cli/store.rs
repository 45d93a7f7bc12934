//! Store CLI commands

use std::path::PathBuf;

use clap::Args;

use crate::config::paths::{absolute, StorePaths};
use crate::error::JadeResult;
use crate::services::BackupService;

use super::{AppContext, CommandHandler};

#[derive(Args)]
pub struct CreateDbArgs {
    /// Where to create the store (default: the resolved store location)
    pub location: Option<PathBuf>,
}

impl CommandHandler for CreateDbArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let paths = match &self.location {
            Some(location) => StorePaths::with_root(absolute(location)?),
            None => ctx.paths.clone(),
        };

        BackupService::from_config(paths, &ctx.config).create_store()?;
        println!("Store created.");
        Ok(())
    }
}
