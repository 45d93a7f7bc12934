//! CLI command handlers
//!
//! Each subcommand parses into its own args struct, and every args struct is a
//! [`CommandHandler`]. Dispatch goes through [`Commands::handler`] instead of
//! a name-keyed table.

pub mod backup;
pub mod store;
pub mod sync;

use clap::Subcommand;

use crate::config::paths::StorePaths;
use crate::config::settings::Config;
use crate::error::JadeResult;
use crate::services::BackupService;

pub use backup::{
    BackupArgs, DeleteArgs, FetchArchiveArgs, InfoArgs, ListArgs, RestoreArgs, RestoreLatestArgs,
};
pub use store::CreateDbArgs;
pub use sync::{GetRemoteArgs, PullArgs, PushArgs, SetRemoteArgs, ValidateArgs};

/// Everything a command needs to reach a store
pub struct AppContext {
    pub paths: StorePaths,
    pub config: Config,
}

impl AppContext {
    pub fn new(paths: StorePaths, config: Config) -> Self {
        Self { paths, config }
    }

    /// Service for the resolved store, with the configured tools
    pub fn service(&self) -> BackupService {
        BackupService::from_config(self.paths.clone(), &self.config)
    }
}

/// A parsed command ready to run
pub trait CommandHandler {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()>;
}

/// Top-level subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Make a backup of PATH
    Backup(BackupArgs),

    /// Restore a backup by ID
    Restore(RestoreArgs),

    /// Restore the most recent backup of PATH
    #[command(name = "restore_latest")]
    RestoreLatest(RestoreLatestArgs),

    /// Delete a backup and its archive
    Delete(DeleteArgs),

    /// List all backups; if given, only those of PATH
    #[command(visible_alias = "list_backups")]
    List(ListArgs),

    /// Show a backup and the contents of its archive
    Info(InfoArgs),

    /// Create a new, empty store
    #[command(name = "create_db")]
    CreateDb(CreateDbArgs),

    /// Mirror the store to a remote
    Push(PushArgs),

    /// Replace the store with a validated copy of a remote
    Pull(PullArgs),

    /// Check that records and archives agree
    Validate(ValidateArgs),

    /// Print the default remote
    #[command(name = "get_remote")]
    GetRemote(GetRemoteArgs),

    /// Set the default remote
    #[command(name = "set_remote")]
    SetRemote(SetRemoteArgs),

    /// Write a backup's raw archive to a file, or `-` for stdout
    #[command(name = "fetch_archive")]
    FetchArchive(FetchArchiveArgs),
}

impl Commands {
    /// The handler for this command
    pub fn handler(&self) -> &dyn CommandHandler {
        match self {
            Self::Backup(args) => args,
            Self::Restore(args) => args,
            Self::RestoreLatest(args) => args,
            Self::Delete(args) => args,
            Self::List(args) => args,
            Self::Info(args) => args,
            Self::CreateDb(args) => args,
            Self::Push(args) => args,
            Self::Pull(args) => args,
            Self::Validate(args) => args,
            Self::GetRemote(args) => args,
            Self::SetRemote(args) => args,
            Self::FetchArchive(args) => args,
        }
    }
}

/// Run a parsed command against the context's store
pub fn run_command(ctx: &AppContext, command: &Commands) -> JadeResult<()> {
    command.handler().execute(ctx)
}
