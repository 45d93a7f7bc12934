use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jade::cli::{run_command, AppContext, Commands};
use jade::config::{Config, StorePaths};
use jade::JadeError;

#[derive(Parser)]
#[command(
    name = "jade",
    version,
    about = "Back up files and directories into a local store",
    long_about = "jade keeps timestamped tar archives of files and directories in a \
                  local store, restores them on request, and mirrors the whole \
                  store to and from a remote with rsync."
)]
struct Cli {
    /// Store to use (default: config store_dir, then ~/.jade)
    #[arg(
        short = 'd',
        long = "store",
        visible_alias = "database-location",
        env = "JADE_STORE_DIR",
        global = true
    )]
    store: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let _ = err.print();
                return ExitCode::SUCCESS;
            }
            report(&JadeError::BadUsage(err.render().to_string()));
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &dyn std::fmt::Display) {
    eprintln!("ERROR:");
    eprintln!("{}", err);
}

fn run(cli: &Cli) -> Result<()> {
    let config_file = Config::default_location();
    let config = Config::load_or_default(config_file.as_deref())?;
    let paths = StorePaths::resolve(cli.store.as_deref(), config.store_dir.as_deref())?;
    debug!(root = %paths.root().display(), "resolved store");

    let ctx = AppContext::new(paths, config);
    run_command(&ctx, &cli.command)?;
    Ok(())
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
