//! Remote and validation CLI commands

use clap::Args;

use crate::error::{JadeError, JadeResult};

use super::{AppContext, CommandHandler};

#[derive(Args)]
pub struct PushArgs {
    /// Remote location (default: the store's default remote)
    pub remote: Option<String>,
}

impl CommandHandler for PushArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let remote = ctx.service().push(self.remote.as_deref())?;
        println!("Pushed to {}", remote);
        Ok(())
    }
}

#[derive(Args)]
pub struct PullArgs {
    /// Remote location (default: the store's default remote)
    pub remote: Option<String>,
}

impl CommandHandler for PullArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let remote = ctx.service().pull(self.remote.as_deref())?;
        println!("Pulled from {}", remote);
        Ok(())
    }
}

#[derive(Args)]
pub struct ValidateArgs {}

impl CommandHandler for ValidateArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        let service = ctx.service();
        let report = service.inspect();
        println!("{}", report.summary());
        for path in &report.missing {
            println!("  missing: {}", path.display());
        }
        for path in &report.orphans {
            println!("  orphan: {}", path.display());
        }

        if !report.is_valid() {
            return Err(JadeError::CorruptedStore {
                location: service.paths().root().to_path_buf(),
            });
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct GetRemoteArgs {}

impl CommandHandler for GetRemoteArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        match ctx.service().default_remote()? {
            Some(remote) => println!("{}", remote),
            None => println!("No default remote set."),
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct SetRemoteArgs {
    /// New default remote
    pub remote: String,
}

impl CommandHandler for SetRemoteArgs {
    fn execute(&self, ctx: &AppContext) -> JadeResult<()> {
        ctx.service().set_default_remote(&self.remote)?;
        println!("Default remote set to {}", self.remote);
        Ok(())
    }
}
