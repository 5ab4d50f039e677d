use crate::cmd::Globals;
use crate::cmd::core::DevServerArgs;
use crate::common::{SUCCESS, prompt};
use crate::config::PRODUCTION;
use crate::eject::Ejector;
use anyhow::Result;
use clap::Args;
use std::process::ExitCode;

/// Copy the build scripts & configuration into the app. This cannot be undone.
#[derive(Clone, Debug, Args)]
#[command(name = "eject")]
pub struct Eject {
    /// Only show what would be written
    #[arg(long)]
    pub dry_run: bool,

    // targeted by the ejected development configuration
    #[command(flatten)]
    pub dev_server: DevServerArgs,
}

impl Eject {
    #[tracing::instrument(level = "trace", skip(self, globals))]
    pub async fn run(self, globals: Globals) -> Result<ExitCode> {
        if !prompt::confirm("Are you sure? This cannot be undone.", false).await? {
            println!("OK. No changes were made.");
            return Ok(ExitCode::SUCCESS);
        }

        tracing::info!("Ejecting...");
        let ctx = globals
            .context(Some(PRODUCTION.to_string()), self.dev_server.dev_server())
            .await?;
        Ejector::new(&ctx, self.dry_run).run().await?;

        if self.dry_run {
            tracing::info!("DRY RUN: Complete. Nothing changed");
        } else {
            tracing::info!(
                "{}Ejected successfully. You should run either `npm install` or `yarn install` \
                 depending on what you use to finalize the ejection.",
                SUCCESS
            );
        }
        Ok(ExitCode::SUCCESS)
    }
}
