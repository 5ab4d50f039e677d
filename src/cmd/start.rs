use crate::cmd::Globals;
use crate::cmd::core::DevServerArgs;
use crate::common::{self, STARTING, WARNING};
use crate::compiler::{NodeCompiler, Reporter, StatsPreset};
use crate::config::{self, AppContext, BuildEnvironment, DEVELOPMENT};
use crate::serve::ServeSystem;
use crate::watch::WatchOptions;
use anyhow::{Context, Result};
use clap::Args;
use std::process::ExitCode;
use tokio::select;
use tokio::sync::broadcast;

/// Run the development server with hot reloading.
#[derive(Clone, Debug, Args)]
#[command(name = "start")]
pub struct Start {
    #[command(flatten)]
    pub dev_server: DevServerArgs,

    /// Show a live dashboard instead of the compiler output
    #[arg(long)]
    pub dashboard: bool,

    /// Open a browser tab once the server is listening
    #[arg(long)]
    pub open: bool,
}

impl Start {
    #[tracing::instrument(level = "trace", skip(self, globals))]
    pub async fn run(self, globals: Globals) -> Result<ExitCode> {
        let mut ctx = globals
            .context(Some(DEVELOPMENT.to_string()), self.dev_server.dev_server())
            .await?;
        ctx.dashboard = self.dashboard;

        warn_missing_vendor_dll(&ctx).await?;

        let config = config::resolve(BuildEnvironment::Development, &ctx)?;
        let compiler = NodeCompiler::new(ctx.paths.clone(), BuildEnvironment::Development)?;
        let options = WatchOptions {
            reporter: Reporter::new(StatsPreset::Development),
            port: ctx.dev_server.port,
            clear_console: !globals.debug && common::is_interactive(),
            dashboard: self.dashboard,
        };

        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);
        let system =
            ServeSystem::new(compiler, config, &ctx, options, self.open, shutdown_tx.clone())
                .await?;

        tracing::info!("{}Starting the development server...", STARTING);
        let mut system_handle = tokio::spawn(system.run());

        let joined = select! {
            r = tokio::signal::ctrl_c() => {
                r.context("error awaiting shutdown signal")?;
                tracing::debug!("received shutdown signal");
                None
            }
            r = &mut system_handle => Some(r),
        };

        // Drop the sender, every part of the system shuts down.
        drop(shutdown_tx);
        let joined = match joined {
            Some(joined) => joined,
            None => system_handle.await,
        };
        joined.context("error awaiting system shutdown")??;

        Ok(ExitCode::SUCCESS)
    }
}

/// The dev configuration references the vendor DLL, which `setup` prebuilds.
async fn warn_missing_vendor_dll(ctx: &AppContext) -> Result<bool> {
    let manifest = ctx.paths.vendor_manifest();
    let exists = common::path_exists(&manifest).await?;
    if !exists {
        tracing::warn!(
            "{}No vendor DLL manifest found at {}. Run `app-time setup` first, the dev build \
             can't resolve vendor libraries without it.",
            WARNING,
            common::strip_prefix(&manifest).display()
        );
    }
    Ok(exists)
}
