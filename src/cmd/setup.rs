use crate::build::BuildSystem;
use crate::cmd::Globals;
use crate::cmd::core::DevServerArgs;
use crate::common::BUILDING;
use crate::compiler::{NodeCompiler, Reporter, StatsPreset};
use crate::config::{self, BuildEnvironment, DEVELOPMENT};
use anyhow::Result;
use clap::Args;
use std::process::ExitCode;

/// Prebuild the vendor DLL the development server links against.
#[derive(Clone, Debug, Args)]
#[command(name = "setup")]
pub struct Setup {
    #[command(flatten)]
    pub dev_server: DevServerArgs,
}

impl Setup {
    #[tracing::instrument(level = "trace", skip(self, globals))]
    pub async fn run(self, globals: Globals) -> Result<ExitCode> {
        let ctx = globals
            .context(Some(DEVELOPMENT.to_string()), self.dev_server.dev_server())
            .await?;
        tracing::debug!("vendor libraries: {:?}", ctx.vendor_libs);

        let config = config::resolve(BuildEnvironment::Vendor, &ctx)?;
        let compiler = NodeCompiler::new(ctx.paths.clone(), BuildEnvironment::Vendor)?;

        tracing::info!("{}Building the vendor DLL...", BUILDING);
        let reporter = Reporter::new(StatsPreset::Development).with_subject("DLL");
        Ok(BuildSystem::new(compiler, reporter).run(&config).await)
    }
}
