use crate::build::BuildSystem;
use crate::cmd::Globals;
use crate::common::BUILDING;
use crate::compiler::{Compiler, NodeCompiler, Reporter, StatsPreset};
use crate::config::{self, AppContext, BuildEnvironment, DevServer, PRODUCTION};
use anyhow::Result;
use clap::Args;
use std::process::ExitCode;

/// Build the app for production.
#[derive(Clone, Debug, Args)]
#[command(name = "build")]
#[command(next_help_heading = "Build")]
pub struct Build {
    /// Write a report of the bundle composition next to the build
    #[arg(long)]
    pub analyze: bool,

    /// The environment of the build, anything but `production` is refused
    #[arg(long, env = "NODE_ENV", default_value = PRODUCTION, hide = true)]
    pub node_env: String,
}

impl Build {
    #[tracing::instrument(level = "trace", skip(self, globals))]
    pub async fn run(self, globals: Globals) -> Result<ExitCode> {
        let mut ctx = globals
            .context(Some(self.node_env), DevServer::default())
            .await?;
        ctx.analyze = self.analyze;

        let compiler = NodeCompiler::new(ctx.paths.clone(), BuildEnvironment::Production)?;
        build_app(&ctx, compiler).await
    }
}

/// Build the production bundle of an app. Refuses to run the compiler outside of production.
pub async fn build_app<C: Compiler>(ctx: &AppContext, compiler: C) -> Result<ExitCode> {
    let config = config::resolve(BuildEnvironment::Production, ctx)?;

    tracing::info!("{}Creating an optimized production build...", BUILDING);
    let system = BuildSystem::new(compiler, Reporter::new(StatsPreset::Production));
    Ok(system.run(&config).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::tests::ScriptedCompiler;
    use crate::compiler::{CompileEvent, Stats};
    use crate::config::{Configuration, EnvironmentError};
    use std::path::Path;
    use tokio::sync::mpsc;

    /// A compiler which must never be used.
    struct Untouchable;

    impl Compiler for Untouchable {
        async fn run(&self, _config: &Configuration) -> Result<Stats> {
            panic!("the compiler was invoked");
        }

        async fn watch(
            &self,
            _config: &Configuration,
            _events: mpsc::Sender<CompileEvent>,
        ) -> Result<()> {
            panic!("the compiler was invoked");
        }
    }

    #[tokio::test]
    async fn refuses_to_build_outside_production() {
        let mut ctx = AppContext::new_test(Path::new("/work/app"));
        ctx.node_env = Some("development".into());

        let err = build_app(&ctx, Untouchable).await.expect_err("must fail");
        let err = err
            .downcast_ref::<EnvironmentError>()
            .expect("environment error");
        assert!(err.to_string().contains("NODE_ENV=production app-time build"));
    }

    #[tokio::test]
    async fn builds_in_production() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = AppContext::new_test(dir.path());
        let compiler = ScriptedCompiler::new(vec![Ok(Stats::default())]);

        let code = build_app(&ctx, compiler).await.expect("build");
        assert_eq!(code, ExitCode::SUCCESS);
    }
}
