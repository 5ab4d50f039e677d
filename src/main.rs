#![deny(clippy::unwrap_used)]

mod build;
mod cmd;
mod common;
mod compiler;
mod config;
mod eject;
mod serve;
mod watch;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use common::STARTING;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = AppTime::parse();

    #[cfg(windows)]
    if let Err(err) = nu_ansi_term::enable_ansi_support() {
        eprintln!("error enabling ANSI support: {:?}", err);
    }

    tracing_subscriber::registry()
        .with(eval_logging(&cli))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .try_init()
        .context("error initializing logging")?;

    tracing::debug!(
        "{} Starting {} {}",
        STARTING,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    cli.run().await
}

fn eval_logging(cli: &AppTime) -> tracing_subscriber::EnvFilter {
    let directives = match (cli.verbose, cli.quiet, cli.debug_enabled()) {
        // quiet overrides verbose
        (_, true, _) => "error,app_time=warn",
        (0, false, false) => "error,app_time=info",
        (0, false, true) | (1, false, _) => "error,app_time=debug",
        (_, false, _) => "error,app_time=trace",
    };
    tracing_subscriber::EnvFilter::new(directives)
}

/// Zero-config build, dev server & eject for webpack front-end apps.
#[derive(Parser)]
#[command(about, author, version)]
struct AppTime {
    #[command(subcommand)]
    action: AppTimeSubcommands,
    /// The root directory of the app [default: current directory]
    #[arg(long, env = "APPTIME_APP_DIR", global(true))]
    pub app_dir: Option<PathBuf>,
    /// Enable debug output, any non-empty value turns it on
    #[arg(long, env = "DEBUG", global(true), hide_env_values(true))]
    pub debug: Option<String>,
    /// Enable verbose logging.
    #[arg(short, long, global(true), action=ArgAction::Count)]
    pub verbose: u8,
    /// Be more quiet, conflicts with --verbose
    #[arg(short, long, global(true), conflicts_with("verbose"))]
    pub quiet: bool,
}

impl AppTime {
    fn debug_enabled(&self) -> bool {
        self.debug.as_deref().is_some_and(|value| !value.is_empty())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn run(self) -> Result<ExitCode> {
        let globals = cmd::Globals {
            debug: self.debug_enabled(),
            app_dir: self.app_dir,
        };
        match self.action {
            AppTimeSubcommands::Build(inner) => inner.run(globals).await,
            AppTimeSubcommands::Start(inner) => inner.run(globals).await,
            AppTimeSubcommands::Setup(inner) => inner.run(globals).await,
            AppTimeSubcommands::Eject(inner) => inner.run(globals).await,
            AppTimeSubcommands::Unknown(args) => Ok(unknown_script(&args)),
        }
    }
}

#[derive(Subcommand)]
enum AppTimeSubcommands {
    /// Build the app for production.
    Build(cmd::build::Build),
    /// Run the development server with hot reloading.
    Start(cmd::start::Start),
    /// Prebuild the vendor DLL used by the development server.
    Setup(cmd::setup::Setup),
    /// Copy the build scripts into the app. This cannot be undone.
    Eject(cmd::eject::Eject),
    #[command(external_subcommand)]
    Unknown(Vec<OsString>),
}

/// Report a verb we don't know. This is not treated as a failure.
fn unknown_script(args: &[OsString]) -> ExitCode {
    let script = args
        .first()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("Unknown script \"{script}\".");
    println!("Perhaps you need to update app-time?");
    ExitCode::SUCCESS
}
