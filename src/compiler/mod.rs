//! The boundary to the bundler.
//!
//! The bundler itself is external. A [`Compiler`] accepts a configuration and reports [`Stats`],
//! either once, or for every rebuild in watch mode.

mod bridge;
mod report;

pub use bridge::{COMPILE_JS, NodeCompiler, PLUGINS_JS};
pub use report::{Reporter, StatsPreset};

use crate::config::Configuration;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;

/// The summary of a compilation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub hash: Option<String>,
    /// Compilation time, in milliseconds.
    #[serde(default)]
    pub time: Option<u64>,
    /// Version of the bundler.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// An emitted file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    #[serde(default)]
    pub chunk_names: Vec<String>,
}

impl Stats {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.time.map(Duration::from_millis)
    }
}

/// Progress of a compiler in watch mode.
#[derive(Debug)]
pub enum CompileEvent {
    /// A change was detected, a rebuild started.
    Invalidated,
    /// A rebuild completed.
    Done(Result<Stats>),
}

/// Turns a configuration into bundles.
pub trait Compiler {
    /// Compile once. An `Err` means the compiler itself failed, errors of the compilation are
    /// part of the [`Stats`].
    fn run(&self, config: &Configuration) -> impl Future<Output = Result<Stats>> + Send;

    /// Compile, and keep compiling on changes, reporting progress to `events`.
    ///
    /// This returns when the compiler stops, or once nobody listens to the events anymore.
    fn watch(
        &self,
        config: &Configuration,
        events: mpsc::Sender<CompileEvent>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// The classified result of a compilation.
#[derive(Debug)]
pub enum CompileOutcome {
    /// The compiler did not produce a result.
    FatalError(anyhow::Error),
    /// The compilation failed.
    CompileErrors(Vec<String>),
    Success { has_warnings: bool, stats: Stats },
}

impl CompileOutcome {
    pub fn classify(result: Result<Stats>) -> Self {
        match result {
            Err(err) => Self::FatalError(err),
            Ok(stats) if stats.has_errors() => Self::CompileErrors(stats.errors),
            Ok(stats) => Self::Success {
                has_warnings: stats.has_warnings(),
                stats,
            },
        }
    }

    /// The process exit status for the outcome. Warnings don't fail a build.
    pub fn code(&self) -> u8 {
        match self {
            Self::FatalError(_) | Self::CompileErrors(_) => 1,
            Self::Success { .. } => 0,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
