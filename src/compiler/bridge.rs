//! Drives the bundler through a small script run by `node`.
//!
//! The script reports on stdout, one JSON object per event, prefixed by [`PROTOCOL_PREFIX`].
//! Everything else it prints is passed through.

use super::{CompileEvent, Compiler, Stats};
use crate::config::{AppPaths, BuildEnvironment, Configuration};
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;

/// Runs the bundler on a configuration file, turning plugin descriptors into plugins.
pub const COMPILE_JS: &str = include_str!("../../templates/utils/compile.js");
/// Maps plugin descriptors onto plugin instances.
pub const PLUGINS_JS: &str = include_str!("../../templates/utils/plugins.js");

const PROTOCOL_PREFIX: &str = "@@apptime:";

/// An event reported by the bridge script.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum BridgeEvent {
    Invalid,
    Done { stats: Stats },
    Fatal { message: String },
}

/// Parse a line of output, `None` for lines which are not part of the protocol.
fn parse_line(line: &str) -> Option<Result<BridgeEvent>> {
    let payload = line.strip_prefix(PROTOCOL_PREFIX)?;
    Some(
        serde_json::from_str(payload)
            .with_context(|| format!("error parsing compiler event: {payload}")),
    )
}

/// A [`Compiler`] running webpack in a `node` process.
pub struct NodeCompiler {
    paths: AppPaths,
    environment: BuildEnvironment,
    node: PathBuf,
}

impl NodeCompiler {
    /// Create a new instance, locating `node` on the `PATH`.
    pub fn new(paths: AppPaths, environment: BuildEnvironment) -> Result<Self> {
        let node = which::which("node")
            .context("unable to find `node` on the PATH, is Node.js installed?")?;
        tracing::debug!("using node at {}", node.display());
        Ok(Self {
            paths,
            environment,
            node,
        })
    }

    /// Materialize the bridge script and the configuration, returning the configuration file.
    async fn prepare(&self, config: &Configuration) -> Result<PathBuf> {
        let dir = self.paths.bridge_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("error creating bridge directory {}", dir.display()))?;

        for (name, content) in [("compile.js", COMPILE_JS), ("plugins.js", PLUGINS_JS)] {
            let path = dir.join(name);
            tokio::fs::write(&path, content)
                .await
                .with_context(|| format!("error writing {}", path.display()))?;
        }

        let config_file = dir.join(format!("{}.config.json", self.environment.short_name()));
        let json = serde_json::to_vec_pretty(config).context("error serializing configuration")?;
        tokio::fs::write(&config_file, json)
            .await
            .with_context(|| format!("error writing {}", config_file.display()))?;

        Ok(config_file)
    }

    fn command(&self, config_file: &Path, watch: bool) -> Command {
        let mut cmd = Command::new(&self.node);
        cmd.arg(self.paths.bridge_dir().join("compile.js"))
            .arg(config_file)
            .current_dir(self.paths.app_dir())
            .env("NODE_ENV", self.environment.node_env())
            .env("NODE_PATH", self.node_path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if watch {
            cmd.arg("--watch");
        }
        cmd
    }

    /// Modules required by the bridge resolve from app-time first, then from the app.
    fn node_path(&self) -> std::ffi::OsString {
        std::env::join_paths([self.paths.own_node_modules(), self.paths.app_node_modules()])
            .unwrap_or_default()
    }

    async fn spawn(
        &self,
        config: &Configuration,
        watch: bool,
    ) -> Result<(Child, Lines<BufReader<ChildStdout>>)> {
        let config_file = self.prepare(config).await?;
        tracing::debug!(
            "starting compiler for {} with {}",
            self.environment,
            config_file.display()
        );

        let mut child = self
            .command(&config_file, watch)
            .spawn()
            .context("error spawning compiler process")?;
        let stdout = child
            .stdout
            .take()
            .context("error capturing compiler output")?;
        Ok((child, BufReader::new(stdout).lines()))
    }
}

impl Compiler for NodeCompiler {
    #[tracing::instrument(level = "trace", skip_all)]
    async fn run(&self, config: &Configuration) -> Result<Stats> {
        let (mut child, mut lines) = self.spawn(config, false).await?;

        let mut result = None;
        while let Some(line) = lines.next_line().await? {
            match parse_line(&line) {
                None => println!("{line}"),
                Some(Ok(BridgeEvent::Invalid)) => {}
                Some(Ok(BridgeEvent::Done { stats })) => result = Some(Ok(stats)),
                Some(Ok(BridgeEvent::Fatal { message })) => result = Some(Err(anyhow!(message))),
                Some(Err(err)) => tracing::warn!("{err:?}"),
            }
        }

        let status = child
            .wait()
            .await
            .context("error waiting for compiler process")?;
        match result {
            Some(result) => result,
            None => Err(exited(status)),
        }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    async fn watch(&self, config: &Configuration, events: mpsc::Sender<CompileEvent>) -> Result<()> {
        let (mut child, mut lines) = self.spawn(config, true).await?;

        while let Some(line) = lines.next_line().await? {
            let event = match parse_line(&line) {
                None => {
                    println!("{line}");
                    continue;
                }
                Some(Err(err)) => {
                    tracing::warn!("{err:?}");
                    continue;
                }
                Some(Ok(BridgeEvent::Invalid)) => CompileEvent::Invalidated,
                Some(Ok(BridgeEvent::Done { stats })) => CompileEvent::Done(Ok(stats)),
                Some(Ok(BridgeEvent::Fatal { message })) => CompileEvent::Done(Err(anyhow!(message))),
            };
            if events.send(event).await.is_err() {
                tracing::debug!("compile events are no longer received, stopping compiler");
                return Ok(());
            }
        }

        let status = child
            .wait()
            .await
            .context("error waiting for compiler process")?;
        Err(exited(status))
    }
}

fn exited(status: ExitStatus) -> anyhow::Error {
    anyhow!("compiler process exited ({status}) without reporting a result")
}
