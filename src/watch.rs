use crate::common::{self, BUILDING, SERVER};
use crate::compiler::{CompileEvent, CompileOutcome, Compiler, Reporter, Stats};
use crate::config::Configuration;
use crate::serve::HmrState;
use anyhow::Result;
use tokio::sync::{broadcast, mpsc, watch};

/// A watch system wrapping a compiler in watch mode.
///
/// Every rebuild is reported and forwarded to the hot reload channel. Compile errors never stop
/// the system, the dev server keeps serving the last bundle which was emitted.
pub struct WatchSystem<C> {
    compiler: C,
    config: Configuration,
    presenter: Presenter,
    /// The application shutdown channel.
    shutdown: broadcast::Receiver<()>,
}

/// Presents rebuilds, on the console and to the hot reload channel.
struct Presenter {
    reporter: Reporter,
    hmr: watch::Sender<HmrState>,
    port: u16,
    clear_console: bool,
    /// The dashboard plugin renders progress itself.
    quiet: bool,
}

/// How rebuilds are presented on the console.
#[derive(Clone, Copy, Debug)]
pub struct WatchOptions {
    pub reporter: Reporter,
    pub port: u16,
    pub clear_console: bool,
    pub dashboard: bool,
}

impl<C: Compiler> WatchSystem<C> {
    /// Create a new instance.
    pub fn new(
        compiler: C,
        config: Configuration,
        options: WatchOptions,
        hmr: watch::Sender<HmrState>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            compiler,
            config,
            presenter: Presenter {
                reporter: options.reporter,
                hmr,
                port: options.port,
                clear_console: options.clear_console,
                quiet: options.dashboard,
            },
            shutdown,
        }
    }

    /// Run the watch system, until the compiler stops or a shutdown is requested.
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn run(self) -> Result<()> {
        let Self {
            compiler,
            config,
            presenter,
            mut shutdown,
        } = self;

        let (events_tx, mut events_rx) = mpsc::channel(16);
        let compile = compiler.watch(&config, events_tx);
        tokio::pin!(compile);

        let result = loop {
            tokio::select! {
                Some(event) = events_rx.recv() => presenter.handle(event),
                result = &mut compile => break result,
                _ = shutdown.recv() => break Ok(()), // Any event, even a drop, will trigger shutdown.
            }
        };

        // deliver what was reported before the compiler stopped
        while let Ok(event) = events_rx.try_recv() {
            presenter.handle(event);
        }

        tracing::debug!("watcher system has shut down");
        result
    }
}

impl Presenter {
    fn handle(&self, event: CompileEvent) {
        match event {
            CompileEvent::Invalidated => {
                self.hmr.send_replace(HmrState::Building);
                if !self.quiet {
                    tracing::info!("{}Compiling...", BUILDING);
                }
            }
            CompileEvent::Done(result) => {
                let stats = match &result {
                    Ok(stats) => stats.clone(),
                    Err(err) => Stats {
                        errors: vec![format!("{err:#}")],
                        ..Default::default()
                    },
                };
                self.hmr.send_replace(HmrState::Built(stats));

                if self.quiet {
                    return;
                }
                if self.clear_console {
                    common::clear_console();
                }
                tracing::info!(
                    "{}Dev server listening at http://localhost:{}",
                    SERVER,
                    self.port
                );
                self.reporter.report(&CompileOutcome::classify(result));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::tests::ScriptedCompiler;
    use crate::compiler::StatsPreset;
    use crate::config::{AppContext, BuildEnvironment, build_config};
    use anyhow::anyhow;
    use std::path::Path;

    fn config() -> Configuration {
        let ctx = AppContext::new_test(Path::new("/work/app"));
        build_config(BuildEnvironment::Development, &ctx).expect("config")
    }

    fn options() -> WatchOptions {
        WatchOptions {
            reporter: Reporter::new(StatsPreset::Development),
            port: 3000,
            clear_console: false,
            dashboard: false,
        }
    }

    #[tokio::test]
    async fn keeps_watching_through_compile_errors() {
        let compiler = ScriptedCompiler::new(vec![
            Ok(Stats {
                errors: vec!["Syntax error".into()],
                ..Default::default()
            }),
            Err(anyhow!("watcher crashed")),
            Ok(Stats {
                hash: Some("fixed".into()),
                ..Default::default()
            }),
        ]);
        let (hmr_tx, hmr_rx) = watch::channel(HmrState::default());
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        WatchSystem::new(compiler, config(), options(), hmr_tx, shutdown_rx)
            .run()
            .await
            .expect("watch");

        assert_eq!(
            *hmr_rx.borrow(),
            HmrState::Built(Stats {
                hash: Some("fixed".into()),
                ..Default::default()
            })
        );
    }

    #[tokio::test]
    async fn fatal_rebuilds_are_forwarded_as_errors() {
        let compiler = ScriptedCompiler::new(vec![Err(anyhow!("out of memory"))]);
        let (hmr_tx, hmr_rx) = watch::channel(HmrState::default());
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        WatchSystem::new(compiler, config(), options(), hmr_tx, shutdown_rx)
            .run()
            .await
            .expect("watch");

        let HmrState::Built(stats) = &*hmr_rx.borrow() else {
            panic!("expected a built state");
        };
        assert_eq!(stats.errors, vec!["out of memory"]);
    }

    #[tokio::test]
    async fn stops_on_shutdown() {
        struct Forever;
        impl Compiler for Forever {
            async fn run(&self, _config: &Configuration) -> Result<Stats> {
                std::future::pending().await
            }
            async fn watch(
                &self,
                _config: &Configuration,
                _events: mpsc::Sender<CompileEvent>,
            ) -> Result<()> {
                std::future::pending().await
            }
        }

        let (hmr_tx, _hmr_rx) = watch::channel(HmrState::default());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(
            WatchSystem::new(Forever, config(), options(), hmr_tx, shutdown_rx).run(),
        );
        drop(shutdown_tx);
        handle.await.expect("join").expect("watch");
    }
}
