//! One-shot builds.

use crate::compiler::{CompileOutcome, Compiler, Reporter};
use crate::config::Configuration;
use std::process::ExitCode;

/// A system used for running a single compilation & reporting its outcome.
///
/// Both `build` and `setup` are one-shot compilations, only differing in their configuration
/// and in how the outcome is presented.
pub struct BuildSystem<C> {
    compiler: C,
    reporter: Reporter,
}

impl<C: Compiler> BuildSystem<C> {
    pub fn new(compiler: C, reporter: Reporter) -> Self {
        Self { compiler, reporter }
    }

    /// Compile, report and classify.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn build(&self, config: &Configuration) -> CompileOutcome {
        let outcome = CompileOutcome::classify(self.compiler.run(config).await);
        self.reporter.report(&outcome);
        outcome
    }

    /// Compile, returning the exit code of the outcome.
    pub async fn run(&self, config: &Configuration) -> ExitCode {
        self.build(config).await.exit_code()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::compiler::{CompileEvent, Stats, StatsPreset};
    use anyhow::{Result, anyhow};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    /// A compiler replaying canned results.
    #[derive(Default)]
    pub struct ScriptedCompiler {
        pub results: Mutex<Vec<Result<Stats>>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedCompiler {
        pub fn new(results: Vec<Result<Stats>>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: AtomicUsize::new(0),
            }
        }

        fn next(&self) -> Result<Stats> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().expect("lock");
            if results.is_empty() {
                Err(anyhow!("no more results"))
            } else {
                results.remove(0)
            }
        }
    }

    impl Compiler for ScriptedCompiler {
        async fn run(&self, _config: &Configuration) -> Result<Stats> {
            self.next()
        }

        async fn watch(
            &self,
            _config: &Configuration,
            events: mpsc::Sender<CompileEvent>,
        ) -> Result<()> {
            loop {
                if self.results.lock().expect("lock").is_empty() {
                    return Ok(());
                }
                let result = self.next();
                if events.send(CompileEvent::Invalidated).await.is_err()
                    || events.send(CompileEvent::Done(result)).await.is_err()
                {
                    return Ok(());
                }
            }
        }
    }

    fn config() -> Configuration {
        let ctx = crate::config::AppContext::new_test(std::path::Path::new("/work/app"));
        crate::config::build_config(crate::config::BuildEnvironment::Vendor, &ctx)
            .expect("config")
    }

    fn system(results: Vec<Result<Stats>>) -> BuildSystem<ScriptedCompiler> {
        BuildSystem::new(
            ScriptedCompiler::new(results),
            Reporter::new(StatsPreset::Production),
        )
    }

    #[tokio::test]
    async fn fatal_compiler_fails_the_build() {
        let system = system(vec![Err(anyhow!("out of memory"))]);
        let outcome = system.build(&config()).await;
        assert!(matches!(outcome, CompileOutcome::FatalError(_)));
        assert_eq!(outcome.code(), 1);
    }

    #[tokio::test]
    async fn warnings_do_not_fail_the_build() {
        let system = system(vec![Ok(Stats {
            warnings: vec!["asset size limit".into()],
            ..Default::default()
        })]);
        let outcome = system.build(&config()).await;
        assert_eq!(outcome.code(), 0);
        assert_eq!(system.compiler.calls.load(Ordering::SeqCst), 1);
    }
}
