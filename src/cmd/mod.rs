pub mod build;
pub mod core;
pub mod eject;
pub mod setup;
pub mod start;

use crate::config::{AppContext, AppPaths, DevServer};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Options shared by all commands.
#[derive(Clone, Debug, Default)]
pub struct Globals {
    /// Debug output is on, the console is never cleared.
    pub debug: bool,
    pub app_dir: Option<PathBuf>,
}

impl Globals {
    /// Resolve the paths of the app, the current directory unless given explicitly.
    pub fn paths(&self) -> Result<AppPaths> {
        let app_dir = match &self.app_dir {
            Some(app_dir) => app_dir.clone(),
            None => std::env::current_dir().context("error getting current dir")?,
        };
        AppPaths::new(&app_dir)
    }

    /// Load the context of the app.
    pub async fn context(
        &self,
        node_env: Option<String>,
        dev_server: DevServer,
    ) -> Result<AppContext> {
        AppContext::load(self.paths()?, node_env, dev_server).await
    }
}
