//! Project specific transformations of the base configuration.
//!
//! A project customizes its build with a [`Configurator`], receiving the base configuration and
//! the [`Helpers`], returning the configuration to compile. On disk, this is a declarative
//! [`ConfigOverride`] next to the `package.json`.

mod schema;


pub use schema::*;

use super::{
    Configuration, Plugin, PluginKind, StaticSiteRender,
    builder::{HOT_CLIENT, POLYFILL_ENTRY},
    source,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("Could not parse config file at {}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("Could not apply config file at {}", path.display())]
    Apply {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("the configuration has no {0} plugin")]
    PluginNotFound(PluginKind),
}

/// Transforms a configuration.
pub trait Configurator {
    fn configure(&self, config: Configuration, helpers: &Helpers)
    -> anyhow::Result<Configuration>;
}

impl<F> Configurator for F
where
    F: Fn(Configuration, &Helpers) -> anyhow::Result<Configuration>,
{
    fn configure(
        &self,
        config: Configuration,
        helpers: &Helpers,
    ) -> anyhow::Result<Configuration> {
        self(config, helpers)
    }
}

/// What a configurator gets handed next to the configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Helpers {
    /// The hot reload client entry, only present in development.
    pub hmr_entry: Option<String>,
    pub polyfill_entry: Option<String>,
}

impl Helpers {
    /// Derive the helpers from a base configuration.
    pub fn from_config(config: &Configuration) -> Self {
        let modules = || config.entry.values().flatten();
        Self {
            hmr_entry: modules()
                .find(|module| module.starts_with(HOT_CLIENT))
                .cloned(),
            polyfill_entry: modules()
                .find(|module| module.as_str() == POLYFILL_ENTRY)
                .cloned(),
        }
    }

    /// Merge definitions into the define plugin, keys already defined are overwritten.
    pub fn define(
        &self,
        mut config: Configuration,
        definitions: Map<String, Value>,
    ) -> Result<Configuration, OverrideError> {
        match config.plugin_mut(PluginKind::Define) {
            Some(Plugin::Define(current)) => {
                current.merge(definitions);
                Ok(config)
            }
            _ => Err(OverrideError::PluginNotFound(PluginKind::Define)),
        }
    }

    /// Replace the options of the static site render plugin.
    pub fn static_site_render(
        &self,
        mut config: Configuration,
        options: StaticSiteRender,
    ) -> Result<Configuration, OverrideError> {
        match config.plugin_mut(PluginKind::StaticSiteRender) {
            Some(plugin) => {
                *plugin = Plugin::StaticSiteRender(options);
                Ok(config)
            }
            None => Err(OverrideError::PluginNotFound(PluginKind::StaticSiteRender)),
        }
    }
}

/// Find the override file of an environment, by its stem.
pub fn locate_override(dir: &Path, stem: &str) -> Option<PathBuf> {
    source::find(dir, stem)
}

/// Apply the override found at `override_file` to the base configuration.
///
/// Without an override file, the base configuration is returned unchanged. The result of the
/// override is not validated any further.
pub fn apply_user_override(
    base: Configuration,
    helpers: &Helpers,
    override_file: Option<&Path>,
) -> Result<Configuration, OverrideError> {
    let Some(path) = override_file else {
        return Ok(base);
    };

    tracing::info!("applying config overrides from {}", path.display());
    let configurator: ConfigOverride =
        source::load(path).map_err(|err| OverrideError::Load {
            path: path.to_path_buf(),
            source: err.into(),
        })?;

    configurator
        .configure(base, helpers)
        .map_err(|err| OverrideError::Apply {
            path: path.to_path_buf(),
            source: err.into(),
        })
}
