use super::{Configurator, Helpers};
use crate::config::{
    Configuration, Devtool, Performance, Plugin, PluginKind, Rule, StaticSiteRender,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The declarative override a project keeps in `apptime.config.{dev,prod,dll}.*`.
///
/// Operations are applied in a fixed order: `devtool`, `entry`, `output`, `define`,
/// `static_site_render`, `remove_plugins`, then the additions (`plugins`, `rules`,
/// `resolve_modules`) and finally `performance`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverride {
    pub devtool: Option<Devtool>,
    /// Bundles to replace, or add.
    #[serde(default)]
    pub entry: BTreeMap<String, Vec<String>>,
    pub output: Option<OutputOverride>,
    /// Merged into the define plugin.
    #[serde(default)]
    pub define: Map<String, Value>,
    /// Replaces the options of the static site render plugin.
    pub static_site_render: Option<StaticSiteRender>,
    #[serde(default)]
    pub remove_plugins: Vec<PluginKind>,
    /// Appended to the plugins.
    #[serde(default)]
    pub plugins: Vec<Plugin>,
    /// Appended to the module rules.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Appended to the module resolution directories.
    #[serde(default)]
    pub resolve_modules: Vec<String>,
    pub performance: Option<Performance>,
}

/// Output settings to change, absent ones stay as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct OutputOverride {
    /// Relative paths resolve against the app root.
    pub path: Option<PathBuf>,
    pub filename: Option<String>,
    pub public_path: Option<String>,
    pub library: Option<String>,
}

impl Configurator for ConfigOverride {
    fn configure(
        &self,
        mut config: Configuration,
        helpers: &Helpers,
    ) -> anyhow::Result<Configuration> {
        if let Some(devtool) = self.devtool {
            config.devtool = devtool;
        }
        config.entry.extend(self.entry.clone());
        if let Some(output) = &self.output {
            if let Some(path) = &output.path {
                config.output.path = path.clone();
            }
            if let Some(filename) = &output.filename {
                config.output.filename = filename.clone();
            }
            if let Some(public_path) = &output.public_path {
                config.output.public_path = Some(public_path.clone());
            }
            if let Some(library) = &output.library {
                config.output.library = Some(library.clone());
            }
        }

        if !self.define.is_empty() {
            config = helpers.define(config, self.define.clone())?;
        }
        if let Some(options) = &self.static_site_render {
            config = helpers.static_site_render(config, options.clone())?;
        }

        config
            .plugins
            .retain(|plugin| !self.remove_plugins.contains(&plugin.kind()));
        config.plugins.extend(self.plugins.iter().cloned());
        config.module.rules.extend(self.rules.iter().cloned());
        config
            .resolve
            .modules
            .extend(self.resolve_modules.iter().cloned());
        if let Some(performance) = &self.performance {
            config.performance = performance.clone();
        }

        Ok(config)
    }
}
