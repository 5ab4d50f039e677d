//! The configuration model
//!
//! This is the build intent handed to the bundler. It serializes to the shape webpack expects,
//! with plugins expressed as tagged descriptors instead of plugin instances.

mod plugin;

pub use plugin::*;


use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use strum::{Display, EnumString};

/// A bundler configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub devtool: Devtool,
    /// The base directory for resolving entry points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PathBuf>,
    /// Bundle name to the modules making up the bundle, in order.
    pub entry: BTreeMap<String, Vec<String>>,
    pub output: Output,
    /// Plugins, in the order the bundler applies them.
    #[serde(default)]
    pub plugins: Vec<Plugin>,
    #[serde(default)]
    pub module: Module,
    #[serde(default)]
    pub resolve: Resolve,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_loader: Option<Resolve>,
    pub performance: Performance,
}

impl Configuration {
    /// The first plugin of the given kind.
    #[cfg(test)]
    pub fn plugin(&self, kind: PluginKind) -> Option<&Plugin> {
        self.plugins.iter().find(|plugin| plugin.kind() == kind)
    }

    pub fn plugin_mut(&mut self, kind: PluginKind) -> Option<&mut Plugin> {
        self.plugins.iter_mut().find(|plugin| plugin.kind() == kind)
    }

    /// The kinds of all plugins, in order.
    pub fn plugin_kinds(&self) -> Vec<PluginKind> {
        self.plugins.iter().map(Plugin::kind).collect()
    }
}

/// How debug information is emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Devtool {
    Eval,
    CheapEvalSourceMap,
    CheapModuleEvalSourceMap,
    EvalSourceMap,
    CheapSourceMap,
    CheapModuleSourceMap,
    SourceMap,
    HiddenSourceMap,
    NosourcesSourceMap,
}

/// Where and how bundles are written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub path: PathBuf,
    /// File name pattern, e.g. `[name].js`.
    pub filename: String,
    /// The base URL bundles are served from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
    /// Name of the global variable a library bundle is exposed as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Match pattern to loader chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Regular expression matched against the module path.
    pub test: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<PathBuf>,
    /// Loaders, applied last to first.
    #[serde(rename = "use")]
    pub loaders: Vec<Loader>,
    /// Extract the output of the chain into a separate stylesheet.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub extract: bool,
}

impl Rule {
    pub fn new(test: impl Into<String>, loaders: impl IntoIterator<Item = Loader>) -> Self {
        Self {
            test: test.into(),
            exclude: None,
            loaders: loaders.into_iter().collect(),
            extract: false,
        }
    }

    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude = Some(path.into());
        self
    }

    pub fn extract(mut self, extract: bool) -> Self {
        self.extract = extract;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Loader {
    pub loader: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl Loader {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: None,
        }
    }

    pub fn with_options(loader: impl Into<String>, options: Value) -> Self {
        Self {
            loader: loader.into(),
            options: Some(options),
        }
    }
}

/// Directories searched when resolving modules or loaders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolve {
    #[serde(default)]
    pub modules: Vec<String>,
}

/// Asset size warning thresholds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub hints: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entrypoint_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_asset_size: Option<u64>,
}

impl Performance {
    /// Warnings off, with generous thresholds.
    pub fn quiet() -> Self {
        const TWENTY_MB: u64 = 20_000_000;
        Self {
            hints: false,
            max_entrypoint_size: Some(TWENTY_MB),
            max_asset_size: Some(TWENTY_MB),
        }
    }

    pub fn hints() -> Self {
        Self {
            hints: true,
            max_entrypoint_size: None,
            max_asset_size: None,
        }
    }
}
