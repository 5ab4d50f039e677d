use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use strum::{Display, EnumString};

/// A plugin descriptor, identified by its kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "options", rename_all = "kebab-case")]
pub enum Plugin {
    HotModuleReplacement,
    NoEmitOnErrors,
    LoaderOptions(LoaderOptions),
    Define(Definitions),
    DllReference(DllReference),
    Dll(Dll),
    CssExtraction(CssExtraction),
    Minify(Minify),
    StaticSiteRender(StaticSiteRender),
    CommonsChunk(CommonsChunk),
    Manifest(Manifest),
    BundleAnalyzer(BundleAnalyzer),
    Dashboard(Dashboard),
}

/// The discriminant of a [`Plugin`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PluginKind {
    HotModuleReplacement,
    NoEmitOnErrors,
    LoaderOptions,
    Define,
    DllReference,
    Dll,
    CssExtraction,
    Minify,
    StaticSiteRender,
    CommonsChunk,
    Manifest,
    BundleAnalyzer,
    Dashboard,
}

impl Plugin {
    pub fn kind(&self) -> PluginKind {
        match self {
            Self::HotModuleReplacement => PluginKind::HotModuleReplacement,
            Self::NoEmitOnErrors => PluginKind::NoEmitOnErrors,
            Self::LoaderOptions(_) => PluginKind::LoaderOptions,
            Self::Define(_) => PluginKind::Define,
            Self::DllReference(_) => PluginKind::DllReference,
            Self::Dll(_) => PluginKind::Dll,
            Self::CssExtraction(_) => PluginKind::CssExtraction,
            Self::Minify(_) => PluginKind::Minify,
            Self::StaticSiteRender(_) => PluginKind::StaticSiteRender,
            Self::CommonsChunk(_) => PluginKind::CommonsChunk,
            Self::Manifest(_) => PluginKind::Manifest,
            Self::BundleAnalyzer(_) => PluginKind::BundleAnalyzer,
            Self::Dashboard(_) => PluginKind::Dashboard,
        }
    }
}

/// Options handed to every loader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoaderOptions {
    #[serde(default)]
    pub minimize: bool,
    pub options: Value,
}

/// Compile time constants, expression to replacement code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Definitions(pub Map<String, Value>);

impl Definitions {
    /// Define `process.env.NODE_ENV`.
    pub fn node_env(node_env: &str) -> Self {
        let mut env = Map::new();
        // the replacement is code, so the value is a JSON string literal
        let literal = Value::String(node_env.to_string()).to_string();
        env.insert("NODE_ENV".into(), Value::String(literal));
        let mut definitions = Map::new();
        definitions.insert("process.env".into(), Value::Object(env));
        Self(definitions)
    }

    /// Add definitions, replacing the value of keys already present.
    pub fn merge(&mut self, definitions: Map<String, Value>) {
        self.0.extend(definitions);
    }
}

/// Reference a prebuilt DLL instead of bundling its modules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DllReference {
    pub context: PathBuf,
    pub manifest: PathBuf,
}

/// Emit a DLL manifest next to the DLL bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dll {
    pub path: PathBuf,
    pub name: String,
}

/// Extract stylesheets into their own files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssExtraction {
    pub filename: String,
    #[serde(default)]
    pub all_chunks: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Minify {
    #[serde(default)]
    pub source_map: bool,
    #[serde(default)]
    pub screw_ie8: bool,
    /// Report compressor warnings.
    #[serde(default)]
    pub warnings: bool,
}

/// Pre-render the routes of the app into static HTML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSiteRender {
    pub routes: PathBuf,
    pub template: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redux_store: Option<PathBuf>,
}

/// Split shared modules into a common chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonsChunk {
    pub name: String,
    /// Only move modules coming from `node_modules`.
    #[serde(default)]
    pub node_modules_only: bool,
}

/// Emit a manifest of the emitted assets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub file_name: String,
}

/// Emit a report of the bundle composition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleAnalyzer {
    pub analyzer_mode: String,
    pub report_filename: String,
    #[serde(default)]
    pub open_analyzer: bool,
}

/// Feed build progress into the terminal dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}
