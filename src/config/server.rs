use super::source;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// File stem of the dev server customization.
pub const SERVER_STEM: &str = "apptime.server";

/// Customization of the dev server, read from `apptime.server.{toml,yaml,yml,json}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerCustomization {
    /// Extra headers added to every response.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, rename = "proxy")]
    pub proxies: Vec<ProxyRoute>,
}

/// A route forwarded to a backend.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProxyRoute {
    /// The URL of the backend to which requests are to be proxied.
    pub backend: String,
    /// An optional URI prefix which is to be used as the base URI for proxying requests, which
    /// defaults to the path of the backend.
    pub rewrite: Option<String>,
}

impl ServerCustomization {
    /// Load the customization of an app, an absent file meaning none.
    pub fn load(app_dir: &Path) -> anyhow::Result<Self> {
        let Some(file) = source::find(app_dir, SERVER_STEM) else {
            return Ok(Self::default());
        };
        tracing::debug!("loading server customization from {}", file.display());
        source::load(&file)
            .with_context(|| format!("Could not parse server file at {}", file.display()))
    }
}
