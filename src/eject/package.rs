//! Rewrites the app's `package.json` for a life without app-time.

use super::OUT_DIR;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// What the ejected scripts need at runtime.
pub const EJECT_DEPENDENCIES: &[(&str, &str)] = &[
    ("autoprefixer", "^6.7.2"),
    ("babel-core", "^6.23.1"),
    ("babel-loader", "^6.3.2"),
    ("babel-polyfill", "^6.23.0"),
    ("babel-preset-react", "^6.23.0"),
    ("babel-preset-react-hmre", "^1.1.1"),
    ("css-loader", "^0.26.1"),
    ("express", "^4.14.1"),
    ("extract-text-webpack-plugin", "^2.0.0"),
    ("file-loader", "^0.10.0"),
    ("postcss-loader", "^1.3.0"),
    ("react-static-webpack-plugin", "^2.1.1"),
    ("rupture", "^0.6.2"),
    ("style-loader", "^0.13.1"),
    ("stylus", "^0.54.5"),
    ("stylus-loader", "^2.4.0"),
    ("url-loader", "^0.5.7"),
    ("webpack", "^2.2.1"),
    ("webpack-bundle-analyzer", "^2.3.0"),
    ("webpack-dashboard", "^0.3.0"),
    ("webpack-dev-middleware", "^1.10.0"),
    ("webpack-hot-middleware", "^2.17.0"),
    ("webpack-manifest-plugin", "^1.1.0"),
];

#[allow(clippy::expect_used)]
static SCRIPT_INVOCATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"app-time (\w+)").expect("valid script regex"));

/// Apply the eject to a parsed `package.json`.
pub fn transform(package: &mut Value) -> Result<()> {
    let package = package
        .as_object_mut()
        .context("package.json must contain an object")?;

    let dev_dependencies = package
        .entry("devDependencies")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .context("devDependencies of package.json must be an object")?;
    for (name, version) in EJECT_DEPENDENCIES {
        tracing::info!("Adding dependency \"{name}\"");
        dev_dependencies.insert(name.to_string(), Value::String(version.to_string()));
    }

    if let Some(scripts) = package.get_mut("scripts").and_then(Value::as_object_mut) {
        tracing::info!("Updating scripts");
        scripts.remove("eject");
        for script in scripts.values_mut() {
            if let Value::String(command) = script {
                *command = rewrite_script(command);
            }
        }
    }

    Ok(())
}

/// Point `app-time <verb>` invocations at the ejected scripts.
pub fn rewrite_script(command: &str) -> String {
    SCRIPT_INVOCATION
        .replace_all(command, format!("node {OUT_DIR}/scripts/$1.js"))
        .into_owned()
}

/// Serialize the way npm does.
pub fn to_string(package: &Value) -> Result<String> {
    serde_json::to_string_pretty(package).context("error serializing package.json")
}
