//! The files an eject copies into the app.

use crate::compiler::{COMPILE_JS, PLUGINS_JS};
use crate::config::{self, AppContext, BuildEnvironment, PRODUCTION};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

#[allow(clippy::expect_used)]
static ON_EJECT_REGION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)// @remove-on-eject-begin.*?// @remove-on-eject-end")
        .expect("valid marker regex")
});

/// Where the content of a file comes from.
#[derive(Clone, Copy, Debug)]
pub enum Origin {
    /// A script shipped with app-time.
    Template(&'static str),
    /// The resolved configuration of an environment.
    Generated(BuildEnvironment),
}

/// A file to write, relative to the eject directory.
#[derive(Clone, Debug)]
pub struct Entry {
    pub path: PathBuf,
    pub origin: Origin,
}

impl Entry {
    fn template(path: &str, source: &'static str) -> Self {
        Self {
            path: PathBuf::from(path),
            origin: Origin::Template(source),
        }
    }

    fn generated(environment: BuildEnvironment) -> Self {
        Self {
            path: PathBuf::from("config")
                .join(format!("webpack.config.{}.json", environment.short_name())),
            origin: Origin::Generated(environment),
        }
    }

    /// Produce the content of the file.
    pub fn render(&self, ctx: &AppContext) -> anyhow::Result<String> {
        match self.origin {
            Origin::Template(source) => Ok(strip_markers(source)),
            Origin::Generated(environment) => {
                let mut ctx = ctx.clone();
                if environment == BuildEnvironment::Production {
                    // the ejected build script runs with NODE_ENV=production
                    ctx.node_env = Some(PRODUCTION.to_string());
                }
                let config = config::resolve(environment, &ctx)?;
                Ok(serde_json::to_string_pretty(&config)? + "\n")
            }
        }
    }
}

/// Every file of an eject, in the order they are written.
pub fn entries() -> Vec<Entry> {
    vec![
        Entry::generated(BuildEnvironment::Development),
        Entry::generated(BuildEnvironment::Production),
        Entry::generated(BuildEnvironment::Vendor),
        Entry::template(
            "config/stats.js",
            include_str!("../../templates/config/stats.js"),
        ),
        Entry::template("utils/compile.js", COMPILE_JS),
        Entry::template("utils/plugins.js", PLUGINS_JS),
        Entry::template(
            "utils/clearConsole.js",
            include_str!("../../templates/utils/clearConsole.js"),
        ),
        Entry::template(
            "utils/paths.js",
            include_str!("../../templates/utils/paths.js"),
        ),
        Entry::template(
            "scripts/build.js",
            include_str!("../../templates/scripts/build.js"),
        ),
        Entry::template(
            "scripts/start.js",
            include_str!("../../templates/scripts/start.js"),
        ),
        Entry::template(
            "scripts/setup.js",
            include_str!("../../templates/scripts/setup.js"),
        ),
    ]
}

/// Remove every `remove-on-eject` region, then trim, ending with a single newline.
pub fn strip_markers(source: &str) -> String {
    let stripped = ON_EJECT_REGION.replace_all(source, "");
    format!("{}\n", stripped.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_shortest_regions() {
        let source = "\nkeep a\n// @remove-on-eject-begin\ndrop\n// @remove-on-eject-end\nkeep b\n\
                      // @remove-on-eject-begin\ndrop too\n// @remove-on-eject-end\n\n";
        assert_eq!(strip_markers(source), "keep a\n\nkeep b\n");
    }

    #[test]
    fn keeps_unmarked_sources() {
        assert_eq!(strip_markers("  module.exports = {};  "), "module.exports = {};\n");
    }

    #[test]
    fn bridge_protocol_is_stripped() {
        let compile = strip_markers(COMPILE_JS);
        assert!(!compile.contains("@@apptime:"));
        assert!(compile.contains("module.exports"));
    }

    #[test]
    fn scripts_find_generated_configs() {
        let entries = entries();
        for environment in ["dev", "prod", "dll"] {
            let path = PathBuf::from(format!("config/webpack.config.{environment}.json"));
            assert!(entries.iter().any(|entry| entry.path == path), "{path:?}");
        }
    }
}
