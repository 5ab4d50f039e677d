//! Discovery and loading of the configuration files a project keeps at its root.

use crate::common::{self, WARNING};
use anyhow::bail;
use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

/// Supported extensions, in lookup order.
const EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Find the first file named `<stem>.<ext>` in a directory.
///
/// A lone `<stem>.js` is never loaded, only reported.
pub fn find(dir: &Path, stem: &str) -> Option<PathBuf> {
    let found = EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file());

    if found.is_none() {
        if let Some(script) = ignored_script(dir, stem) {
            tracing::warn!(
                "{}Ignoring {}, configuration files must be {stem}.toml, {stem}.yaml, {stem}.yml \
                 or {stem}.json",
                WARNING,
                common::strip_prefix(&script).display()
            );
        }
    }

    found
}

fn ignored_script(dir: &Path, stem: &str) -> Option<PathBuf> {
    Some(dir.join(format!("{stem}.js"))).filter(|path| path.is_file())
}

/// Load a document from a file
///
/// Currently supported formats are:
///
/// * TOML
/// * YAML
/// * JSON
pub fn load<T: DeserializeOwned>(file: &Path) -> anyhow::Result<T> {
    match file.extension().map(|s| s.to_string_lossy()).as_deref() {
        Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(file)?)?),
        Some("yaml" | "yml") => Ok(serde_yaml::from_reader(BufReader::new(File::open(file)?))?),
        Some("json") => Ok(serde_json::from_reader(BufReader::new(File::open(file)?))?),

        Some(n) => {
            bail!("Unsupported configuration file type: {n}");
        }
        None => {
            bail!("Missing configuration file extension");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Doc {
        name: String,
    }

    #[test]
    fn never_picks_up_scripts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("apptime.config.dev.js");
        std::fs::write(&script, "module.exports = config => config;").expect("write");

        assert_eq!(find(dir.path(), "apptime.config.dev"), None);
        assert_eq!(ignored_script(dir.path(), "apptime.config.dev"), Some(script));

        std::fs::write(dir.path().join("apptime.config.dev.yaml"), "").expect("write");
        assert_eq!(
            find(dir.path(), "apptime.config.dev"),
            Some(dir.path().join("apptime.config.dev.yaml"))
        );
    }

    #[test]
    fn finds_by_extension_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(find(dir.path(), "apptime.server"), None);

        std::fs::write(dir.path().join("apptime.server.json"), "{}").expect("write");
        std::fs::write(dir.path().join("apptime.server.yml"), "").expect("write");
        assert_eq!(
            find(dir.path(), "apptime.server"),
            Some(dir.path().join("apptime.server.yml"))
        );
    }

    #[test]
    fn loads_every_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (file, content) in [
            ("doc.toml", "name = \"a\""),
            ("doc.yaml", "name: a"),
            ("doc.yml", "name: a"),
            ("doc.json", r#"{"name": "a"}"#),
        ] {
            let path = dir.path().join(file);
            std::fs::write(&path, content).expect("write");
            let doc: Doc = load(&path).expect("load");
            assert_eq!(doc, Doc { name: "a".into() });
        }
    }

    #[test]
    fn rejects_unknown_extensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doc.ini");
        std::fs::write(&path, "name=a").expect("write");
        let err = load::<Doc>(&path).expect_err("must fail");
        assert_eq!(err.to_string(), "Unsupported configuration file type: ini");
    }
}
