use anyhow::{Context, Result, ensure};
use std::io::ErrorKind;
use std::path::Path;

/// Name of the page template at the app root.
pub const TEMPLATE_FILE: &str = "template.html";

const BUNDLE: &str = "{{bundle}}";
const VENDOR: &str = "{{vendor}}";
const DOCTYPE: &str = "<!doctype html>";

const DEFAULT_SHELL: &str = r#"<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
  </head>
  <body>
    <div id="root"></div>
    <script src="{{vendor}}"></script>
    <script src="{{bundle}}"></script>
  </body>
</html>
"#;

/// The HTML shell served for every page of the app in development.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageTemplate {
    source: String,
}

impl PageTemplate {
    /// Load `template.html` from the app root, falling back to the built-in shell.
    pub async fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join(TEMPLATE_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(source) => {
                tracing::debug!("using page template {}", path.display());
                Self::new(source).with_context(|| {
                    format!("Could not parse template file at {}", path.display())
                })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err)
                .with_context(|| format!("Could not read template file at {}", path.display())),
        }
    }

    pub fn new(source: String) -> Result<Self> {
        ensure!(
            source.contains(BUNDLE),
            "the template has no {BUNDLE} placeholder"
        );
        Ok(Self { source })
    }

    /// Render the page, prefixed by the doctype unless the template declares one.
    pub fn render(&self, bundle: &str, vendor: &str) -> String {
        let html = self
            .source
            .replace(BUNDLE, bundle)
            .replace(VENDOR, vendor);
        let declared = html
            .trim_start()
            .get(..DOCTYPE.len())
            .is_some_and(|start| start.eq_ignore_ascii_case(DOCTYPE));
        if declared {
            html
        } else {
            format!("{DOCTYPE}{html}")
        }
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_SHELL.to_string(),
        }
    }
}
