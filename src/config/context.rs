use super::{AppPaths, vendor};
use anyhow::{Context, Result};
use std::io::ErrorKind;

/// Where the dev server can be reached from the browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DevServer {
    /// The port to listen on.
    pub port: u16,
    /// The public host, as used in script tags and the hot-reload client, e.g. `//localhost:3000/`.
    pub host: String,
}

impl DevServer {
    /// Create a new instance. An explicit `host` takes precedence over `hostname` and `port`.
    pub fn new(port: u16, hostname: &str, host: Option<String>) -> Self {
        let host = host.unwrap_or_else(|| format!("//{hostname}:{port}/"));
        Self { port, host }
    }

    /// The event stream the hot-reload client connects to.
    pub fn hmr_path(&self) -> String {
        format!("{}__webpack_hmr", self.host)
    }
}

impl Default for DevServer {
    fn default() -> Self {
        Self::new(3000, "localhost", None)
    }
}

/// Everything the configuration builder needs to know about the app.
#[derive(Clone, Debug)]
pub struct AppContext {
    pub paths: AppPaths,
    /// Libraries to prebuild into the vendor DLL.
    pub vendor_libs: Vec<String>,
    /// `NODE_ENV` as captured at the entry point.
    pub node_env: Option<String>,
    pub dev_server: DevServer,
    /// Emit a bundle composition report.
    pub analyze: bool,
    /// Render the live terminal dashboard.
    pub dashboard: bool,
}

impl AppContext {
    /// Create a context for an app, reading its `package.json` if there is one.
    pub async fn load(
        paths: AppPaths,
        node_env: Option<String>,
        dev_server: DevServer,
    ) -> Result<Self> {
        let package_json = paths.package_json();
        let vendor_libs = match tokio::fs::read(&package_json).await {
            Ok(data) => {
                let package = serde_json::from_slice(&data).with_context(|| {
                    format!("error parsing {}", package_json.display())
                })?;
                vendor::vendor_libs(&package)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("no package.json found, using default vendor libs");
                vendor::default_vendor_libs()
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("error reading {}", package_json.display()));
            }
        };

        Ok(Self {
            paths,
            vendor_libs,
            node_env,
            dev_server,
            analyze: false,
            dashboard: false,
        })
    }

    /// Create a context for testing.
    #[cfg(test)]
    pub fn new_test(app_dir: &std::path::Path) -> Self {
        Self {
            paths: AppPaths::with_own_dir(app_dir, "/opt/app-time"),
            vendor_libs: vendor::default_vendor_libs(),
            node_env: Some(super::environment::PRODUCTION.to_string()),
            dev_server: DevServer::default(),
            analyze: false,
            dashboard: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_host_defaults() {
        let server = DevServer::new(4000, "10.0.2.2", None);
        assert_eq!(server.host, "//10.0.2.2:4000/");
        assert_eq!(server.hmr_path(), "//10.0.2.2:4000/__webpack_hmr");
    }

    #[test]
    fn explicit_dev_host_wins() {
        let server = DevServer::new(4000, "10.0.2.2", Some("//example.test/".into()));
        assert_eq!(server.host, "//example.test/");
        assert_eq!(server.port, 4000);
    }

    #[tokio::test]
    async fn reads_vendor_libs_from_package() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(
            dir.path().join("package.json"),
            r#"{"name": "app", "apptime": {"vendorLibs": ["preact"]}}"#,
        )
        .await
        .expect("write package.json");

        let ctx = AppContext::load(
            AppPaths::with_own_dir(dir.path(), "/opt/app-time"),
            None,
            DevServer::default(),
        )
        .await
        .expect("context");
        assert_eq!(ctx.vendor_libs, vec!["preact"]);
    }

    #[tokio::test]
    async fn missing_package_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = AppContext::load(
            AppPaths::with_own_dir(dir.path(), "/opt/app-time"),
            None,
            DevServer::default(),
        )
        .await
        .expect("context");
        assert_eq!(ctx.vendor_libs, vendor::default_vendor_libs());
    }

    #[tokio::test]
    async fn broken_package_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("package.json"), "{ nope")
            .await
            .expect("write package.json");
        let err = AppContext::load(
            AppPaths::with_own_dir(dir.path(), "/opt/app-time"),
            None,
            DevServer::default(),
        )
        .await
        .expect_err("must fail");
        assert!(err.to_string().starts_with("error parsing"));
    }
}
