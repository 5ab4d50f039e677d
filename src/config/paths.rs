use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Name of the directory holding intermediate artifacts inside the app.
pub const TEMP_DIR: &str = ".apptime";

/// Resolves paths relative to the app being built, and relative to app-time itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppPaths {
    app_dir: PathBuf,
    own_dir: PathBuf,
}

impl AppPaths {
    /// Create a new instance for an app directory.
    ///
    /// app-time's own root is the parent of the directory holding the executable, which is
    /// where a package manager installs it (`node_modules/app-time/bin/app-time`).
    pub fn new(app_dir: &Path) -> Result<Self> {
        let app_dir = dunce::canonicalize(app_dir).with_context(|| {
            format!(
                "error taking the canonical path to the app directory: {:?}",
                app_dir
            )
        })?;

        let own_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| dunce::canonicalize(exe).ok())
            .and_then(|exe| exe.parent()?.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| app_dir.clone());

        Ok(Self { app_dir, own_dir })
    }

    /// Create an instance with explicit directories.
    #[cfg(test)]
    pub fn with_own_dir(app_dir: impl Into<PathBuf>, own_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            own_dir: own_dir.into(),
        }
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// Resolve a path relative to the app root.
    pub fn resolve_app(&self, path: impl AsRef<Path>) -> PathBuf {
        self.app_dir.join(path)
    }

    /// Resolve a path relative to app-time's own root.
    pub fn resolve_own(&self, path: impl AsRef<Path>) -> PathBuf {
        self.own_dir.join(path)
    }

    pub fn own_node_modules(&self) -> PathBuf {
        self.resolve_own("node_modules")
    }

    pub fn app_node_modules(&self) -> PathBuf {
        self.resolve_app("node_modules")
    }

    /// The dot-prefixed directory holding the vendor DLL, the dev bundle and the compiler bridge.
    pub fn temp_dir(&self) -> PathBuf {
        self.resolve_app(TEMP_DIR)
    }

    pub fn vendor_dll(&self) -> PathBuf {
        self.temp_dir().join("vendor.dll.js")
    }

    pub fn vendor_manifest(&self) -> PathBuf {
        self.temp_dir().join("vendor-manifest.json")
    }

    /// Output of the development compiler.
    pub fn dev_output(&self) -> PathBuf {
        self.temp_dir().join("dev")
    }

    pub fn bridge_dir(&self) -> PathBuf {
        self.temp_dir().join("bridge")
    }

    pub fn package_json(&self) -> PathBuf {
        self.resolve_app("package.json")
    }
}
