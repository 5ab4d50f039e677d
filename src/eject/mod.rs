//! Copying the build scripts & configuration into the app, for good.
//!
//! Nothing is written when any destination already exists, or when the app's configuration or
//! `package.json` can't be read. Failures while writing are not rolled back.

mod manifest;
mod package;

#[cfg(test)]
mod test;

use crate::common;
use crate::config::AppContext;
use manifest::{Entry, entries};
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Directory of the app receiving the ejected files.
pub const OUT_DIR: &str = "apptime";

#[derive(Debug, thiserror::Error)]
pub enum EjectError {
    #[error("{}", conflicts_message(.0))]
    Conflicts(Vec<PathBuf>),
    #[error("error rendering {}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error("error writing {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error updating {}", path.display())]
    Package {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

fn conflicts_message(conflicts: &[PathBuf]) -> String {
    conflicts
        .iter()
        .map(|path| {
            format!(
                "`{}` already exists in your app folder. We cannot continue as you would lose all \
                 the changes in that file or directory. Please delete it (maybe make a copy for \
                 backup) and run this command again.",
                path.display()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ejects the tool from an app.
pub struct Ejector<'a> {
    ctx: &'a AppContext,
    dry_run: bool,
}

impl<'a> Ejector<'a> {
    pub fn new(ctx: &'a AppContext, dry_run: bool) -> Self {
        Self { ctx, dry_run }
    }

    /// Where an entry lands in the app.
    pub fn destination(&self, entry: &Entry) -> PathBuf {
        self.ctx.paths.resolve_app(OUT_DIR).join(&entry.path)
    }

    /// Run the eject, returning every file written (or, in a dry run, that would be written).
    #[tracing::instrument(level = "trace", skip(self), fields(dry_run = self.dry_run))]
    pub async fn run(&self) -> Result<Vec<PathBuf>, EjectError> {
        let entries = entries();

        let mut conflicts = Vec::new();
        for entry in &entries {
            let destination = self.destination(entry);
            if common::path_exists(&destination).await.unwrap_or(true) {
                conflicts.push(destination);
            }
        }
        if !conflicts.is_empty() {
            return Err(EjectError::Conflicts(conflicts));
        }

        // Everything that depends on the app's own files is prepared before the first write.
        let mut files = Vec::with_capacity(entries.len() + 1);
        for entry in &entries {
            let content = entry
                .render(self.ctx)
                .map_err(|source| EjectError::Render {
                    path: entry.path.clone(),
                    source,
                })?;
            files.push((self.destination(entry), content));
        }
        let package_json = self.ctx.paths.package_json();
        let package = self
            .updated_package(&package_json)
            .await
            .map_err(|source| EjectError::Package {
                path: package_json.clone(),
                source,
            })?;

        let mut written = Vec::with_capacity(files.len() + 1);
        for (destination, content) in files {
            self.write_new(&destination, &content)
                .await
                .map_err(|source| EjectError::Write {
                    path: destination.clone(),
                    source,
                })?;
            written.push(destination);
        }

        self.write_package(&package_json, &package)
            .await
            .map_err(|source| EjectError::Write {
                path: package_json.clone(),
                source,
            })?;
        written.push(package_json);

        Ok(written)
    }

    /// Create a file, failing if it exists.
    async fn write_new(&self, path: &Path, content: &str) -> io::Result<()> {
        if self.dry_run {
            tracing::info!("DRY RUN: Not writing file {}", path.display());
            return Ok(());
        }

        tracing::info!("Writing {}", common::strip_prefix(path).display());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await
    }

    /// The app's `package.json`, ejected.
    async fn updated_package(&self, path: &Path) -> anyhow::Result<String> {
        let data = tokio::fs::read(path).await?;
        let mut manifest = serde_json::from_slice(&data)?;
        package::transform(&mut manifest)?;
        package::to_string(&manifest)
    }

    async fn write_package(&self, path: &Path, content: &str) -> io::Result<()> {
        if self.dry_run {
            tracing::info!("DRY RUN: Not writing file {}", path.display());
            return Ok(());
        }
        tracing::info!("Writing {}", common::strip_prefix(path).display());
        tokio::fs::write(path, content).await
    }
}
