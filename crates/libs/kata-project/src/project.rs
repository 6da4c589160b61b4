//! Ephemeral project provisioning.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::prelude::*;
use crate::reaper;

/// Name prefix shared by every ephemeral project directory.
///
/// The reaper only ever touches entries carrying this prefix.
pub const PROJECT_PREFIX: &str = "kata-project-";

/// Package name written to every manifest.
pub const PACKAGE_NAME: &str = "kata_submission";

const MANIFEST: &str = r#"[package]
name = "kata_submission"
version = "0.1.0"
edition = "2021"

[dependencies]

[workspace]
"#;

/// A short-lived cargo project holding one submission.
///
/// Owned by exactly one request. Call [`EphemeralProject::cleanup`] when done;
/// if the value is dropped without it (early return, panic) the directory is
/// removed on drop, on the blocking pool when a runtime is available.
#[derive(Debug)]
pub struct EphemeralProject {
    path: PathBuf,
    removed: bool,
}

impl EphemeralProject {
    /// Provision a project under the OS temp directory.
    ///
    /// The first call in the process also sweeps orphaned projects left there
    /// by earlier runs.
    pub async fn create(source: &str) -> Result<Self> {
        reaper::sweep_once().await;
        Self::create_in(&std::env::temp_dir(), source).await
    }

    /// Provision a project under `root`.
    ///
    /// `source` is written verbatim to `src/main.rs`.
    pub async fn create_in(root: &Path, source: &str) -> Result<Self> {
        let path = root.join(format!("{PROJECT_PREFIX}{}", Uuid::new_v4().simple()));
        tokio::fs::create_dir(&path).await?;

        // From here on a failed write removes the directory through Drop
        let project = Self {
            path,
            removed: false,
        };
        tokio::fs::write(project.manifest_path(), MANIFEST).await?;
        tokio::fs::create_dir(project.path.join("src")).await?;
        tokio::fs::write(project.source_path(), source).await?;

        debug!("Created project {}", project.path.display());
        Ok(project)
    }

    /// Absolute path of the project directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join("Cargo.toml")
    }

    pub fn source_path(&self) -> PathBuf {
        self.path.join("src").join("main.rs")
    }

    /// Remove the project directory.
    ///
    /// Best effort: failures are logged and otherwise ignored.
    pub async fn cleanup(mut self) {
        self.removed = true;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => debug!("Removed project {}", self.path.display()),
            Err(err) => warn!("Failed to remove project {} - {err}", self.path.display()),
        }
    }
}

impl Drop for EphemeralProject {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        let path = std::mem::take(&mut self.path);
        // remove_dir_all blocks, keep it off the async workers
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_now(&path));
            }
            Err(_) => remove_now(&path),
        }
    }
}

fn remove_now(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!("Removed dropped project {}", path.display()),
        Err(err) => warn!("Failed to remove project {} - {err}", path.display()),
    }
}
