//! Startup sweep of orphaned project directories.
//!
//! A request that crashes (or a process that is killed) before cleanup leaves
//! its project in the temp root. The sweep runs once per process, on the first
//! project creation, and deletes prefixed entries older than an hour.

use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::project::PROJECT_PREFIX;

/// Entries younger than this may still belong to a live request.
pub const ORPHAN_MAX_AGE: Duration = Duration::from_secs(60 * 60);

static SWEPT: OnceCell<SweepReport> = OnceCell::const_new();

/// Counts of what a sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

/// Removes stale project directories from a root directory.
#[derive(Debug, Clone)]
pub struct OrphanReaper {
    root: PathBuf,
    prefix: String,
    max_age: Duration,
}

impl OrphanReaper {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: PROJECT_PREFIX.to_string(),
            max_age: ORPHAN_MAX_AGE,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Delete every prefixed entry older than the max age.
    ///
    /// Never fails: a listing error yields an empty report, and a bad entry
    /// is counted in [`SweepReport::failed`] without stopping the sweep.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Failed to list {} - {err}", self.root.display());
                return report;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!("Failed to read entry in {} - {err}", self.root.display());
                    report.failed += 1;
                    break;
                }
            };
            if !entry.file_name().to_string_lossy().starts_with(&self.prefix) {
                continue;
            }

            let path = entry.path();
            match self.reap(&path).await {
                Ok(true) => {
                    debug!("Removed orphaned project {}", path.display());
                    report.removed += 1;
                }
                Ok(false) => {}
                Err(err) => {
                    warn!("Failed to reap {} - {err}", path.display());
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Remove `path` if it is stale. Returns whether it was removed.
    async fn reap(&self, path: &Path) -> std::io::Result<bool> {
        let metadata = tokio::fs::symlink_metadata(path).await?;
        let age = SystemTime::now()
            .duration_since(metadata.modified()?)
            .unwrap_or_default();
        if age < self.max_age {
            return Ok(false);
        }

        if metadata.is_dir() {
            tokio::fs::remove_dir_all(path).await?;
        } else {
            tokio::fs::remove_file(path).await?;
        }
        Ok(true)
    }
}

/// Sweep the OS temp directory, at most once per process.
///
/// Concurrent callers wait for the single sweep instead of starting their own.
pub async fn sweep_once() -> SweepReport {
    *SWEPT
        .get_or_init(|| async {
            let report = OrphanReaper::new(std::env::temp_dir()).sweep().await;
            info!(
                "Orphan sweep removed {} project(s), {} failure(s)",
                report.removed, report.failed
            );
            report
        })
        .await
}
