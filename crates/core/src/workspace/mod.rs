//! Scratch workspace for a single pipeline run.
//!
//! A [`Workspace`] is an explicit handle on one directory. It is cleared at the
//! start of every run and holds the quantification table plus every file the
//! analysis stages produce. Filenames are derived from the region identifier
//! by [`RegionFiles`], so stages agree on them without listing the directory.

mod error;
mod files;

pub use error::WorkspaceError;
pub use files::RegionFiles;

use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle on a run's scratch directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    /// Creates a handle for the given directory. Nothing is touched on disk.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The workspace directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Joins a workspace-relative file name onto the directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Deterministic file names for a region.
    pub fn region_files(&self, region: &str) -> RegionFiles {
        RegionFiles::new(region)
    }

    /// Creates the directory if needed and removes everything inside it.
    pub async fn prepare(&self) -> Result<(), WorkspaceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| WorkspaceError::CreateFailed {
                path: self.dir.clone(),
                source,
            })?;

        let mut entries =
            tokio::fs::read_dir(&self.dir)
                .await
                .map_err(|source| WorkspaceError::ReadFailed {
                    path: self.dir.clone(),
                    source,
                })?;

        let mut removed = 0usize;
        loop {
            let entry = entries
                .next_entry()
                .await
                .map_err(|source| WorkspaceError::ReadFailed {
                    path: self.dir.clone(),
                    source,
                })?;
            let Some(entry) = entry else { break };

            let path = entry.path();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);

            let result = if is_dir {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            result.map_err(|source| WorkspaceError::RemoveFailed { path, source })?;
            removed += 1;
        }

        debug!("Cleared {} entries from workspace {:?}", removed, self.dir);
        Ok(())
    }

    /// Number of entries currently in the workspace directory.
    pub async fn file_count(&self) -> Result<usize, WorkspaceError> {
        let read_failed = |source: std::io::Error| WorkspaceError::ReadFailed {
            path: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(read_failed)?;
        let mut count = 0;
        while entries.next_entry().await.map_err(read_failed)?.is_some() {
            count += 1;
        }
        Ok(count)
    }
}
