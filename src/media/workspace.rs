use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;

use crate::errors::MediaError;

// @module: Per-job scratch directory

/// A uniquely named temporary directory owned by one job.
///
/// The directory is removed exactly once: by [`JobWorkspace::close`] when the
/// caller wants to see removal errors, otherwise when the value is dropped
/// (including while unwinding from an error).
#[derive(Debug)]
pub struct JobWorkspace {
    id: String,
    path: PathBuf,
    dir: Option<TempDir>,
}

impl JobWorkspace {
    /// Create a workspace under `root`, or the system temp dir when `None`
    pub fn create(root: Option<&Path>) -> Result<Self, MediaError> {
        let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        let prefix = format!("text2video-{}-", id);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        let path = dir.path().to_path_buf();
        debug!("Job {} workspace: {}", id, path.display());

        Ok(Self {
            id,
            path,
            dir: Some(dir),
        })
    }

    /// Short job identifier, also part of the directory name
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the workspace
    pub fn file<S: AsRef<str>>(&self, name: S) -> PathBuf {
        self.path.join(name.as_ref())
    }

    /// Remove the workspace now and report failures
    pub fn close(mut self) -> Result<(), MediaError> {
        if let Some(dir) = self.dir.take() {
            debug!("Removing job {} workspace", self.id);
            dir.close()?;
        }
        Ok(())
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            debug!("Removing job {} workspace", self.id);
            if let Err(e) = dir.close() {
                warn!("Failed to remove workspace {}: {}", self.path.display(), e);
            }
        }
    }
}
