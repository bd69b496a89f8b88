//! Per-session temporary output directory
//!
//! The directory is removed exactly once: either explicitly through
//! [`TempWorkspace::cleanup`], which logs failures, or on drop as a fallback
//! when a session unwinds early. Removal failures never reach the caller.

use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};
use tracing::{debug, warn};

use crate::error::{CompileError, CompileResult};

const WORKSPACE_PREFIX: &str = "tscflow-";

/// An exclusive, uniquely named temporary directory
#[derive(Debug)]
pub struct TempWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl TempWorkspace {
    /// Create a fresh workspace under `base`, or the system temp dir
    pub fn create(base: Option<&Path>) -> CompileResult<Self> {
        let mut builder = Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let result = match base {
            Some(base) => builder.tempdir_in(base),
            None => builder.tempdir(),
        };
        let dir = result.map_err(|e| {
            let message = format!("Failed to create temporary directory: {}", e);
            match base {
                Some(base) => CompileError::workspace_at(message, base),
                None => CompileError::workspace(message),
            }
        })?;

        let path = dir.path().to_path_buf();
        debug!("Created workspace {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Absolute path of the workspace directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory, logging instead of returning failures
    pub fn cleanup(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("Removed workspace {}", self.path.display()),
                Err(e) => warn!("Failed to remove workspace {}: {}", self.path.display(), e),
            }
        }
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        self.remove();
    }
}
