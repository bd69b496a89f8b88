//! Tree keeper file
//!
//! The compiler derives its output layout from the deepest directory shared
//! by its inputs. A throwaway source file at the root of the first input's
//! tree pins that directory, so nested input structure survives in the
//! workspace. The file is removed before the session finishes and anything
//! the compiler emitted for it is filtered out of the collected artifacts.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{CompileError, CompileResult};

const PLACEHOLDER_PREFIX: &str = ".tscflow-tree-keeper-";
const PLACEHOLDER_CONTENTS: &str = "var __tscflow_tree_keeper = 0;\n";

static PLACEHOLDER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\.tscflow-tree-keeper-[0-9a-f-]{36}(\.|$)").expect("valid regex")
});

/// Whether a file name belongs to a tree keeper or one of its outputs
pub fn is_placeholder_name(file_name: &str) -> bool {
    PLACEHOLDER_NAME.is_match(file_name)
}

/// A tree keeper source file on disk
#[derive(Debug)]
pub struct PlaceholderFile {
    path: Option<PathBuf>,
}

impl PlaceholderFile {
    /// Write a uniquely named tree keeper into `dir`
    pub async fn create(dir: &Path) -> CompileResult<Self> {
        let path = dir.join(format!("{}{}.ts", PLACEHOLDER_PREFIX, Uuid::new_v4()));
        tokio::fs::write(&path, PLACEHOLDER_CONTENTS)
            .await
            .map_err(|e| CompileError::placeholder(&path, e.to_string()))?;
        debug!("Wrote tree keeper {}", path.display());
        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Delete the file; failures are logged
    pub async fn remove(mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove tree keeper {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for PlaceholderFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}
