//! Compiler output held in memory

use std::fmt;
use std::path::PathBuf;

use crate::error::{CompileResult, ResultExt};

/// What kind of file the compiler emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Code,
    Declaration,
    SourceMap,
}

impl ArtifactKind {
    /// Classify a file name; `None` for anything the compiler does not emit
    pub fn classify(file_name: &str) -> Option<Self> {
        if file_name.ends_with(".d.ts") {
            Some(Self::Declaration)
        } else if file_name.ends_with(".js.map") {
            Some(Self::SourceMap)
        } else if file_name.ends_with(".js") {
            Some(Self::Code)
        } else {
            None
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => write!(f, "code"),
            Self::Declaration => write!(f, "declaration"),
            Self::SourceMap => write!(f, "source-map"),
        }
    }
}

/// One relocated artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Final destination path
    pub logical_path: PathBuf,
    /// Destination path relative to the destination root, `/`-separated
    pub relative_path: String,
    /// Where the compiler wrote it; gone once the session ends
    pub physical_temp_path: PathBuf,
    pub contents: Vec<u8>,
    pub kind: ArtifactKind,
}

impl OutputArtifact {
    pub fn contents_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }

    /// Write the contents to `logical_path`, creating parent directories
    pub async fn write_to_disk(&self) -> CompileResult<()> {
        if let Some(parent) = self.logical_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        tokio::fs::write(&self.logical_path, &self.contents)
            .await
            .with_context(|| format!("Failed to write artifact {}", self.logical_path.display()))
    }
}
