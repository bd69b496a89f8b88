//! Workspace scanning
//!
//! After the compiler exits, everything it emitted is picked up from the
//! workspace, read into memory, relocated and handed back one artifact at a
//! time. Scanning runs regardless of the exit code so partial output from a
//! failed compile is not lost.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{CompileError, CompileResult};
use crate::paths::PathReconciler;
use crate::placeholder::is_placeholder_name;
use crate::session::{ArtifactKind, OutputArtifact};
use crate::sourcemap::SourceMapRelocator;

/// Collects and relocates the artifacts emitted into one workspace
#[derive(Debug)]
pub struct OutputCollector<'a> {
    workspace: &'a Path,
    reconciler: &'a PathReconciler,
    relocator: &'a SourceMapRelocator,
}

impl<'a> OutputCollector<'a> {
    pub fn new(
        workspace: &'a Path,
        reconciler: &'a PathReconciler,
        relocator: &'a SourceMapRelocator,
    ) -> Self {
        Self {
            workspace,
            reconciler,
            relocator,
        }
    }

    /// Workspace-relative paths of every emitted artifact, sorted
    pub fn scan(&self) -> CompileResult<Vec<PathBuf>> {
        let mut found = Vec::new();
        for entry in WalkDir::new(self.workspace).min_depth(1) {
            let entry = entry.map_err(|e| {
                CompileError::collection_at(format!("Failed to scan workspace: {}", e), self.workspace)
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if is_placeholder_name(&name) || ArtifactKind::classify(&name).is_none() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(self.workspace) {
                found.push(relative.to_path_buf());
            }
        }
        found.sort();
        Ok(found)
    }

    /// Read, relocate and report every artifact.
    ///
    /// Per-artifact failures do not stop the scan; the first one is returned
    /// alongside whatever could be recovered.
    pub async fn collect<F>(&self, mut on_artifact: F) -> (Vec<OutputArtifact>, Option<CompileError>)
    where
        F: FnMut(&OutputArtifact),
    {
        let paths = match self.scan() {
            Ok(paths) => paths,
            Err(e) => return (Vec::new(), Some(e)),
        };
        debug!("Found {} artifact(s) in {}", paths.len(), self.workspace.display());

        let mut artifacts = Vec::with_capacity(paths.len());
        let mut first_error = None;
        for relative in paths {
            match self.load(&relative).await {
                Ok(Some(artifact)) => {
                    on_artifact(&artifact);
                    artifacts.push(artifact);
                }
                Ok(None) => debug!("Path filter dropped {}", relative.display()),
                Err(e) => {
                    warn!("Failed to collect {}: {}", relative.display(), e);
                    first_error.get_or_insert(e);
                }
            }
        }
        (artifacts, first_error)
    }

    async fn load(&self, relative: &Path) -> CompileResult<Option<OutputArtifact>> {
        let Some(relocation) = self.reconciler.relocate(relative) else {
            return Ok(None);
        };
        let physical = self.workspace.join(relative);
        let name = physical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = ArtifactKind::classify(&name).unwrap_or(ArtifactKind::Code);

        let mut contents = tokio::fs::read(&physical).await.map_err(|e| {
            CompileError::collection_at(format!("Failed to read artifact: {}", e), &physical)
        })?;
        if kind == ArtifactKind::SourceMap {
            if let Some(rewritten) = self.relocator.relocate(&contents, &physical, &relocation.logical)? {
                contents = rewritten;
            }
        }

        Ok(Some(OutputArtifact {
            logical_path: relocation.logical,
            relative_path: relocation.relative,
            physical_temp_path: physical,
            contents,
            kind,
        }))
    }
}
