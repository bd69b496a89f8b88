//! Caller-supplied input files

use std::path::{Path, PathBuf};

/// One input file as the caller sees it.
///
/// `relative_path` is relative to `base_directory`; its directory part drives
/// ancestor stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileRef {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub base_directory: PathBuf,
}

impl SourceFileRef {
    pub fn new(
        absolute_path: impl Into<PathBuf>,
        relative_path: impl Into<PathBuf>,
        base_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            relative_path: relative_path.into(),
            base_directory: base_directory.into(),
        }
    }

    /// Describe `path` relative to `base`; `None` when it is not inside `base`
    pub fn from_base(path: &Path, base: &Path) -> Option<Self> {
        let relative = path.strip_prefix(base).ok()?;
        Some(Self::new(path, relative, base))
    }
}
