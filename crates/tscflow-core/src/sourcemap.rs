//! Source map relocation
//!
//! A map file lists its sources relative to its own location. Moving the map
//! from the workspace to its destination breaks those references, so each
//! entry is resolved against the old location and re-expressed relative to
//! the new one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::paths::{normalize, relative_to, to_slash};

static MAP_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.map$").expect("valid regex"));

/// Rewrites the `sources` list of relocated map artifacts
#[derive(Debug, Clone, Default)]
pub struct SourceMapRelocator {
    source_root_configured: bool,
}

impl SourceMapRelocator {
    /// A relocator; with an explicit source root it never rewrites anything
    pub fn new(source_root: Option<&str>) -> Self {
        Self {
            source_root_configured: source_root.is_some(),
        }
    }

    /// Whether a path names a map file
    pub fn is_map_file(path: &Path) -> bool {
        path.file_name()
            .map(|name| MAP_FILE.is_match(&name.to_string_lossy()))
            .unwrap_or(false)
    }

    /// Rewrite `contents` of the map moved from `temp_path` to `final_path`.
    ///
    /// Returns `Ok(None)` when the artifact passes through unchanged.
    pub fn relocate(
        &self,
        contents: &[u8],
        temp_path: &Path,
        final_path: &Path,
    ) -> CompileResult<Option<Vec<u8>>> {
        if self.source_root_configured || !Self::is_map_file(temp_path) {
            return Ok(None);
        }
        let Ok(text) = std::str::from_utf8(contents) else {
            debug!("Map file {} is not UTF-8, leaving as is", temp_path.display());
            return Ok(None);
        };
        let mut map: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                debug!("Map file {} is not JSON ({}), leaving as is", temp_path.display(), e);
                return Ok(None);
            }
        };
        let Some(sources) = map.get_mut("sources").and_then(Value::as_array_mut) else {
            return Ok(None);
        };

        let old_dir = temp_path.parent().unwrap_or_else(|| Path::new(""));
        let new_dir = final_path.parent().unwrap_or_else(|| Path::new(""));
        for entry in sources.iter_mut() {
            if let Some(source) = entry.as_str() {
                if source.contains("://") {
                    continue;
                }
                let absolute = normalize(&old_dir.join(source));
                *entry = Value::String(to_slash(&relative_to(new_dir, &absolute)));
            }
        }

        serde_json::to_vec(&map)
            .map(Some)
            .map_err(|e| CompileError::collection_at(format!("Failed to write source map: {}", e), temp_path))
    }
}
