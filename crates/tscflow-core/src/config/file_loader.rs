//! Options files
//!
//! A session can be configured from `tscflow.json`, `tscflow.toml` or
//! `tscflow.yaml`. The format follows the extension; field names are the
//! camelCase option names.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use super::options::SessionOptions;
use crate::error::{CompileError, CompileResult};

/// File names checked by [`discover`], in order
pub const OPTIONS_FILE_NAMES: [&str; 4] =
    ["tscflow.json", "tscflow.toml", "tscflow.yaml", "tscflow.yml"];

/// Supported options file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsFormat {
    Json,
    Toml,
    Yaml,
}

impl OptionsFormat {
    /// Format implied by the extension of `path`
    pub fn from_path(path: &Path) -> CompileResult<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(CompileError::config_with_context(
                format!("Unsupported options file extension '{}'", ext),
                format!("expected .json, .toml, .yaml or .yml: '{}'", path.display()),
            )),
        }
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// First options file found directly inside `dir`
pub fn discover(dir: &Path) -> Option<PathBuf> {
    OPTIONS_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Load and validate session options from `path`.
///
/// The file must exist; every error names the file it came from.
pub fn load_from_file(path: &Path) -> CompileResult<SessionOptions> {
    let format = OptionsFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        CompileError::config_with_context(
            format!("Cannot read options file: {}", e),
            format!("loading '{}'", path.display()),
        )
    })?;

    let options: SessionOptions = format.parse(&content).map_err(|e| {
        CompileError::config_with_context(
            format!("Invalid {:?} options: {}", format, e),
            format!("loading '{}'", path.display()),
        )
    })?;
    options
        .validate()
        .map_err(|e| e.with_context(format!("loading '{}'", path.display())))?;
    Ok(options)
}
