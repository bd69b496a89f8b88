//! Session option record and defaults

use serde::{Deserialize, Serialize};
use std::path::{Component, PathBuf};

use super::path_filter::PathFilter;
use crate::error::{CompileError, CompileResult};

/// Places searched for the compiler executable when no explicit path is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPlace {
    /// `node_modules` below the current directory
    Cwd,
    /// `tsc` on `PATH`
    Shell,
}

impl SearchPlace {
    /// Parse a search place name as accepted on the command line
    pub fn parse(name: &str) -> CompileResult<Self> {
        match name {
            "cwd" => Ok(Self::Cwd),
            "shell" => Ok(Self::Shell),
            other => Err(CompileError::config(format!(
                "Unknown search place: {}",
                other
            ))),
        }
    }

    /// Default search order
    pub fn defaults() -> Vec<Self> {
        vec![Self::Cwd, Self::Shell]
    }
}

/// Boolean compiler switches, each mapped to one flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerSwitches {
    #[serde(alias = "allowbool")]
    pub allow_bool: bool,
    #[serde(alias = "allowimportmodule")]
    pub allow_import_module: bool,
    pub declaration: bool,
    pub no_implicit_any: bool,
    pub no_resolve: bool,
    pub remove_comments: bool,
    pub sourcemap: bool,
}

/// Configuration for one compilation session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOptions {
    /// Explicit path of the compiler executable
    pub tsc_path: Option<PathBuf>,

    /// Search order used when `tsc_path` is unset
    pub tsc_search: Option<Vec<SearchPlace>>,

    /// Module format, passed lowercased
    pub module: String,

    /// Language target, passed uppercased
    pub target: String,

    /// Single combined output file, relative to the destination root
    pub out: Option<PathBuf>,

    /// Destination root for relocated artifacts
    pub out_dir: Option<PathBuf>,

    pub map_root: Option<String>,

    /// When set, source map `sources` are left untouched
    pub source_root: Option<String>,

    #[serde(flatten)]
    pub switches: CompilerSwitches,

    /// Write a tree keeper file so the compiler keeps nested directories
    pub keep_tree: bool,

    /// Base directory for the temporary workspace
    pub tmp_dir: Option<PathBuf>,

    /// Extra flags appended verbatim before the input files
    pub additional_args: Vec<String>,

    /// Rewrites or drops relocated artifact paths
    #[serde(skip)]
    pub path_filter: Option<PathFilter>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tsc_path: None,
            tsc_search: None,
            module: "commonjs".to_string(),
            target: "ES3".to_string(),
            out: None,
            out_dir: None,
            map_root: None,
            source_root: None,
            switches: CompilerSwitches::default(),
            keep_tree: true,
            tmp_dir: None,
            additional_args: Vec::new(),
            path_filter: None,
        }
    }
}

impl SessionOptions {
    /// Set the destination root
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Compile everything into one file
    pub fn with_out(mut self, file: impl Into<PathBuf>) -> Self {
        self.out = Some(file.into());
        self
    }

    /// Set the workspace base directory
    pub fn with_tmp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = Some(dir.into());
        self
    }

    /// Enable or disable the tree keeper file
    pub fn with_keep_tree(mut self, keep: bool) -> Self {
        self.keep_tree = keep;
        self
    }

    /// Attach a path filter
    pub fn with_path_filter(mut self, filter: PathFilter) -> Self {
        self.path_filter = Some(filter);
        self
    }

    /// Check the options before a session starts
    pub fn validate(&self) -> CompileResult<()> {
        if self.module.trim().is_empty() {
            return Err(CompileError::config_with_context(
                "module must not be empty",
                "validating session options",
            ));
        }
        if self.target.trim().is_empty() {
            return Err(CompileError::config_with_context(
                "target must not be empty",
                "validating session options",
            ));
        }
        if let Some(out) = &self.out {
            let stays_inside = out
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
            let names_a_file = out.components().any(|c| matches!(c, Component::Normal(_)));
            if !names_a_file || !stays_inside {
                return Err(CompileError::config(format!(
                    "out must be a relative file path without '..', got '{}'",
                    out.display()
                )));
            }
        }
        Ok(())
    }

    /// Search order, falling back to the default order
    pub fn search_places(&self) -> Vec<SearchPlace> {
        self.tsc_search.clone().unwrap_or_else(SearchPlace::defaults)
    }
}
