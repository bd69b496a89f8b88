//! Locating the compiler executable

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{SearchPlace, SessionOptions};
use crate::error::{CompileError, CompileResult};

/// Program plus any arguments that must precede the compiler's own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    pub program: PathBuf,
    pub leading_args: Vec<OsString>,
}

impl CompilerCommand {
    /// Command for the compiler at `path`.
    ///
    /// JavaScript entry points (a `.js` file, or a file with a node shebang)
    /// run through `node`; everything else is executed directly.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if is_node_script(&path) {
            Self {
                program: PathBuf::from("node"),
                leading_args: vec![path.into_os_string()],
            }
        } else {
            Self {
                program: path,
                leading_args: Vec::new(),
            }
        }
    }

    /// The compiler script or executable this command ends up running
    pub fn script(&self) -> &Path {
        self.leading_args
            .first()
            .map(Path::new)
            .unwrap_or(self.program.as_path())
    }
}

fn is_node_script(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("js") => true,
        Some(ext) if ["exe", "cmd", "bat", "sh"].iter().any(|n| ext.eq_ignore_ascii_case(n)) => false,
        _ => has_node_shebang(path),
    }
}

fn has_node_shebang(path: &Path) -> bool {
    let Ok(mut file) = std::fs::File::open(path) else {
        return false;
    };
    let mut head = [0u8; 64];
    let Ok(n) = file.read(&mut head) else {
        return false;
    };
    let head = String::from_utf8_lossy(&head[..n]);
    let first_line = head.lines().next().unwrap_or("");
    first_line.starts_with("#!") && first_line.contains("node")
}

/// Find the compiler according to `options`
pub fn locate(options: &SessionOptions) -> CompileResult<CompilerCommand> {
    if let Some(path) = &options.tsc_path {
        return Ok(CompilerCommand::for_path(path));
    }

    let cwd = std::env::current_dir()
        .map_err(|e| CompileError::locate(format!("cannot read current directory: {}", e)))?;
    for place in options.search_places() {
        if let Some(found) = search(place, &cwd) {
            debug!("Found tsc via {:?} at {}", place, found.display());
            return Ok(CompilerCommand::for_path(found));
        }
    }
    Err(CompileError::locate(format!(
        "searched {:?}",
        options.search_places()
    )))
}

fn search(place: SearchPlace, cwd: &Path) -> Option<PathBuf> {
    match place {
        SearchPlace::Cwd => [
            cwd.join("node_modules").join("typescript").join("bin").join("tsc"),
            cwd.join("node_modules").join(".bin").join("tsc"),
        ]
        .into_iter()
        .find(|p| p.is_file()),
        SearchPlace::Shell => which::which("tsc").ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_wins() {
        let options = SessionOptions {
            tsc_path: Some(PathBuf::from("/opt/tsc.exe")),
            ..Default::default()
        };
        let command = locate(&options).unwrap();
        assert_eq!(command.program, PathBuf::from("/opt/tsc.exe"));
        assert!(command.leading_args.is_empty());
    }

    #[test]
    fn test_js_runs_through_node() {
        let command = CompilerCommand::for_path("/lib/tsc.js");
        assert_eq!(command.program, PathBuf::from("node"));
        assert_eq!(command.script(), Path::new("/lib/tsc.js"));
    }

    #[test]
    fn test_node_shebang_detected() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("tsc");
        std::fs::write(&script, "#!/usr/bin/env node\nrequire('./tsc.js');\n").unwrap();
        assert_eq!(CompilerCommand::for_path(&script).program, PathBuf::from("node"));

        let native = dir.path().join("fake");
        std::fs::write(&native, "#!/bin/sh\necho hi\n").unwrap();
        assert_eq!(CompilerCommand::for_path(&native).program, native);
    }

    #[test]
    fn test_cwd_search_finds_node_modules() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("node_modules").join(".bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("tsc"), "#!/bin/sh\n").unwrap();

        assert_eq!(search(SearchPlace::Cwd, dir.path()), Some(bin.join("tsc")));
        assert_eq!(search(SearchPlace::Cwd, &dir.path().join("elsewhere")), None);
    }
}
