//! Constructor methods for CompileError

use super::types::CompileError;
use std::path::Path;

impl CompileError {
    /// Create a new workspace error
    pub fn workspace(message: impl Into<String>) -> Self {
        Self::Workspace {
            message: message.into(),
            path: None,
        }
    }

    /// Create a workspace error for a specific directory
    pub fn workspace_at(message: impl Into<String>, path: &Path) -> Self {
        Self::Workspace {
            message: message.into(),
            path: Some(path.display().to_string()),
        }
    }

    /// Create a tree keeper error
    pub fn placeholder(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Placeholder {
            message: message.into(),
            path: path.as_ref().display().to_string(),
        }
    }

    /// Create a spawn error
    pub fn process_spawn(program: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::ProcessSpawn {
            program: program.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create an exit error; `None` means the process was killed by a signal
    pub fn process_exit(code: Option<i32>) -> Self {
        Self::ProcessExit { code }
    }

    /// Create a new collection error
    pub fn collection(message: impl Into<String>) -> Self {
        Self::Collection {
            message: message.into(),
            path: None,
        }
    }

    /// Create a collection error for a specific artifact
    pub fn collection_at(message: impl Into<String>, path: &Path) -> Self {
        Self::Collection {
            message: message.into(),
            path: Some(path.display().to_string()),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new locate error
    pub fn locate(message: impl Into<String>) -> Self {
        Self::Locate {
            message: message.into(),
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}
