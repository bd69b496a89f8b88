//! Core error type and result extension trait

use thiserror::Error;

/// Result type alias for tscflow operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C: std::fmt::Display>(self, context: C) -> CompileResult<T>;

    /// Add context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> CompileResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context<C: std::fmt::Display>(self, context: C) -> CompileResult<T> {
        self.map_err(|e| CompileError::io(format!("{}: {}", context, e)))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> CompileResult<T> {
        self.map_err(|e| CompileError::io(format!("{}: {}", f(), e)))
    }
}

/// Main error type for compilation sessions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The temporary workspace could not be created
    #[error("Workspace error: {message}")]
    Workspace {
        message: String,
        path: Option<String>,
    },

    /// The tree keeper file could not be written
    #[error("Failed to create tree keeper file {path}: {message}. Try again with keep_tree disabled")]
    Placeholder { message: String, path: String },

    /// The compiler could not be started
    #[error("Failed to spawn {program}: {message}")]
    ProcessSpawn { program: String, message: String },

    /// The compiler ran and exited unsuccessfully
    #[error("tsc command has exited with code: {}", exit_code_label(.code))]
    ProcessExit { code: Option<i32> },

    /// A global abort was observed at a pipeline checkpoint
    #[error("aborted")]
    Aborted,

    /// Output scanning or source map relocation failed
    #[error("Collection error: {message}")]
    Collection {
        message: String,
        path: Option<String>,
    },

    /// Invalid session options
    #[error("Configuration error: {message}{}", context_suffix(.context))]
    Config {
        message: String,
        context: Option<String>,
    },

    /// The compiler executable could not be found
    #[error("Can't locate `tsc` command: {message}")]
    Locate { message: String },

    /// Any other filesystem failure
    #[error("IO error: {message}")]
    Io { message: String },
}

fn context_suffix(context: &Option<String>) -> String {
    context.as_ref().map(|c| format!(" ({})", c)).unwrap_or_default()
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

impl CompileError {
    /// Stable identifier for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Workspace { .. } => "TSC_WORKSPACE",
            Self::Placeholder { .. } => "TSC_PLACEHOLDER",
            Self::ProcessSpawn { .. } => "TSC_SPAWN",
            Self::ProcessExit { .. } => "TSC_EXIT",
            Self::Aborted => "TSC_ABORTED",
            Self::Collection { .. } => "TSC_COLLECTION",
            Self::Config { .. } => "TSC_CONFIG",
            Self::Locate { .. } => "TSC_LOCATE",
            Self::Io { .. } => "TSC_IO",
        }
    }

    /// Rank used when two failures compete for the single reported error.
    ///
    /// Only collection errors are outranked: a process failure always wins
    /// over a later scan failure. Everything else is first-come.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Collection { .. } => 0,
            _ => 1,
        }
    }

    /// Whether the session stopped because of a global abort
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Combine an earlier error with a later one.
    ///
    /// The earlier error is kept unless the later one strictly outranks it.
    pub fn merge(first: Option<CompileError>, later: Option<CompileError>) -> Option<CompileError> {
        match (first, later) {
            (None, later) => later,
            (first, None) => first,
            (Some(first), Some(later)) => {
                if later.precedence() > first.precedence() {
                    Some(later)
                } else {
                    Some(first)
                }
            }
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
