//! CLI console utilities

use colored::*;
use tscflow_core::{CompileError, OutputArtifact, SessionObserver, SessionState};

/// Console for formatted output
#[derive(Debug, Clone, Copy)]
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message (verbose only)
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }
}

/// Prints compiler output as it arrives
#[derive(Debug, Clone, Copy)]
pub struct ConsoleObserver {
    console: CliConsole,
}

impl ConsoleObserver {
    pub const fn new(console: CliConsole) -> Self {
        Self { console }
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_state(&self, state: SessionState) {
        self.console.info(&format!("session: {}", state));
    }

    fn on_stdout(&self, line: &str) {
        println!("{} {}", "[tsc] >".dimmed(), line);
    }

    fn on_stderr(&self, line: &str) {
        eprintln!("{} {}", "[tsc] >".yellow(), line);
    }

    fn on_artifact(&self, artifact: &OutputArtifact) {
        self.console
            .info(&format!("emitted {} ({})", artifact.relative_path, artifact.kind));
    }

    fn on_error(&self, error: &CompileError) {
        self.console.error(&format!("[{}] {}", error.error_code(), error));
    }
}
