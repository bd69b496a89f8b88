//! Session lifecycle states

use std::fmt;

/// Where a session is in its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Starting,
    CreatingWorkspace,
    CreatingPlaceholder,
    RunningProcess,
    CollectingOutputs,
    CleaningUp,
    Completed,
    Failed,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Aborted)
    }

    /// Whether entering this state is a cancellation checkpoint.
    ///
    /// Cleanup is never skipped; collection still runs after an abort so
    /// partial output is recovered, but the abort is recorded first.
    pub fn is_checkpoint(self) -> bool {
        matches!(
            self,
            Self::CreatingWorkspace
                | Self::CreatingPlaceholder
                | Self::RunningProcess
                | Self::CollectingOutputs
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::CreatingWorkspace => "creating-workspace",
            Self::CreatingPlaceholder => "creating-placeholder",
            Self::RunningProcess => "running-process",
            Self::CollectingOutputs => "collecting-outputs",
            Self::CleaningUp => "cleaning-up",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}
