//! Compilation sessions
//!
//! A [`Session`] owns one compile request end to end. It is consumed by
//! [`Session::compile`], which walks the fixed pipeline
//!
//! ```text
//! Idle -> Starting -> CreatingWorkspace -> CreatingPlaceholder -> RunningProcess
//!      -> CollectingOutputs -> CleaningUp -> Completed | Failed | Aborted
//! ```
//!
//! and returns a [`SessionOutcome`]. Cleanup runs exactly once on every path.

mod artifact;
mod pipeline;
mod source;
mod state;

pub use artifact::{ArtifactKind, OutputArtifact};
pub use source::SourceFileRef;
pub use state::SessionState;

use std::sync::Arc;
use uuid::Uuid;

use crate::config::SessionOptions;
use crate::error::{CompileError, CompileResult};
use crate::events::{NoopObserver, SessionObserver};
use crate::process::{ProcessRunner, TokioProcessRunner};
use crate::registry::SessionRegistry;

/// One compilation request
pub struct Session {
    id: String,
    inputs: Vec<SourceFileRef>,
    options: SessionOptions,
    registry: Arc<SessionRegistry>,
    runner: Arc<dyn ProcessRunner>,
    observer: Arc<dyn SessionObserver>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("inputs", &self.inputs.len())
            .field("options", &self.options)
            .finish()
    }
}

impl Session {
    /// Create a session that runs the real compiler and reports to nobody
    pub fn new(
        inputs: Vec<SourceFileRef>,
        options: SessionOptions,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            inputs,
            options,
            registry,
            runner: Arc::new(TokioProcessRunner::new()),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Use a different process runner
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Report progress to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn inputs(&self) -> &[SourceFileRef] {
        &self.inputs
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Run the pipeline to a terminal state
    pub async fn compile(self) -> SessionOutcome {
        pipeline::Pipeline::new(self).run().await
    }
}

/// Terminal result of a session.
///
/// Artifacts recovered from a failed compile are kept next to the error;
/// whether they are usable is up to the caller.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session_id: String,
    pub state: SessionState,
    pub artifacts: Vec<OutputArtifact>,
    pub error: Option<CompileError>,
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Artifacts on success, the reported error otherwise
    pub fn into_result(self) -> CompileResult<Vec<OutputArtifact>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.artifacts),
        }
    }
}

#[cfg(test)]
mod tests;
