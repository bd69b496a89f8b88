//! Session observation
//!
//! The result of a compile is the returned outcome; observers are an optional
//! side channel for output lines and artifacts as they appear.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::CompileError;
use crate::session::{OutputArtifact, SessionState};

/// Events delivered through [`ChannelObserver`]
#[derive(Debug, Clone)]
pub enum SessionEvent {
    State(SessionState),
    Stdout(String),
    Stderr(String),
    Artifact(OutputArtifact),
    Error(CompileError),
}

/// Receives best-effort notifications from a running session
pub trait SessionObserver: Send + Sync {
    fn on_state(&self, _state: SessionState) {}

    fn on_stdout(&self, _line: &str) {}

    fn on_stderr(&self, _line: &str) {}

    /// Called once per relocated artifact, as soon as it is available
    fn on_artifact(&self, _artifact: &OutputArtifact) {}

    /// Called once with the error reported in the outcome
    fn on_error(&self, _error: &CompileError) {}
}

/// Ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Logs every notification through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_state(&self, state: SessionState) {
        debug!("Session state: {}", state);
    }

    fn on_stdout(&self, line: &str) {
        info!("[tsc] > {}", line);
    }

    fn on_stderr(&self, line: &str) {
        warn!("[tsc] > {}", line);
    }

    fn on_artifact(&self, artifact: &OutputArtifact) {
        debug!("Artifact {} ({})", artifact.relative_path, artifact.kind);
    }

    fn on_error(&self, error: &CompileError) {
        warn!("Compile failed: {}", error);
    }
}

/// Forwards notifications into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: SessionEvent) {
        // a dropped receiver just means nobody is listening
        let _ = self.tx.send(event);
    }
}

impl SessionObserver for ChannelObserver {
    fn on_state(&self, state: SessionState) {
        self.send(SessionEvent::State(state));
    }

    fn on_stdout(&self, line: &str) {
        self.send(SessionEvent::Stdout(line.to_string()));
    }

    fn on_stderr(&self, line: &str) {
        self.send(SessionEvent::Stderr(line.to_string()));
    }

    fn on_artifact(&self, artifact: &OutputArtifact) {
        self.send(SessionEvent::Artifact(artifact.clone()));
    }

    fn on_error(&self, error: &CompileError) {
        self.send(SessionEvent::Error(error.clone()));
    }
}
