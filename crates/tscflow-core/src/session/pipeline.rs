//! Pipeline driver for a single session

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{OutputArtifact, Session, SessionOutcome, SessionState};
use crate::collector::OutputCollector;
use crate::compiler::{build_arguments, locate};
use crate::error::CompileError;
use crate::paths::PathReconciler;
use crate::placeholder::PlaceholderFile;
use crate::process::OutputLine;
use crate::registry::RunningGuard;
use crate::sourcemap::SourceMapRelocator;
use crate::workspace::TempWorkspace;

/// Mutable state of one pipeline run.
///
/// Resources are plain fields so that an unwinding session still drops its
/// workspace, tree keeper and registry guard.
pub(super) struct Pipeline {
    session: Session,
    state: SessionState,
    guard: Option<RunningGuard>,
    workspace: Option<TempWorkspace>,
    placeholder: Option<PlaceholderFile>,
    artifacts: Vec<OutputArtifact>,
    error: Option<CompileError>,
}

impl Pipeline {
    pub(super) fn new(session: Session) -> Self {
        Self {
            session,
            state: SessionState::Idle,
            guard: None,
            workspace: None,
            placeholder: None,
            artifacts: Vec::new(),
            error: None,
        }
    }

    #[instrument(skip(self), fields(session_id = %self.session.id, inputs = self.session.inputs.len()))]
    pub(super) async fn run(mut self) -> SessionOutcome {
        let mut next = SessionState::Starting;
        loop {
            self.enter(next);
            if next.is_terminal() {
                break;
            }
            next = self.step(next).await;
        }

        // releasing the guard may complete a pending abort cycle
        self.guard.take();
        info!(
            "Session finished as {} with {} artifact(s)",
            self.state,
            self.artifacts.len()
        );
        SessionOutcome {
            session_id: self.session.id.clone(),
            state: self.state,
            artifacts: std::mem::take(&mut self.artifacts),
            error: self.error.take(),
        }
    }

    fn enter(&mut self, state: SessionState) {
        debug!("{} -> {}", self.state, state);
        self.state = state;
        self.session.observer.on_state(state);
    }

    fn fail(&mut self, error: CompileError) {
        debug!("Stage {} failed: {}", self.state, error);
        self.error = CompileError::merge(self.error.take(), Some(error));
    }

    /// Where to go after a failure: collect if a workspace exists, else clean up
    fn recovery(&self) -> SessionState {
        if self.workspace.is_some() {
            SessionState::CollectingOutputs
        } else {
            SessionState::CleaningUp
        }
    }

    async fn step(&mut self, state: SessionState) -> SessionState {
        if state.is_checkpoint() && self.session.registry.is_abort_requested() {
            info!("Abort observed before {}", state);
            self.fail(CompileError::Aborted);
            if state != SessionState::CollectingOutputs {
                return self.recovery();
            }
        }

        match state {
            SessionState::Starting => {
                self.guard = Some(self.session.registry.enter());
                match self.session.options.validate() {
                    Ok(()) => SessionState::CreatingWorkspace,
                    Err(e) => {
                        self.fail(e);
                        SessionState::CleaningUp
                    }
                }
            }
            SessionState::CreatingWorkspace => {
                match TempWorkspace::create(self.session.options.tmp_dir.as_deref()) {
                    Ok(workspace) => {
                        self.workspace = Some(workspace);
                        SessionState::CreatingPlaceholder
                    }
                    Err(e) => {
                        self.fail(e);
                        SessionState::CleaningUp
                    }
                }
            }
            SessionState::CreatingPlaceholder => match self.create_placeholder().await {
                Ok(()) => SessionState::RunningProcess,
                Err(e) => {
                    self.fail(e);
                    self.recovery()
                }
            },
            SessionState::RunningProcess => {
                if let Err(e) = self.run_process().await {
                    self.fail(e);
                }
                SessionState::CollectingOutputs
            }
            SessionState::CollectingOutputs => {
                self.collect_outputs().await;
                SessionState::CleaningUp
            }
            SessionState::CleaningUp => self.clean_up().await,
            SessionState::Idle
            | SessionState::Completed
            | SessionState::Failed
            | SessionState::Aborted => {
                warn!("Pipeline stepped from unexpected state {}", state);
                SessionState::CleaningUp
            }
        }
    }

    async fn create_placeholder(&mut self) -> Result<(), CompileError> {
        let options = &self.session.options;
        if !options.keep_tree || options.out.is_some() {
            return Ok(());
        }
        let Some(first) = self.session.inputs.first() else {
            return Ok(());
        };
        self.placeholder = Some(PlaceholderFile::create(&first.base_directory).await?);
        Ok(())
    }

    async fn run_process(&mut self) -> Result<(), CompileError> {
        let Some(workspace) = &self.workspace else {
            return Err(CompileError::workspace("no workspace to compile into"));
        };
        let command = locate(&self.session.options).map_err(|e| e.with_context("resolving compiler"))?;
        let args = build_arguments(
            &self.session.options,
            &self.session.inputs,
            workspace.path(),
            self.placeholder.as_ref().map(|p| p.path()),
        );

        let mut handle = self.session.runner.spawn(&command, &args).await?;
        info!("Compiler started (pid {:?}) with {} argument(s)", handle.pid(), args.len());
        while let Some(line) = handle.next_line().await {
            match line {
                OutputLine::Stdout(line) => self.session.observer.on_stdout(&line),
                OutputLine::Stderr(line) => self.session.observer.on_stderr(&line),
            }
        }

        match handle.wait().await? {
            Some(0) => Ok(()),
            code => Err(CompileError::process_exit(code)),
        }
    }

    fn reconciler(&self) -> PathReconciler {
        let options = &self.session.options;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let dest_root = match &options.out_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None if options.out.is_some() => cwd,
            None => self
                .session
                .inputs
                .first()
                .map(|f| f.base_directory.clone())
                .unwrap_or(cwd),
        };

        let reconciler = if options.out.is_some() {
            PathReconciler::single_file(dest_root)
        } else {
            PathReconciler::for_inputs(&self.session.inputs, dest_root)
        };
        reconciler.with_filter(options.path_filter.clone())
    }

    async fn collect_outputs(&mut self) {
        let Some(workspace) = &self.workspace else {
            return;
        };
        let reconciler = self.reconciler();
        debug!(
            "Relocating into {} after stripping {:?}",
            reconciler.dest_root().display(),
            reconciler.ancestor()
        );
        let relocator = SourceMapRelocator::new(self.session.options.source_root.as_deref());
        let observer = Arc::clone(&self.session.observer);

        let collector = OutputCollector::new(workspace.path(), &reconciler, &relocator);
        let (artifacts, error) = collector.collect(|a| observer.on_artifact(a)).await;

        self.artifacts = artifacts;
        if let Some(e) = error {
            self.fail(e);
        }
    }

    async fn clean_up(&mut self) -> SessionState {
        if let Some(placeholder) = self.placeholder.take() {
            placeholder.remove().await;
        }
        if let Some(workspace) = self.workspace.take() {
            workspace.cleanup();
        }

        match &self.error {
            None => SessionState::Completed,
            Some(e) => {
                self.session.observer.on_error(e);
                if e.is_aborted() {
                    SessionState::Aborted
                } else {
                    SessionState::Failed
                }
            }
        }
    }
}
