//! Process spawning

use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, instrument, warn};

use super::handle::{OutputLine, ProcessHandle};
use crate::compiler::CompilerCommand;
use crate::error::{CompileError, CompileResult};

/// Starts compiler processes
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Spawn `command` with `args` appended; returns once the process started
    async fn spawn(&self, command: &CompilerCommand, args: &[OsString]) -> CompileResult<ProcessHandle>;
}

/// Runs real processes on the tokio runtime
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn pump<R>(pipe: R, tx: mpsc::UnboundedSender<OutputLine>, wrap: fn(String) -> OutputLine)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            // drain to EOF even when nobody listens, so the child never hits a closed pipe
            let mut reader = BufReader::new(pipe);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        if buf.last() == Some(&b'\n') {
                            buf.pop();
                            if buf.last() == Some(&b'\r') {
                                buf.pop();
                            }
                        }
                        let _ = tx.send(wrap(String::from_utf8_lossy(&buf).into_owned()));
                    }
                    Err(e) => {
                        warn!("Failed to read compiler output: {}", e);
                        break;
                    }
                }
            }
        });
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    #[instrument(skip(self, args), fields(program = %command.program.display(), argc = args.len()))]
    async fn spawn(&self, command: &CompilerCommand, args: &[OsString]) -> CompileResult<ProcessHandle> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| CompileError::process_spawn(&command.program, e.to_string()))?;
        let pid = child.id();
        debug!("Spawned compiler with PID {:?}", pid);

        let (line_tx, line_rx) = mpsc::unbounded_channel();
        if let Some(pipe) = child.stdout.take() {
            Self::pump(pipe, line_tx.clone(), OutputLine::Stdout);
        }
        if let Some(pipe) = child.stderr.take() {
            Self::pump(pipe, line_tx, OutputLine::Stderr);
        }

        let (exit_tx, exit_rx) = oneshot::channel();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    debug!("Compiler exited with {:?}", status.code());
                    let _ = exit_tx.send(status.code());
                }
                Err(e) => {
                    // dropping the sender surfaces as an error from ProcessHandle::wait
                    error!("Failed to wait for compiler process: {}", e);
                }
            }
        });

        Ok(ProcessHandle::from_parts(pid, line_rx, exit_rx))
    }
}
