//! Handle to a spawned process

use tokio::sync::{mpsc, oneshot};

use crate::error::{CompileError, CompileResult};

/// One line of process output, tagged with its stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

impl OutputLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Stdout(line) | Self::Stderr(line) => line,
        }
    }
}

/// A running process: its output lines and its eventual exit code.
///
/// Lines from one stream keep their order; interleaving between stdout and
/// stderr follows arrival and is not deterministic.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: Option<u32>,
    lines: mpsc::UnboundedReceiver<OutputLine>,
    exit: oneshot::Receiver<Option<i32>>,
}

impl ProcessHandle {
    /// Assemble a handle from its channels.
    ///
    /// The line channel must close once both streams reach end of file; the
    /// exit channel carries the exit code, `None` for death by signal.
    pub fn from_parts(
        pid: Option<u32>,
        lines: mpsc::UnboundedReceiver<OutputLine>,
        exit: oneshot::Receiver<Option<i32>>,
    ) -> Self {
        Self { pid, lines, exit }
    }

    /// A handle for a process that already printed `lines` and exited with `code`
    pub fn finished(lines: Vec<OutputLine>, code: i32) -> Self {
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        for line in lines {
            let _ = line_tx.send(line);
        }
        let (exit_tx, exit_rx) = oneshot::channel();
        let _ = exit_tx.send(Some(code));
        Self::from_parts(None, line_rx, exit_rx)
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Next output line, `None` once both streams are exhausted
    pub async fn next_line(&mut self) -> Option<OutputLine> {
        self.lines.recv().await
    }

    /// Wait for the process to exit and return its exit code
    pub async fn wait(self) -> CompileResult<Option<i32>> {
        self.exit
            .await
            .map_err(|_| CompileError::io("process monitor ended without an exit status"))
    }

    /// Drain every remaining line, then wait for exit
    pub async fn collect(mut self) -> CompileResult<(Vec<OutputLine>, Option<i32>)> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await {
            lines.push(line);
        }
        let code = self.wait().await?;
        Ok((lines, code))
    }
}
