//! Ctrl+C handling: abort every running session

use futures::stream::StreamExt;
use signal_hook::consts::SIGINT;
use signal_hook_tokio::Signals;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tscflow_core::SessionRegistry;

/// Turns SIGINT into an abort request on a registry
pub struct SignalHandler {
    registry: Arc<SessionRegistry>,
    task_handle: Option<JoinHandle<()>>,
}

impl SignalHandler {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            task_handle: None,
        }
    }

    /// Start listening; a second start is a no-op
    pub fn start(&mut self) -> std::io::Result<()> {
        if self.task_handle.is_some() {
            return Ok(());
        }

        let mut signals = Signals::new([SIGINT])?;
        let registry = Arc::clone(&self.registry);
        let handle = tokio::spawn(async move {
            while let Some(signal) = signals.next().await {
                if signal != SIGINT {
                    continue;
                }
                if registry.is_abort_requested() {
                    eprintln!("\nAbort already in progress, please wait...");
                    continue;
                }
                eprintln!("\n🛑 Aborting running sessions... (Ctrl+C)");
                registry.abort_all(Some(Box::new(|| {
                    eprintln!("   All sessions stopped.");
                })));
            }
        });

        self.task_handle = Some(handle);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Stop listening
    pub fn stop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for SignalHandler {
    fn drop(&mut self) {
        self.stop();
    }
}
