//! Process-wide abort coordination
//!
//! Sessions register themselves while running and poll the abort flag at
//! their own checkpoints; nothing here reaches into a session. An abort
//! request stays pending until the running count drops to zero, then every
//! queued callback fires once, in registration order, and the flag resets so
//! the next request starts a fresh cycle.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Callback fired once an abort cycle completes
pub type AbortCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct RegistryState {
    running: usize,
    aborting: bool,
    pending: Vec<AbortCallback>,
}

impl RegistryState {
    /// Close the abort cycle if nothing is running; returns callbacks to fire
    fn settle(&mut self) -> Vec<AbortCallback> {
        if self.aborting && self.running == 0 {
            self.aborting = false;
            std::mem::take(&mut self.pending)
        } else {
            Vec::new()
        }
    }
}

/// Shared bookkeeping of running sessions
#[derive(Default)]
pub struct SessionRegistry {
    state: Mutex<RegistryState>,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SessionRegistry")
            .field("running", &state.running)
            .field("aborting", &state.aborting)
            .field("pending", &state.pending.len())
            .finish()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry ready to be shared between sessions
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Count a session as running until the returned guard drops
    pub fn enter(self: &Arc<Self>) -> RunningGuard {
        let running = {
            let mut state = self.state.lock();
            state.running += 1;
            state.running
        };
        debug!("Session entered registry ({} running)", running);
        RunningGuard {
            registry: Arc::clone(self),
        }
    }

    fn leave(&self) {
        let callbacks = {
            let mut state = self.state.lock();
            state.running = state.running.saturating_sub(1);
            debug!("Session left registry ({} running)", state.running);
            state.settle()
        };
        Self::fire(callbacks);
    }

    /// Number of sessions started but not yet terminal
    pub fn running(&self) -> usize {
        self.state.lock().running
    }

    /// Whether an abort request is pending
    pub fn is_abort_requested(&self) -> bool {
        self.state.lock().aborting
    }

    /// Ask every running session to stop at its next checkpoint.
    ///
    /// `callback` fires once all of them reached a terminal state, or right
    /// away when none is running.
    pub fn abort_all(&self, callback: Option<AbortCallback>) {
        let callbacks = {
            let mut state = self.state.lock();
            state.aborting = true;
            if let Some(callback) = callback {
                state.pending.push(callback);
            }
            info!("Abort requested with {} session(s) running", state.running);
            state.settle()
        };
        Self::fire(callbacks);
    }

    /// Request an abort and wait until the cycle completes
    pub async fn abort_all_and_wait(&self) {
        let (tx, rx) = oneshot::channel();
        self.abort_all(Some(Box::new(move || {
            let _ = tx.send(());
        })));
        let _ = rx.await;
    }

    fn fire(callbacks: Vec<AbortCallback>) {
        if callbacks.is_empty() {
            return;
        }
        debug!("Abort cycle complete, firing {} callback(s)", callbacks.len());
        for callback in callbacks {
            callback();
        }
    }
}

/// Marks one session as running; dropping it decrements the count
#[must_use = "the session counts as running only while the guard is alive"]
pub struct RunningGuard {
    registry: Arc<SessionRegistry>,
}

impl fmt::Debug for RunningGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RunningGuard")
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.registry.leave();
    }
}
