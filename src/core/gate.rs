//! # Join gate: block callers until the stop sequence has finished.
//!
//! A one-shot done signal. It is armed when `start()` runs and released exactly
//! once, after the control loop has reached `Stopped` and exited. Waiters do not
//! track individual service completion; they only learn that shutdown is over.
//!
//! ```text
//! start() ──► arm()            join() ──► wait().await ─┐
//!                                                      │ (parked)
//! control loop exits ──► release() ────────────────────┘ wakes every waiter
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Cloneable one-shot gate. Clones share the same signal.
#[derive(Clone, Debug, Default)]
pub struct JoinGate {
    armed: Arc<AtomicBool>,
    done: CancellationToken,
}

impl JoinGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the gate as guarding a started supervisor.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// True once [`arm`](Self::arm) has been called.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Opens the gate. Subsequent calls have no effect.
    pub fn release(&self) {
        self.done.cancel();
    }

    pub fn is_released(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Waits until the gate is released. Returns immediately if it already was.
    pub async fn wait(&self) {
        self.done.cancelled().await;
    }
}
