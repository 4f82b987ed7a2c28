//! # Control loop: watchers and the serialized dispatch path.
//!
//! Spawned once by `Supervisor::start()`.
//!
//! ```text
//!   signal channel ──► signal watcher ───────────┐ (first signal only)
//!                                                 ├─► request_stop() ──► Stop ─┐
//!   ambient ctx ──► error/cancellation watcher ──┘ (at most once)              │
//!   errors channel ──┘        └─► error!("{err}")                               │
//!                                                                               ▼
//!   Supervisor::stop()/status(), external senders ──► control channel ──► dispatch loop
//!                                                                   ├─ Stop   ─► stop sequence
//!                                                                   └─ Status ─► status_all()
//! ```
//!
//! ## Stop sequence
//! 1. Running  → warn "stopping services", set Stopping.
//! 2. Stopping → stop_all(), set Stopped, info "stopped".
//!
//! The join gate is released after the loop has exited, so a joined caller
//! finds the control channel closed and the signal subscription gone.
//!
//! Both checks run on every Stop message, so one message moves Running to
//! Stopped, and a Stop that finds the state already Stopping (set by
//! `request_stop`) also completes in one pass.
//!
//! ## Rules
//! - Stop and Status are handled one at a time, in arrival order.
//! - Errors are logged only; they never trigger a stop on their own.
//! - Once Stopped, the dispatch loop and both watchers exit and the signal
//!   subscription is torn down.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, debug, error, info, warn};

use crate::core::state::{State, StateCell};
use crate::core::supervisor::Shared;
use crate::error::{ServiceError, SupervisorError};
use crate::messages::{ControlMessage, Signal};

/// Receiving halves handed over to the loop by `start()`.
pub(crate) struct LoopChannels {
    pub control_tx: mpsc::Sender<ControlMessage>,
    pub control_rx: mpsc::Receiver<ControlMessage>,
    pub errors_rx: mpsc::Receiver<ServiceError>,
    pub signals_rx: Option<mpsc::Receiver<Signal>>,
}

/// The stop-request entry point shared by the facade and the watchers.
///
/// Sets Stopping and sends one Stop message. No-op once Stopped.
pub(crate) async fn request_stop(
    state: &StateCell,
    control_tx: &mpsc::Sender<ControlMessage>,
) -> Result<(), SupervisorError> {
    if !state.begin_stopping() {
        return Ok(());
    }
    control_tx
        .send(ControlMessage::Stop)
        .await
        .map_err(|_| SupervisorError::ControlClosed)
}

/// Spawns the watchers and the dispatch loop under `logger`.
pub(crate) fn spawn(shared: Arc<Shared>, io: LoopChannels, logger: Dispatch) -> JoinHandle<()> {
    let halt = CancellationToken::new();

    if let Some(signals_rx) = io.signals_rx {
        tokio::spawn(
            watch_signals(
                Arc::clone(&shared),
                signals_rx,
                io.control_tx.clone(),
                halt.clone(),
            )
            .with_subscriber(logger.clone()),
        );
    }

    tokio::spawn(
        watch_errors_and_context(
            Arc::clone(&shared),
            io.errors_rx,
            io.control_tx,
            halt.clone(),
        )
        .with_subscriber(logger.clone()),
    );

    tokio::spawn(dispatch(shared, io.control_rx, halt).with_subscriber(logger))
}

/// Waits for one signal, then issues one stop request and exits.
async fn watch_signals(
    shared: Arc<Shared>,
    mut signals_rx: mpsc::Receiver<Signal>,
    control_tx: mpsc::Sender<ControlMessage>,
    halt: CancellationToken,
) {
    let sig = tokio::select! {
        _ = halt.cancelled() => return,
        sig = signals_rx.recv() => sig,
    };

    let Some(sig) = sig else {
        debug!("signal channel closed");
        return;
    };

    warn!(signal = %sig, "received signal: {sig}");
    if let Err(err) = request_stop(&shared.state, &control_tx).await {
        debug!(reason = err.as_label(), "stop request after signal not delivered");
    }
}

/// Logs reported errors; converts the first observed context cancellation into a stop request.
async fn watch_errors_and_context(
    shared: Arc<Shared>,
    mut errors_rx: mpsc::Receiver<ServiceError>,
    control_tx: mpsc::Sender<ControlMessage>,
    halt: CancellationToken,
) {
    let mut ctx_cancelled = false;

    loop {
        tokio::select! {
            _ = halt.cancelled() => break,
            Some(err) = errors_rx.recv() => {
                error!(label = err.as_label(), "{err}");
            }
            _ = shared.ctx.cancelled(), if !ctx_cancelled => {
                ctx_cancelled = true;
                warn!("context cancelled");
                if let Err(err) = request_stop(&shared.state, &control_tx).await {
                    debug!(reason = err.as_label(), "stop request after cancellation not delivered");
                }
            }
        }
    }
}

/// Single serialization point for Stop and Status.
async fn dispatch(
    shared: Arc<Shared>,
    mut control_rx: mpsc::Receiver<ControlMessage>,
    halt: CancellationToken,
) {
    while let Some(msg) = control_rx.recv().await {
        match msg {
            ControlMessage::Stop => {
                if stop_sequence(&shared).await {
                    break;
                }
            }
            ControlMessage::Status => shared.registry.status_all().await,
        }
    }

    drop(control_rx);
    halt.cancel();
    shared.teardown_signals();
    shared.join_gate().release();
}

/// Runs the two-phase stop; returns true once the state is Stopped.
async fn stop_sequence(shared: &Shared) -> bool {
    if shared.state.transition(State::Running, State::Stopping) {
        warn!("stopping services");
    }

    if shared.state.is_stopping() {
        let stop_ctx = CancellationToken::new();
        let stopped = match shared.shutdown_deadline() {
            None => shared.registry.stop_all(&stop_ctx).await,
            Some(limit) => {
                let stop_all = shared.registry.stop_all(&stop_ctx);
                tokio::pin!(stop_all);
                tokio::select! {
                    n = &mut stop_all => n,
                    _ = tokio::time::sleep(limit) => {
                        warn!(timeout = ?limit, "shutdown timeout exceeded");
                        stop_ctx.cancel();
                        stop_all.await
                    }
                }
            }
        };

        shared.state.set(State::Stopped);
        info!(services = stopped, "stopped");
    }

    shared.state.is_stopped()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_stop_after_stopped_is_a_noop() {
        let state = StateCell::new();
        state.set(State::Stopped);
        let (tx, mut rx) = mpsc::channel(1);

        request_stop(&state, &tx).await.unwrap();

        assert!(state.is_stopped());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn request_stop_sets_stopping_and_sends_one_stop() {
        let state = StateCell::new();
        state.set(State::Running);
        let (tx, mut rx) = mpsc::channel(1);

        request_stop(&state, &tx).await.unwrap();

        assert!(state.is_stopping());
        assert_eq!(rx.try_recv().unwrap(), ControlMessage::Stop);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn request_stop_reports_closed_loop() {
        let state = StateCell::new();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        assert!(matches!(
            request_stop(&state, &tx).await,
            Err(SupervisorError::ControlClosed)
        ));
    }
}
