//! # Per-supervisor OS signal subscription.
//!
//! [`SignalSubscription`] listens for termination signals and forwards them as
//! [`Signal`] values onto one supervisor's signal channel. It belongs to that
//! supervisor: two supervisors in the same process each get their own
//! subscription, and tearing one down does not affect the other.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal) → [`Signal::Interrupt`]
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes) → [`Signal::Terminate`]
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`] → [`Signal::Interrupt`]
//!
//! ## Rules
//! - Forwarding uses `try_send`: if the channel already holds an undelivered
//!   signal, the new one is dropped.
//! - Tokio keeps its process-level handler installed after teardown; deliveries
//!   are simply no longer forwarded.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::messages::Signal;

/// Owned subscription; dropping it stops forwarding.
#[derive(Debug)]
pub struct SignalSubscription {
    token: CancellationToken,
    forwarder: JoinHandle<()>,
}

impl SignalSubscription {
    /// Registers signal listeners and spawns the forwarder.
    ///
    /// Must be called inside a Tokio runtime. Returns `Err` if signal
    /// registration fails.
    #[cfg(unix)]
    pub fn subscribe(tx: mpsc::Sender<Signal>) -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        let token = CancellationToken::new();
        let stop = token.clone();

        let forwarder = tokio::spawn(async move {
            loop {
                let sig = tokio::select! {
                    _ = stop.cancelled() => break,
                    Some(()) = sigint.recv() => Signal::Interrupt,
                    Some(()) = sigterm.recv() => Signal::Terminate,
                    else => break,
                };
                forward(&tx, sig);
            }
        });

        Ok(Self { token, forwarder })
    }

    /// Registers the Ctrl-C listener and spawns the forwarder.
    ///
    /// Must be called inside a Tokio runtime.
    #[cfg(not(unix))]
    pub fn subscribe(tx: mpsc::Sender<Signal>) -> std::io::Result<Self> {
        let token = CancellationToken::new();
        let stop = token.clone();

        let forwarder = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    res = tokio::signal::ctrl_c() => match res {
                        Ok(()) => forward(&tx, Signal::Interrupt),
                        Err(err) => {
                            debug!(error = %err, "ctrl-c listener failed");
                            break;
                        }
                    },
                }
            }
        });

        Ok(Self { token, forwarder })
    }

    /// Stops forwarding. Idempotent.
    pub fn teardown(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.forwarder.is_finished()
    }
}

impl Drop for SignalSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn forward(tx: &mpsc::Sender<Signal>, sig: Signal) {
    if let Err(err) = tx.try_send(sig) {
        debug!(signal = %sig, reason = %err, "signal not forwarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn teardown_stops_forwarder() {
        let (tx, _rx) = mpsc::channel(1);
        let sub = SignalSubscription::subscribe(tx).unwrap();
        assert!(sub.is_active());

        sub.teardown();
        sub.teardown();
        assert!(!sub.is_active());
    }

    #[test]
    fn full_channel_drops_extra_signal() {
        let (tx, mut rx) = mpsc::channel(1);
        forward(&tx, Signal::Terminate);
        forward(&tx, Signal::Interrupt);

        assert_eq!(rx.try_recv().unwrap(), Signal::Terminate);
        assert!(rx.try_recv().is_err());
    }
}
