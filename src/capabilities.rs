//! # Capability traits.
//!
//! The supervisor's surface is split into three narrow interfaces so that a
//! collaborator can depend on exactly what it uses:
//!
//! - [`StateAccess`]: read and write the lifecycle [`State`].
//! - [`ChannelWiring`]: channel, join gate, logger and timeout accessors/setters.
//! - [`Lifecycle`]: start, request stop, request status, join.
//!
//! [`Supervisor`](crate::Supervisor) implements all three. Import them via
//! [`crate::prelude`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::Dispatch;

use crate::core::{JoinGate, State};
use crate::error::{ServiceError, SupervisorError};
use crate::messages::{ControlMessage, HealthMessage, Signal};

/// Guarded access to the lifecycle state.
pub trait StateAccess {
    fn state(&self) -> State;

    /// Overwrites the state. No transition validation is performed.
    fn set_state(&self, state: State);

    fn is_running(&self) -> bool {
        self.state() == State::Running
    }

    fn is_stopping(&self) -> bool {
        self.state() == State::Stopping
    }

    fn is_stopped(&self) -> bool {
        self.state() == State::Stopped
    }
}

/// Channel wiring and configuration hooks.
///
/// Setters for channels the control loop consumes (control, errors, signals)
/// and for the join gate fail with [`SupervisorError::AlreadyStarted`] once
/// `start()` has run.
pub trait ChannelWiring {
    /// Sender for control messages.
    fn messages(&self) -> mpsc::Sender<ControlMessage>;
    fn set_message_channel(
        &self,
        tx: mpsc::Sender<ControlMessage>,
        rx: mpsc::Receiver<ControlMessage>,
    ) -> Result<(), SupervisorError>;

    /// Sender for health reports.
    fn health(&self) -> mpsc::Sender<HealthMessage>;
    /// Hands out the health receiver. The supervisor never reads it; returns `None` once taken.
    fn take_health_receiver(&self) -> Option<mpsc::Receiver<HealthMessage>>;
    fn set_health_channel(
        &self,
        tx: mpsc::Sender<HealthMessage>,
        rx: mpsc::Receiver<HealthMessage>,
    );

    /// Sender for service-reported errors.
    fn errors(&self) -> mpsc::Sender<ServiceError>;
    fn set_errors_channel(
        &self,
        tx: mpsc::Sender<ServiceError>,
        rx: mpsc::Receiver<ServiceError>,
    ) -> Result<(), SupervisorError>;

    /// Sender for OS signals, `None` when signal handling is disabled.
    fn signals(&self) -> Option<mpsc::Sender<Signal>>;
    /// Replaces (or with `None`, removes) the signal channel.
    ///
    /// Tears down the default OS subscription, which forwards to the old channel.
    fn set_signals_channel(
        &self,
        channel: Option<(mpsc::Sender<Signal>, mpsc::Receiver<Signal>)>,
    ) -> Result<(), SupervisorError>;

    fn join_gate(&self) -> JoinGate;
    fn set_join_gate(&self, gate: JoinGate) -> Result<(), SupervisorError>;

    /// Dispatcher the supervisor logs through.
    fn logger(&self) -> Dispatch;
    /// Takes effect for tasks spawned by a later `start()`.
    fn set_logger(&self, logger: Dispatch);

    fn shutdown_timeout(&self) -> Duration;
    /// `Duration::ZERO` disables the deadline.
    fn set_shutdown_timeout(&self, timeout: Duration);
}

/// Lifecycle control.
#[async_trait]
pub trait Lifecycle {
    /// Spawns the control loop, starts every registered service concurrently and
    /// returns once all start operations have returned.
    async fn start(&self) -> Result<(), SupervisorError>;

    /// Sets Stopping and sends a Stop message. No-op once Stopped.
    async fn stop(&self) -> Result<(), SupervisorError>;

    /// Sends a Status message.
    async fn status(&self) -> Result<(), SupervisorError>;

    /// Waits until the stop sequence has finished.
    async fn join(&self);
}
