//! Error types used by the supervisor and by supervised services.
//!
//! This module defines two enums:
//!
//! - [`SupervisorError`]: errors raised by the supervisor itself (wiring, control path).
//! - [`ServiceError`]: errors returned by a service's start operation or reported
//!   on the errors channel.
//!
//! Both types provide `as_label` for logs/metrics.

use thiserror::Error;

/// # Errors produced by the supervisor.
///
/// None of these is fatal to the process; they describe a request the
/// supervisor could not honour in its current phase.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// `start()` was already called; the receiving halves of the channels are owned by the control loop.
    #[error("supervisor already started")]
    AlreadyStarted,

    /// The control loop is gone (it exits once the stop sequence completes).
    #[error("control channel closed")]
    ControlClosed,

    /// Subscribing to OS signals failed at construction time.
    #[error("failed to subscribe to OS signals: {0}")]
    SignalSubscription(#[source] std::io::Error),
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lifevisor::SupervisorError;
    ///
    /// assert_eq!(SupervisorError::ControlClosed.as_label(), "control_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::AlreadyStarted => "already_started",
            SupervisorError::ControlClosed => "control_closed",
            SupervisorError::SignalSubscription(_) => "signal_subscription",
        }
    }
}

/// # Errors produced by services.
///
/// A start operation returns one of these; collaborators may also send them on
/// the errors channel. The supervisor logs the display text verbatim and never
/// stops because of an error alone.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Service-reported failure; displays the message unchanged.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// I/O failure inside a service (bind, connect, read...).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The service observed cancellation of its context.
    #[error("context cancelled")]
    Canceled,
}

impl ServiceError {
    /// Builds a [`ServiceError::Fail`] from anything displayable.
    ///
    /// ```
    /// use lifevisor::ServiceError;
    ///
    /// let err = ServiceError::fail("test error");
    /// assert_eq!(err.to_string(), "test error");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        ServiceError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Fail { .. } => "service_failed",
            ServiceError::Io(_) => "service_io",
            ServiceError::Canceled => "service_canceled",
        }
    }
}
