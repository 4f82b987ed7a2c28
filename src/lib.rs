//! # lifevisor
//!
//! **Lifevisor** is a lifecycle supervisor for Tokio services.
//!
//! It starts a set of independently registered services concurrently, watches
//! OS signals, cancellation of an ambient context and reported errors, and
//! drives one shared state machine to an orderly, once-only shutdown.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Service    │   │   Service    │   │   Service    │
//!     │ start/stop/  │   │ start/stop/  │   │ start/stop/  │
//!     │   status     │   │   status     │   │   status     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (facade)                                              │
//! │  - Registry (ordered services, async mutex)                       │
//! │  - StateCell (Unknown → Running → Stopping → Stopped)             │
//! │  - Wiring (control / errors / health / signal channels)           │
//! │  - JoinGate (released once stopping completes)                    │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!  signal watcher   error/ctx watcher    dispatch loop
//!  (first signal)   (logs errors,        Stop   → stop sequence
//!        │           first cancel)       Status → status_all()
//!        └────────────┬─────┘                  ▲
//!                     └── request_stop() ──────┘  (Stop on the control channel)
//! ```
//!
//! ### Lifecycle
//! ```text
//! builder(ctx).build()      → Unknown   (SIGINT/SIGTERM subscribed unless disabled)
//! register(service)         → appended to the registry
//! start()                   → control loop spawned, gate armed,
//!                             start_all() (concurrent, waits for every start op),
//!                             Running
//! signal | ctx cancelled |
//! stop() | Stop message     → Stopping → stop_all() (sequential) → Stopped
//!                             join() waiters released
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                            |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------------|
//! | **Supervision**   | Start, stop, status, join.                                    | [`Supervisor`], [`Lifecycle`]                 |
//! | **Services**      | Define services as trait impls or closures.                   | [`Service`], [`ServiceFn`], [`ServiceRef`]    |
//! | **State**         | Guarded lifecycle state with predicates.                      | [`State`], [`StateAccess`]                    |
//! | **Wiring**        | Replaceable channels, join gate, logger, shutdown timeout.    | [`ChannelWiring`], [`JoinGate`]               |
//! | **Messages**      | Control, health and signal payloads.                          | [`ControlMessage`], [`HealthMessage`], [`Signal`] |
//! | **Errors**        | Typed errors for the supervisor and services.                 | [`SupervisorError`], [`ServiceError`]         |
//! | **Configuration** | Centralized settings.                                         | [`SupervisorConfig`]                          |
//!
//! ## Logging
//! All log lines go through [`tracing`]. Pass a [`tracing::Dispatch`] to
//! [`SupervisorBuilder::with_logger`] to route them (and the output of the
//! start/stop/status operations) somewhere specific; otherwise the dispatcher
//! current at build time is used.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use lifevisor::prelude::*;
//! use lifevisor::{ServiceError, ServiceFn, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = CancellationToken::new();
//!     let sup = Supervisor::builder(ctx.clone())
//!         .without_signals()
//!         .with_shutdown_timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     sup.register(
//!         ServiceFn::new("hello")
//!             .with_start(|_ctx: CancellationToken| async {
//!                 println!("hello started");
//!                 Ok::<_, ServiceError>(())
//!             })
//!             .with_stop(|_ctx: CancellationToken| async { println!("hello stopped") }),
//!     )
//!     .await;
//!
//!     sup.start().await?;
//!     ctx.cancel(); // same effect as SIGTERM
//!     sup.join().await;
//!     assert!(sup.is_stopped());
//!     Ok(())
//! }
//! ```
mod capabilities;
mod core;
mod error;
mod messages;
mod services;

// ---- Public re-exports ----

pub use capabilities::{ChannelWiring, Lifecycle, StateAccess};
pub use crate::core::{JoinGate, State, Supervisor, SupervisorBuilder, SupervisorConfig};
pub use error::{ServiceError, SupervisorError};
pub use messages::{ControlMessage, HealthMessage, Signal};
pub use services::{Service, ServiceFn, ServiceRef};

/// Capability traits, for `use lifevisor::prelude::*`.
pub mod prelude {
    pub use crate::capabilities::{ChannelWiring, Lifecycle, StateAccess};
}
