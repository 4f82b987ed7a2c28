//! Values carried on the supervisor's channels.
//!
//! ## Contents
//! - [`ControlMessage`] instructions for the dispatch loop (Stop, Status)
//! - [`HealthMessage`] opaque health payload relayed on the health channel
//! - [`Signal`] OS signals forwarded on the signal channel
//!
//! See `core/mod.rs` for how the channels are wired.

mod control;
mod health;
mod signal;

pub use control::ControlMessage;
pub use health::HealthMessage;
pub use signal::Signal;
