//! Runtime core: state machine, registry and control loop.
//!
//! The only public entry point from this module is [`Supervisor`] (built via
//! [`SupervisorBuilder`]), plus the small value types it hands out.
//!
//! Internal modules:
//! - [`state`]: mutex-guarded lifecycle state;
//! - [`registry`]: ordered services with start-all/stop-all/status-all;
//! - [`gate`]: one-shot join gate released when stopping completes;
//! - [`signals`]: per-supervisor OS signal subscription;
//! - [`control`]: watchers and the serialized dispatch loop;
//! - [`supervisor`]: facade and channel wiring;
//! - [`builder`]: construction options.

mod builder;
mod config;
mod control;
mod gate;
mod registry;
mod signals;
mod state;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use gate::JoinGate;
pub use state::State;
pub use supervisor::Supervisor;
