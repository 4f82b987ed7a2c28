//! # Control messages.
//!
//! Every producer (the supervisor's own `stop()`/`status()`, the signal and
//! cancellation watchers, any external holder of the control sender) shares
//! one channel. The dispatch loop handles messages one at a time, so Stop and
//! Status never run concurrently with each other.

use std::fmt;

/// Instruction for the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMessage {
    /// Run the stop sequence.
    Stop,
    /// Invoke every registered status operation once.
    Status,
}

impl ControlMessage {
    /// Returns the lowercase name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMessage::Stop => "stop",
            ControlMessage::Status => "status",
        }
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
