//! # OS signals observed by the supervisor.

use std::fmt;

/// Termination signal delivered on the signal channel.
///
/// Displays with its conventional name (`SIGINT`, `SIGTERM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Interrupt (Ctrl-C in a terminal).
    Interrupt,
    /// Termination request (default `kill`, systemd, Kubernetes).
    Terminate,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
