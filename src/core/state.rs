//! # Supervisor state machine.
//!
//! ```text
//! Unknown ──start()──► Running ──stop request──► Stopping ──stop_all()──► Stopped
//! ```
//!
//! [`StateCell`] is a mutex-guarded [`State`]. The mutator performs no
//! transition validation: any state may be set from any other. The stop
//! sequence relies on reading the current value, not on the cell refusing
//! illegal moves.

use std::fmt;

use parking_lot::Mutex;

/// Lifecycle phase of a supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Built, not started yet.
    #[default]
    Unknown,
    /// `start()` has fanned out every registered start operation.
    Running,
    /// A stop was requested; the stop sequence has not completed.
    Stopping,
    /// Every stop operation has been invoked. Terminal.
    Stopped,
}

impl State {
    /// Returns the lowercase name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Unknown => "unknown",
            State::Running => "running",
            State::Stopping => "stopping",
            State::Stopped => "stopped",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-protected holder of the current [`State`].
///
/// The lock is never held across an await point.
#[derive(Debug, Default)]
pub struct StateCell {
    inner: Mutex<State>,
}

impl StateCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> State {
        *self.inner.lock()
    }

    pub fn set(&self, state: State) {
        *self.inner.lock() = state;
    }

    /// Sets `to` only if the current value is `from`; returns whether it did.
    pub fn transition(&self, from: State, to: State) -> bool {
        let mut cur = self.inner.lock();
        if *cur == from {
            *cur = to;
            true
        } else {
            false
        }
    }

    /// Sets Stopping unless the state is already Stopped; returns whether it did.
    ///
    /// Check and write happen under one lock, so Stopped is never left.
    pub fn begin_stopping(&self) -> bool {
        let mut cur = self.inner.lock();
        if *cur == State::Stopped {
            false
        } else {
            *cur = State::Stopping;
            true
        }
    }

    pub fn is_running(&self) -> bool {
        self.get() == State::Running
    }

    pub fn is_stopping(&self) -> bool {
        self.get() == State::Stopping
    }

    pub fn is_stopped(&self) -> bool {
        self.get() == State::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), State::Unknown);
        assert!(!cell.is_running());
        assert!(!cell.is_stopping());
        assert!(!cell.is_stopped());
    }

    #[test]
    fn any_state_may_follow_any_other() {
        let cell = StateCell::new();
        cell.set(State::Stopped);
        assert!(cell.is_stopped());
        cell.set(State::Running);
        assert!(cell.is_running());
        cell.set(State::Stopping);
        assert!(cell.is_stopping());
    }

    #[test]
    fn transition_only_from_expected() {
        let cell = StateCell::new();
        assert!(!cell.transition(State::Running, State::Stopping));
        assert_eq!(cell.get(), State::Unknown);
        assert!(cell.transition(State::Unknown, State::Running));
        assert!(cell.is_running());
    }

    #[test]
    fn begin_stopping_never_leaves_stopped() {
        let cell = StateCell::new();
        assert!(cell.begin_stopping());
        assert!(cell.is_stopping());

        cell.set(State::Running);
        assert!(cell.begin_stopping());
        assert!(cell.is_stopping());

        cell.set(State::Stopped);
        assert!(!cell.begin_stopping());
        assert!(cell.is_stopped());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(State::Stopping.to_string(), "stopping");
        assert_eq!(State::default().as_str(), "unknown");
    }
}
