//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`] centralized settings for one supervisor instance.
//!
//! ## Sentinel values
//! - `shutdown_timeout = 0s` → no deadline for the stop sequence
//! - `*_capacity = 0` → clamped to 1 (Tokio channels cannot be unbuffered)

use std::time::Duration;

/// Configuration for a [`Supervisor`](crate::Supervisor).
///
/// ## Field semantics
/// - `signals`: subscribe to SIGINT/SIGTERM at build time
/// - `shutdown_timeout`: deadline handed to stop operations (`0s` = none)
/// - `control_capacity`: control channel buffer (min 1)
/// - `errors_capacity`: errors channel buffer (min 1)
/// - `health_capacity`: health channel buffer (min 1)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over checking the
/// sentinels directly.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Subscribe to the default OS signals (interrupt, terminate).
    pub signals: bool,

    /// Upper bound for the stop sequence.
    ///
    /// When non-zero, the context passed to every stop operation is cancelled
    /// once this much time has passed since the sequence began. Every stop
    /// operation is still invoked; the deadline only bounds cooperative ones.
    pub shutdown_timeout: Duration,

    /// Capacity of the control-message channel.
    pub control_capacity: usize,

    /// Capacity of the errors channel.
    pub errors_capacity: usize,

    /// Capacity of the health channel.
    pub health_capacity: usize,
}

impl SupervisorConfig {
    /// Returns the stop-sequence deadline as an `Option`.
    #[inline]
    pub fn shutdown_deadline(&self) -> Option<Duration> {
        if self.shutdown_timeout == Duration::ZERO {
            None
        } else {
            Some(self.shutdown_timeout)
        }
    }

    #[inline]
    pub fn control_capacity_clamped(&self) -> usize {
        self.control_capacity.max(1)
    }

    #[inline]
    pub fn errors_capacity_clamped(&self) -> usize {
        self.errors_capacity.max(1)
    }

    #[inline]
    pub fn health_capacity_clamped(&self) -> usize {
        self.health_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `signals = true`
    /// - `shutdown_timeout = 0s` (no deadline)
    /// - `control_capacity = 1`, `errors_capacity = 1`, `health_capacity = 1`
    fn default() -> Self {
        Self {
            signals: true,
            shutdown_timeout: Duration::ZERO,
            control_capacity: 1,
            errors_capacity: 1,
            health_capacity: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_no_deadline() {
        let mut cfg = SupervisorConfig::default();
        assert_eq!(cfg.shutdown_deadline(), None);

        cfg.shutdown_timeout = Duration::from_millis(250);
        assert_eq!(cfg.shutdown_deadline(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn capacities_are_clamped() {
        let cfg = SupervisorConfig {
            control_capacity: 0,
            errors_capacity: 0,
            health_capacity: 8,
            ..SupervisorConfig::default()
        };
        assert_eq!(cfg.control_capacity_clamped(), 1);
        assert_eq!(cfg.errors_capacity_clamped(), 1);
        assert_eq!(cfg.health_capacity_clamped(), 8);
    }
}
