use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Dispatch;

use super::{
    config::SupervisorConfig,
    signals::SignalSubscription,
    supervisor::{Channel, Supervisor},
};
use crate::error::SupervisorError;

/// Capacity of the signal channel; one pending signal is enough to trigger a stop.
const SIGNAL_CAPACITY: usize = 1;

/// Builder for constructing a [`Supervisor`] with optional features.
pub struct SupervisorBuilder {
    ctx: CancellationToken,
    cfg: SupervisorConfig,
    logger: Option<Dispatch>,
}

impl SupervisorBuilder {
    /// Creates a new builder bound to the ambient context `ctx`.
    pub fn new(ctx: CancellationToken) -> Self {
        Self {
            ctx,
            cfg: SupervisorConfig::default(),
            logger: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, cfg: SupervisorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Routes the supervisor's log lines (and those of the operations it
    /// calls) through `logger` instead of the default dispatcher.
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    /// Skips the default SIGINT/SIGTERM subscription and the signal channel.
    pub fn without_signals(mut self) -> Self {
        self.cfg.signals = false;
        self
    }

    /// Sets the stop-sequence deadline (`Duration::ZERO` = none).
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.shutdown_timeout = timeout;
        self
    }

    /// Builds the supervisor.
    ///
    /// When signals are enabled this subscribes to the OS signals right away,
    /// so it must run inside a Tokio runtime.
    pub fn build(self) -> Result<Supervisor, SupervisorError> {
        let logger = self
            .logger
            .unwrap_or_else(|| tracing::dispatcher::get_default(Dispatch::clone));

        let (signals, subscription) = if self.cfg.signals {
            let channel = Channel::bounded(SIGNAL_CAPACITY);
            let sub = SignalSubscription::subscribe(channel.tx.clone())
                .map_err(SupervisorError::SignalSubscription)?;
            (Some(channel), Some(sub))
        } else {
            (None, None)
        };

        Ok(Supervisor::from_parts(
            self.ctx,
            &self.cfg,
            logger,
            signals,
            subscription,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{ChannelWiring, StateAccess};
    use crate::core::State;
    use crate::error::ServiceError;
    use crate::messages::ControlMessage;

    #[tokio::test]
    async fn default_build_subscribes_to_signals() {
        let sup = Supervisor::builder(CancellationToken::new()).build().unwrap();
        assert!(sup.signals().is_some());
        assert!(sup.signals_subscribed());
        assert_eq!(sup.state(), State::Unknown);
    }

    #[tokio::test]
    async fn without_signals_has_no_signal_channel() {
        let sup = Supervisor::builder(CancellationToken::new())
            .without_signals()
            .build()
            .unwrap();
        assert!(sup.signals().is_none());
        assert!(!sup.signals_subscribed());
    }

    #[tokio::test]
    async fn replacing_signal_channel_tears_down_subscription() {
        let sup = Supervisor::builder(CancellationToken::new()).build().unwrap();
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        sup.set_signals_channel(Some((tx, rx))).unwrap();

        assert!(sup.signals().is_some());
        assert!(!sup.signals_subscribed());
    }

    #[tokio::test]
    async fn with_config_sets_channel_capacities() {
        let cfg = SupervisorConfig {
            signals: false,
            control_capacity: 3,
            errors_capacity: 0,
            ..SupervisorConfig::default()
        };
        let sup = SupervisorBuilder::new(CancellationToken::new())
            .with_config(cfg)
            .build()
            .unwrap();

        assert!(sup.signals().is_none());
        let control = sup.messages();
        for _ in 0..3 {
            control.try_send(ControlMessage::Status).unwrap();
        }
        assert!(control.try_send(ControlMessage::Status).is_err());

        let errors = sup.errors();
        errors.try_send(ServiceError::fail("first")).unwrap();
        assert!(errors.try_send(ServiceError::fail("second")).is_err());
    }

    #[test]
    fn options_land_in_config() {
        let b = SupervisorBuilder::new(CancellationToken::new())
            .with_shutdown_timeout(Duration::from_secs(2))
            .without_signals();
        assert_eq!(b.cfg.shutdown_deadline(), Some(Duration::from_secs(2)));
        assert!(!b.cfg.signals);
    }
}
