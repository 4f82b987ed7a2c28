//! # Supervisor: the facade callers interact with.
//!
//! The [`Supervisor`] owns the state machine, the service registry and the
//! channel wiring. `start()` hands the receiving halves to the control loop
//! and fans out every start operation; everything after that flows through the
//! loop (see `core/control.rs`).
//!
//! ## Key responsibilities
//! - register services (any time; late registrations are not started)
//! - start: spawn the control loop, arm the join gate, run `start_all`, set Running
//! - request stop/status by sending control messages
//! - expose channel, gate, logger and timeout accessors ([`ChannelWiring`])
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use lifevisor::prelude::*;
//! use lifevisor::{ServiceFn, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::builder(CancellationToken::new())
//!         .without_signals()
//!         .build()?;
//!
//!     sup.register(ServiceFn::new("noop")).await;
//!
//!     sup.start().await?;
//!     assert!(sup.is_running());
//!
//!     sup.stop().await?;
//!     sup.join().await;
//!     assert!(sup.is_stopped());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Dispatch, debug};
use tracing::instrument::WithSubscriber;

use crate::capabilities::{ChannelWiring, Lifecycle, StateAccess};
use crate::core::config::SupervisorConfig;
use crate::core::control::{self, LoopChannels};
use crate::core::gate::JoinGate;
use crate::core::registry::Registry;
use crate::core::signals::SignalSubscription;
use crate::core::state::{State, StateCell};
use crate::error::{ServiceError, SupervisorError};
use crate::messages::{ControlMessage, HealthMessage, Signal};
use crate::services::{Service, ServiceRef};

/// A sender together with its receiver until `start()` takes the latter.
pub(crate) struct Channel<T> {
    pub tx: mpsc::Sender<T>,
    pub rx: Option<mpsc::Receiver<T>>,
}

impl<T> Channel<T> {
    /// `capacity` must be non-zero; config values go through the `*_clamped` accessors.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self { tx, rx: Some(rx) }
    }

    fn from_parts(tx: mpsc::Sender<T>, rx: mpsc::Receiver<T>) -> Self {
        Self { tx, rx: Some(rx) }
    }
}

/// Replaceable wiring. Guarded by one lock; never held across an await.
pub(crate) struct Wiring {
    pub control: Channel<ControlMessage>,
    pub health: Channel<HealthMessage>,
    pub errors: Channel<ServiceError>,
    pub signals: Option<Channel<Signal>>,
    pub gate: JoinGate,
    pub started: bool,
}

/// State shared between the facade and the control-loop tasks.
pub(crate) struct Shared {
    pub ctx: CancellationToken,
    pub state: StateCell,
    pub registry: Registry,
    pub wiring: Mutex<Wiring>,
    pub logger: RwLock<Dispatch>,
    pub shutdown_timeout: RwLock<Duration>,
    pub subscription: Mutex<Option<SignalSubscription>>,
}

impl Shared {
    pub fn join_gate(&self) -> JoinGate {
        self.wiring.lock().gate.clone()
    }

    pub fn shutdown_deadline(&self) -> Option<Duration> {
        let timeout = *self.shutdown_timeout.read();
        (timeout > Duration::ZERO).then_some(timeout)
    }

    pub fn teardown_signals(&self) {
        if let Some(sub) = self.subscription.lock().take() {
            sub.teardown();
        }
    }
}

/// Lifecycle supervisor for a set of registered services.
///
/// Cheap to clone; clones share the same state and wiring.
#[derive(Clone)]
pub struct Supervisor {
    shared: Arc<Shared>,
}

impl Supervisor {
    /// Starts building a supervisor bound to the ambient context `ctx`.
    pub fn builder(ctx: CancellationToken) -> super::builder::SupervisorBuilder {
        super::builder::SupervisorBuilder::new(ctx)
    }

    pub(crate) fn from_parts(
        ctx: CancellationToken,
        cfg: &SupervisorConfig,
        logger: Dispatch,
        signals: Option<Channel<Signal>>,
        subscription: Option<SignalSubscription>,
    ) -> Self {
        let wiring = Wiring {
            control: Channel::bounded(cfg.control_capacity_clamped()),
            health: Channel::bounded(cfg.health_capacity_clamped()),
            errors: Channel::bounded(cfg.errors_capacity_clamped()),
            signals,
            gate: JoinGate::new(),
            started: false,
        };

        Self {
            shared: Arc::new(Shared {
                ctx,
                state: StateCell::new(),
                registry: Registry::new(),
                wiring: Mutex::new(wiring),
                logger: RwLock::new(logger),
                shutdown_timeout: RwLock::new(cfg.shutdown_timeout),
                subscription: Mutex::new(subscription),
            }),
        }
    }

    /// The ambient context this supervisor observes.
    pub fn context(&self) -> &CancellationToken {
        &self.shared.ctx
    }

    /// Registers a service. Registering after `start()` is allowed but the
    /// service is not started retroactively.
    pub async fn register<S: Service>(&self, service: S) {
        self.shared.registry.add(Arc::new(service)).await;
    }

    /// Registers an already shared service.
    pub async fn register_ref(&self, service: ServiceRef) {
        self.shared.registry.add(service).await;
    }

    /// Names of registered services, in registration order.
    pub async fn services(&self) -> Vec<String> {
        self.shared.registry.names().await
    }

    /// Number of registered services.
    pub async fn service_count(&self) -> usize {
        self.shared.registry.len().await
    }

    /// True while the default OS signal subscription is forwarding.
    pub fn signals_subscribed(&self) -> bool {
        self.shared
            .subscription
            .lock()
            .as_ref()
            .is_some_and(SignalSubscription::is_active)
    }

    /// Takes the receiving halves for the control loop, arming the gate.
    fn take_loop_channels(
        &self,
    ) -> Result<(LoopChannels, mpsc::Sender<ServiceError>), SupervisorError> {
        let mut wiring = self.shared.wiring.lock();
        if wiring.started {
            return Err(SupervisorError::AlreadyStarted);
        }

        let (Some(control_rx), Some(errors_rx)) =
            (wiring.control.rx.take(), wiring.errors.rx.take())
        else {
            return Err(SupervisorError::AlreadyStarted);
        };
        let signals_rx = wiring.signals.as_mut().and_then(|ch| ch.rx.take());

        wiring.started = true;
        wiring.gate.arm();

        let io = LoopChannels {
            control_tx: wiring.control.tx.clone(),
            control_rx,
            errors_rx,
            signals_rx,
        };
        Ok((io, wiring.errors.tx.clone()))
    }

    fn ensure_not_started(wiring: &Wiring) -> Result<(), SupervisorError> {
        if wiring.started {
            Err(SupervisorError::AlreadyStarted)
        } else {
            Ok(())
        }
    }
}

impl StateAccess for Supervisor {
    fn state(&self) -> State {
        self.shared.state.get()
    }

    fn set_state(&self, state: State) {
        self.shared.state.set(state);
    }
}

impl ChannelWiring for Supervisor {
    fn messages(&self) -> mpsc::Sender<ControlMessage> {
        self.shared.wiring.lock().control.tx.clone()
    }

    fn set_message_channel(
        &self,
        tx: mpsc::Sender<ControlMessage>,
        rx: mpsc::Receiver<ControlMessage>,
    ) -> Result<(), SupervisorError> {
        let mut wiring = self.shared.wiring.lock();
        Self::ensure_not_started(&wiring)?;
        wiring.control = Channel::from_parts(tx, rx);
        Ok(())
    }

    fn health(&self) -> mpsc::Sender<HealthMessage> {
        self.shared.wiring.lock().health.tx.clone()
    }

    fn take_health_receiver(&self) -> Option<mpsc::Receiver<HealthMessage>> {
        self.shared.wiring.lock().health.rx.take()
    }

    fn set_health_channel(
        &self,
        tx: mpsc::Sender<HealthMessage>,
        rx: mpsc::Receiver<HealthMessage>,
    ) {
        self.shared.wiring.lock().health = Channel::from_parts(tx, rx);
    }

    fn errors(&self) -> mpsc::Sender<ServiceError> {
        self.shared.wiring.lock().errors.tx.clone()
    }

    fn set_errors_channel(
        &self,
        tx: mpsc::Sender<ServiceError>,
        rx: mpsc::Receiver<ServiceError>,
    ) -> Result<(), SupervisorError> {
        let mut wiring = self.shared.wiring.lock();
        Self::ensure_not_started(&wiring)?;
        wiring.errors = Channel::from_parts(tx, rx);
        Ok(())
    }

    fn signals(&self) -> Option<mpsc::Sender<Signal>> {
        self.shared
            .wiring
            .lock()
            .signals
            .as_ref()
            .map(|ch| ch.tx.clone())
    }

    fn set_signals_channel(
        &self,
        channel: Option<(mpsc::Sender<Signal>, mpsc::Receiver<Signal>)>,
    ) -> Result<(), SupervisorError> {
        {
            let mut wiring = self.shared.wiring.lock();
            Self::ensure_not_started(&wiring)?;
            wiring.signals = channel.map(|(tx, rx)| Channel::from_parts(tx, rx));
        }
        self.shared.teardown_signals();
        Ok(())
    }

    fn join_gate(&self) -> JoinGate {
        self.shared.join_gate()
    }

    fn set_join_gate(&self, gate: JoinGate) -> Result<(), SupervisorError> {
        let mut wiring = self.shared.wiring.lock();
        Self::ensure_not_started(&wiring)?;
        wiring.gate = gate;
        Ok(())
    }

    fn logger(&self) -> Dispatch {
        self.shared.logger.read().clone()
    }

    fn set_logger(&self, logger: Dispatch) {
        *self.shared.logger.write() = logger;
    }

    fn shutdown_timeout(&self) -> Duration {
        *self.shared.shutdown_timeout.read()
    }

    fn set_shutdown_timeout(&self, timeout: Duration) {
        *self.shared.shutdown_timeout.write() = timeout;
    }
}

#[async_trait]
impl Lifecycle for Supervisor {
    async fn start(&self) -> Result<(), SupervisorError> {
        let (io, errors_tx) = self.take_loop_channels()?;
        let logger = self.logger();

        control::spawn(Arc::clone(&self.shared), io, logger.clone());

        // A stop requested before start leaves the state Stopping; the loop
        // completes it and the services are not started.
        if self.shared.state.get() == State::Unknown {
            if self.shared.registry.is_empty().await {
                tracing::dispatcher::with_default(&logger, || debug!("no services registered"));
            }
            let launched = self
                .shared
                .registry
                .start_all(&self.shared.ctx, &errors_tx)
                .with_subscriber(logger.clone())
                .await;
            tracing::dispatcher::with_default(&logger, || debug!(services = launched, "started"));
            self.shared.state.transition(State::Unknown, State::Running);
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), SupervisorError> {
        let control_tx = self.messages();
        match control::request_stop(&self.shared.state, &control_tx).await {
            Err(SupervisorError::ControlClosed) if self.shared.state.is_stopped() => Ok(()),
            other => other,
        }
    }

    async fn status(&self) -> Result<(), SupervisorError> {
        self.messages()
            .send(ControlMessage::Status)
            .await
            .map_err(|_| SupervisorError::ControlClosed)
    }

    async fn join(&self) {
        self.join_gate().wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceFn;

    fn quiet() -> Supervisor {
        Supervisor::builder(CancellationToken::new())
            .without_signals()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn channel_setters_fail_after_start() {
        let sup = quiet();
        sup.start().await.unwrap();

        let (tx, rx) = mpsc::channel(1);
        assert!(matches!(
            sup.set_message_channel(tx, rx),
            Err(SupervisorError::AlreadyStarted)
        ));
        let (tx, rx) = mpsc::channel(1);
        assert!(matches!(
            sup.set_errors_channel(tx, rx),
            Err(SupervisorError::AlreadyStarted)
        ));
        assert!(matches!(
            sup.set_join_gate(JoinGate::new()),
            Err(SupervisorError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn service_count_tracks_registrations() {
        let sup = quiet();
        assert_eq!(sup.service_count().await, 0);
        sup.register(ServiceFn::new("a")).await;
        sup.register(ServiceFn::new("a")).await;
        assert_eq!(sup.service_count().await, 2);
    }

    #[tokio::test]
    async fn start_with_no_services_runs() {
        let sup = quiet();
        sup.start().await.unwrap();
        assert!(sup.is_running());
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let sup = quiet();
        sup.start().await.unwrap();
        assert!(matches!(sup.start().await, Err(SupervisorError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn gate_is_armed_by_start() {
        let sup = quiet();
        let gate = JoinGate::new();
        sup.set_join_gate(gate.clone()).unwrap();
        assert!(!gate.is_armed());

        sup.start().await.unwrap();
        assert!(gate.is_armed());
        assert!(!gate.is_released());
    }

    #[tokio::test]
    async fn health_receiver_is_handed_out_once() {
        let sup = quiet();
        assert!(sup.take_health_receiver().is_some());
        assert!(sup.take_health_receiver().is_none());

        let (tx, rx) = mpsc::channel(4);
        sup.set_health_channel(tx, rx);
        assert!(sup.take_health_receiver().is_some());
    }

    #[tokio::test]
    async fn shutdown_timeout_round_trips() {
        let sup = quiet();
        assert_eq!(sup.shutdown_timeout(), Duration::ZERO);
        assert_eq!(sup.shared.shutdown_deadline(), None);

        sup.set_shutdown_timeout(Duration::from_secs(3));
        assert_eq!(sup.shutdown_timeout(), Duration::from_secs(3));
        assert_eq!(sup.shared.shutdown_deadline(), Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn stop_before_start_skips_start_operations() {
        let sup = quiet();
        let started = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = started.clone();
        sup.register(ServiceFn::new("late").with_start(move |_ctx| {
            let flag = flag.clone();
            async move {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok::<(), ServiceError>(())
            }
        }))
        .await;

        sup.stop().await.unwrap();
        assert!(sup.is_stopping());

        sup.start().await.unwrap();
        sup.join().await;
        assert!(sup.is_stopped());
        assert!(!started.load(std::sync::atomic::Ordering::SeqCst));
    }
}
