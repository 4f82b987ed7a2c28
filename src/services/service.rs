//! # Service abstraction.
//!
//! A [`Service`] is a named unit with three operations driven by the supervisor:
//! - `start(ctx)`: invoked once, concurrently with every other service, when the
//!   supervisor starts. A returned error is reported on the errors channel.
//! - `stop(ctx)`: invoked once, sequentially in registration order, during the
//!   stop sequence. Best effort; it has nothing to report back.
//! - `status()`: a side-effecting health probe, invoked for every Status message.
//!
//! `start()` on the supervisor returns only after every `start` operation has
//! returned, so long-running services should spawn their own background work
//! and return promptly.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;

/// Shared handle to a registered service.
pub type ServiceRef = Arc<dyn Service>;

/// # Supervised service.
///
/// Only [`name`](Service::name) and [`start`](Service::start) are required;
/// `stop` and `status` default to no-ops.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use lifevisor::{Service, ServiceError};
///
/// struct Cache;
///
/// #[async_trait]
/// impl Service for Cache {
///     fn name(&self) -> &str { "cache" }
///
///     async fn start(&self, _ctx: CancellationToken) -> Result<(), ServiceError> {
///         // warm up, spawn background refresh...
///         Ok(())
///     }
///
///     async fn stop(&self, ctx: CancellationToken) {
///         if ctx.is_cancelled() {
///             return; // shutdown deadline already passed
///         }
///         // flush...
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Returns the registration name. Names need not be unique.
    fn name(&self) -> &str;

    /// Starts the service.
    async fn start(&self, ctx: CancellationToken) -> Result<(), ServiceError>;

    /// Tears the service down. `ctx` is cancelled when the shutdown deadline passes.
    async fn stop(&self, _ctx: CancellationToken) {}

    /// Probes service health.
    async fn status(&self) {}
}
