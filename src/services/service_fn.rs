//! # Closure-backed service (`ServiceFn`)
//!
//! [`ServiceFn`] assembles a [`Service`] from closures. Each operation is set
//! through an option-style setter; any operation left unset is a no-op, so a
//! service may customize any subset of start/stop/status.
//!
//! Every call produces a fresh future; shared state between operations goes
//! through an explicit `Arc<...>` captured by the closures.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use tokio_util::sync::CancellationToken;
//! use lifevisor::{Service, ServiceError, ServiceFn};
//!
//! let stops = Arc::new(AtomicUsize::new(0));
//! let counter = stops.clone();
//!
//! let svc = ServiceFn::new("worker")
//!     .with_start(|_ctx: CancellationToken| async { Ok::<_, ServiceError>(()) })
//!     .with_stop(move |_ctx: CancellationToken| {
//!         let counter = counter.clone();
//!         async move { counter.fetch_add(1, Ordering::SeqCst); }
//!     });
//!
//! assert_eq!(svc.name(), "worker");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;
use crate::services::service::Service;

type StartFn =
    Box<dyn Fn(CancellationToken) -> BoxFuture<'static, Result<(), ServiceError>> + Send + Sync>;
type StopFn = Box<dyn Fn(CancellationToken) -> BoxFuture<'static, ()> + Send + Sync>;
type StatusFn = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Function-backed service implementation.
pub struct ServiceFn {
    name: Cow<'static, str>,
    start: StartFn,
    stop: StopFn,
    status: StatusFn,
}

impl ServiceFn {
    /// Creates a service whose three operations are no-ops.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            start: Box::new(|_: CancellationToken| async { Ok::<(), ServiceError>(()) }.boxed()),
            stop: Box::new(|_: CancellationToken| async {}.boxed()),
            status: Box::new(|| async {}.boxed()),
        }
    }

    /// Sets the start operation.
    pub fn with_start<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        self.start = Box::new(move |ctx: CancellationToken| f(ctx).boxed());
        self
    }

    /// Sets the stop operation.
    pub fn with_stop<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop = Box::new(move |ctx: CancellationToken| f(ctx).boxed());
        self
    }

    /// Sets the status operation.
    pub fn with_status<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.status = Box::new(move || f().boxed());
        self
    }

    /// Wraps the service into a shared handle.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for ServiceFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceFn")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Service for ServiceFn {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
        (self.start)(ctx).await
    }

    async fn stop(&self, ctx: CancellationToken) {
        (self.stop)(ctx).await
    }

    async fn status(&self) {
        (self.status)().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn unset_operations_are_noops() {
        let svc = ServiceFn::new("idle");
        assert!(svc.start(CancellationToken::new()).await.is_ok());
        svc.stop(CancellationToken::new()).await;
        svc.status().await;
    }

    #[tokio::test]
    async fn setters_replace_only_their_operation() {
        let probes = Arc::new(AtomicUsize::new(0));
        let counter = probes.clone();

        let svc = ServiceFn::new("probe").with_status(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        svc.status().await;
        svc.status().await;
        assert_eq!(probes.load(Ordering::SeqCst), 2);
        assert!(svc.start(CancellationToken::new()).await.is_ok());
    }

    #[tokio::test]
    async fn start_error_is_returned() {
        let svc = ServiceFn::new("broken")
            .with_start(|_ctx| async { Err::<(), _>(ServiceError::fail("bind failed")) });

        let err = svc.start(CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "bind failed");
    }

    #[tokio::test]
    async fn stop_receives_context() {
        let svc = ServiceFn::new("ctx").with_stop(|ctx: CancellationToken| async move {
            assert!(ctx.is_cancelled());
        });
        let ctx = CancellationToken::new();
        ctx.cancel();
        svc.stop(ctx).await;
    }
}
