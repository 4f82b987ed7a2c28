//! # Service registry.
//!
//! Ordered collection of registered services behind an async mutex.
//!
//! ## Operations
//! ```text
//! add(svc)                 → append (duplicates allowed, never removed)
//! start_all(ctx, errors)   → one task per service, concurrently; waits for all
//!                             └─ Err(e) ─► errors.send(e)   (blocks without a reader)
//! stop_all(ctx)            → sequential, registration order; returns count
//! status_all()             → sequential, registration order
//! ```
//!
//! ## Rules
//! - `add` and every iteration are mutually exclusive under the registry lock.
//! - `start_all` holds the lock only while launching; the start operations run unlocked.
//! - `stop_all` / `status_all` hold the lock for the whole pass: a hung operation
//!   stalls the ones after it (no per-service timeout here).
//! - Panics inside an operation are caught and logged; the pass continues.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error};

use crate::error::ServiceError;
use crate::services::ServiceRef;

/// Registry of services in registration order.
#[derive(Default)]
pub struct Registry {
    services: Mutex<Vec<ServiceRef>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a service.
    pub async fn add(&self, svc: ServiceRef) {
        self.services.lock().await.push(svc);
    }

    /// Number of registered services.
    pub async fn len(&self) -> usize {
        self.services.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.services.lock().await.is_empty()
    }

    /// Service names in registration order.
    pub async fn names(&self) -> Vec<String> {
        let services = self.services.lock().await;
        services.iter().map(|s| s.name().to_string()).collect()
    }

    /// Runs every start operation concurrently and waits for all of them to return.
    ///
    /// Errors are forwarded to `errors`. Returns the number of services launched.
    pub async fn start_all(
        &self,
        ctx: &CancellationToken,
        errors: &mpsc::Sender<ServiceError>,
    ) -> usize {
        let mut set = JoinSet::new();
        {
            let services = self.services.lock().await;
            for svc in services.iter() {
                let svc = ServiceRef::clone(svc);
                let ctx = ctx.clone();
                let errors = errors.clone();

                set.spawn(
                    async move {
                        let outcome = AssertUnwindSafe(svc.start(ctx)).catch_unwind().await;
                        match outcome {
                            Ok(Ok(())) => {}
                            Ok(Err(err)) => {
                                if errors.send(err).await.is_err() {
                                    debug!(service = svc.name(), "errors channel closed, start error dropped");
                                }
                            }
                            Err(_panic) => {
                                error!(service = svc.name(), "start operation panicked");
                            }
                        }
                    }
                    .with_current_subscriber(),
                );
            }
        }

        let launched = set.len();
        while set.join_next().await.is_some() {}
        launched
    }

    /// Invokes every stop operation in registration order; returns how many were invoked.
    pub async fn stop_all(&self, ctx: &CancellationToken) -> usize {
        let services = self.services.lock().await;
        for svc in services.iter() {
            if AssertUnwindSafe(svc.stop(ctx.clone()))
                .catch_unwind()
                .await
                .is_err()
            {
                error!(service = svc.name(), "stop operation panicked");
            }
        }
        services.len()
    }

    /// Invokes every status operation in registration order.
    pub async fn status_all(&self) {
        let services = self.services.lock().await;
        for svc in services.iter() {
            if AssertUnwindSafe(svc.status()).catch_unwind().await.is_err() {
                error!(service = svc.name(), "status operation panicked");
            }
        }
    }
}
