//! # Example: supervise
//!
//! Two services under one supervisor, stopped by Ctrl-C / SIGTERM.
//!
//! Demonstrates how to:
//! - Define services with [`ServiceFn`] and a hand-written [`Service`] impl.
//! - Keep background work alive past `start()` by spawning it.
//! - Ask for status through the control channel.
//! - Wait for the orderly shutdown with `join()`.
//!
//! ## Flow
//! ```text
//! build() ──► SIGINT/SIGTERM subscribed
//! start() ──► ticker.start() ║ api.start()   (concurrent)
//!         ──► Running
//! status() every 2s ──► ticker.status(), api.status()
//! Ctrl-C  ──► Stopping ──► ticker.stop() → api.stop() ──► Stopped ──► join() returns
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example supervise
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lifevisor::prelude::*;
use lifevisor::{Service, ServiceError, ServiceFn, Supervisor};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Counts ticks in a background task until its own token is cancelled.
struct Ticker {
    ticks: Arc<AtomicU64>,
    halt: CancellationToken,
}

#[async_trait]
impl Service for Ticker {
    fn name(&self) -> &str {
        "ticker"
    }

    async fn start(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
        let ticks = Arc::clone(&self.ticks);
        let halt = self.halt.clone();
        tokio::spawn(async move {
            let mut every = tokio::time::interval(Duration::from_millis(250));
            loop {
                tokio::select! {
                    _ = halt.cancelled() => break,
                    _ = ctx.cancelled() => break,
                    _ = every.tick() => { ticks.fetch_add(1, Ordering::Relaxed); }
                }
            }
        });
        Ok(())
    }

    async fn stop(&self, _ctx: CancellationToken) {
        self.halt.cancel();
        info!(ticks = self.ticks.load(Ordering::Relaxed), "ticker stopped");
    }

    async fn status(&self) {
        info!(ticks = self.ticks.load(Ordering::Relaxed), "ticker alive");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let ctx = CancellationToken::new();
    let sup = Supervisor::builder(ctx.clone())
        .with_shutdown_timeout(Duration::from_secs(5))
        .build()?;

    sup.register(Ticker {
        ticks: Arc::new(AtomicU64::new(0)),
        halt: CancellationToken::new(),
    })
    .await;

    sup.register(
        ServiceFn::new("api")
            .with_start(|_ctx: CancellationToken| async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                info!("api listening");
                Ok::<_, ServiceError>(())
            })
            .with_stop(|_ctx: CancellationToken| async { info!("api drained") })
            .with_status(|| async { info!("api healthy") }),
    )
    .await;

    sup.start().await?;
    info!(services = ?sup.services().await, "press Ctrl-C to stop");

    let prober = sup.clone();
    tokio::spawn(async move {
        let mut every = tokio::time::interval(Duration::from_secs(2));
        every.tick().await;
        loop {
            every.tick().await;
            if prober.status().await.is_err() {
                break;
            }
        }
    });

    sup.join().await;
    info!(state = %sup.state(), "bye");
    Ok(())
}
