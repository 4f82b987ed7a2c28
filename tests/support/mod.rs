//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lifevisor::{ServiceError, ServiceFn, Supervisor};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{Dispatch, Level};
use tracing_subscriber::fmt::MakeWriter;

/// In-memory log sink for a `tracing-subscriber` fmt layer.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A dispatcher writing plain text into the returned buffer.
pub fn capture_logs() -> (Dispatch, LogBuffer) {
    let buf = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buf.clone())
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
        .finish();
    (Dispatch::new(subscriber), buf)
}

/// Per-operation invocation counters.
#[derive(Default)]
pub struct Counters {
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub statused: AtomicUsize,
}

impl Counters {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn statused(&self) -> usize {
        self.statused.load(Ordering::SeqCst)
    }
}

/// A service bumping `counters` on every operation.
pub fn counting(name: &'static str, counters: Arc<Counters>) -> ServiceFn {
    let on_start = counters.clone();
    let on_stop = counters.clone();
    let on_status = counters;

    ServiceFn::new(name)
        .with_start(move |_ctx: CancellationToken| {
            let c = on_start.clone();
            async move {
                c.started.fetch_add(1, Ordering::SeqCst);
                Ok::<(), ServiceError>(())
            }
        })
        .with_stop(move |_ctx: CancellationToken| {
            let c = on_stop.clone();
            async move {
                c.stopped.fetch_add(1, Ordering::SeqCst);
            }
        })
        .with_status(move || {
            let c = on_status.clone();
            async move {
                c.statused.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_micros(500)).await;
            }
        })
}

/// Supervisor without OS signals, logging into a buffer, with one counting service.
pub async fn supervisor_with_counter(
    ctx: CancellationToken,
) -> (Supervisor, Arc<Counters>, LogBuffer) {
    let (logger, logs) = capture_logs();
    let sup = Supervisor::builder(ctx)
        .without_signals()
        .with_logger(logger)
        .build()
        .expect("build supervisor");

    let counters = Arc::new(Counters::default());
    sup.register(counting("test", counters.clone())).await;
    (sup, counters, logs)
}

/// Polls `cond` every 10ms until it holds or `within` elapses.
pub async fn eventually(within: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
