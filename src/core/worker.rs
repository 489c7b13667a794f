//! Per-connection reader worker
//!
//! One background task per analyzer connection. The worker owns the
//! transport handle and one [`StreamFramer`] exclusively: it polls for
//! available bytes, feeds them through the framer, extracts each completed
//! packet body inline, and hands the record to the injected sink.
//! Cancellation is cooperative; the stop flag is checked once per loop
//! iteration and the transport is closed on every exit path.

use crate::core::extractor;
use crate::core::framer::{FramerConfig, StreamFramer};
use crate::core::sink::ResultSink;
use crate::core::transport::TransportTrait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Worker tuning
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sleep between polls when no bytes are pending; bounds shutdown latency
    pub poll_interval: Duration,
    /// Framer tuning
    pub framer: FramerConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(80),
            framer: FramerConfig::default(),
        }
    }
}

/// Handle to a running reader worker
pub struct ReaderWorker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ReaderWorker {
    /// Spawn a worker for one connection
    ///
    /// The worker takes exclusive ownership of the transport. Running two
    /// workers against the same physical connection is the caller's problem
    /// to prevent.
    pub fn spawn(
        transport: Box<dyn TransportTrait>,
        sink: Arc<dyn ResultSink>,
        config: WorkerConfig,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(run(transport, sink, config, stop.clone()));
        Self { stop, handle }
    }

    /// Request a cooperative stop; takes effect within one poll interval
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Check whether the worker has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the worker and wait for it to exit
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.handle.await;
    }
}

async fn run(
    mut transport: Box<dyn TransportTrait>,
    sink: Arc<dyn ResultSink>,
    config: WorkerConfig,
    stop: Arc<AtomicBool>,
) {
    if let Err(e) = transport.open().await {
        tracing::warn!("could not open {}: {}", transport.connection_info(), e);
        sink.on_status(&format!(
            "Could not open {}: {e}",
            transport.connection_info()
        ));
        return;
    }
    sink.on_status(&format!("Connected to {}", transport.connection_info()));

    let mut framer = StreamFramer::new(config.framer.clone());
    while !stop.load(Ordering::Relaxed) {
        let available = transport.bytes_available().unwrap_or(0);
        if available > 0 {
            match transport.read(available).await {
                Ok(bytes) if !bytes.is_empty() => {
                    for body in framer.feed(&bytes) {
                        emit(sink.as_ref(), &body);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("transport error, stopping reader: {}", e);
                    sink.on_status(&format!("Transport error: {e}"));
                    break;
                }
            }
        } else {
            if let Some(body) = framer.tick(Instant::now()) {
                emit(sink.as_ref(), &body);
            }
            tokio::time::sleep(config.poll_interval).await;
        }
    }

    // Unflushed buffered bytes are dropped here rather than emitted as a
    // possibly-torn record.
    let _ = transport.close().await;
    sink.on_status("Reader stopped");
}

fn emit(sink: &dyn ResultSink, body: &str) {
    let record = extractor::extract(body);
    tracing::debug!("decoded record {} ({} fields)", record.id(), record.len());
    sink.on_record(record, body);
}
