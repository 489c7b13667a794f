//! Result sink boundary
//!
//! Decoded records leave the core through [`ResultSink`], a one-way,
//! fire-and-forget notification interface. The sink reference is injected
//! into the worker at construction; the core holds no global notification
//! state. Two implementations ship with the crate: [`ChannelSink`] for hosts
//! that subscribe to a broadcast stream, and [`MemorySink`] for tests.

use crate::core::record::FieldRecord;
use parking_lot::RwLock;
use tokio::sync::broadcast;

/// Downstream consumer of decoded records and status messages
pub trait ResultSink: Send + Sync {
    /// A packet was framed and decoded; `raw` is the packet body text
    fn on_record(&self, record: FieldRecord, raw: &str);

    /// A human-readable status message (connection, shutdown, errors)
    fn on_status(&self, message: &str);
}

/// Events broadcast by [`ChannelSink`]
#[derive(Debug, Clone)]
pub enum ReaderEvent {
    /// A decoded record together with its raw packet text
    Record {
        /// The decoded record
        record: FieldRecord,
        /// Raw packet body the record was extracted from
        raw: String,
    },
    /// Status message
    Status(String),
}

/// Sink backed by a tokio broadcast channel
///
/// Emission is fire-and-forget: send errors (no live receivers) are ignored,
/// and a slow receiver only loses its own backlog.
pub struct ChannelSink {
    tx: broadcast::Sender<ReaderEvent>,
}

impl Default for ChannelSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl ChannelSink {
    /// Create a sink with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to reader events
    pub fn subscribe(&self) -> broadcast::Receiver<ReaderEvent> {
        self.tx.subscribe()
    }
}

impl ResultSink for ChannelSink {
    fn on_record(&self, record: FieldRecord, raw: &str) {
        let _ = self.tx.send(ReaderEvent::Record {
            record,
            raw: raw.to_string(),
        });
    }

    fn on_status(&self, message: &str) {
        let _ = self.tx.send(ReaderEvent::Status(message.to_string()));
    }
}

/// Sink that collects everything it receives; for tests and small hosts
#[derive(Default)]
pub struct MemorySink {
    records: RwLock<Vec<(FieldRecord, String)>>,
    statuses: RwLock<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected records with their raw packet text
    pub fn records(&self) -> Vec<(FieldRecord, String)> {
        self.records.read().clone()
    }

    /// Snapshot of the collected status messages
    pub fn statuses(&self) -> Vec<String> {
        self.statuses.read().clone()
    }
}

impl ResultSink for MemorySink {
    fn on_record(&self, record: FieldRecord, raw: &str) {
        self.records.write().push((record, raw.to_string()));
    }

    fn on_status(&self, message: &str) {
        self.statuses.write().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractor;

    #[tokio::test]
    async fn test_channel_sink_broadcasts() {
        let sink = ChannelSink::default();
        let mut rx = sink.subscribe();

        let record = extractor::extract("! 6.23");
        sink.on_record(record, "! 6.23");
        sink.on_status("hello");

        match rx.recv().await.unwrap() {
            ReaderEvent::Record { record, raw } => {
                assert_eq!(record.value("WBC"), Some("6.23 10^3/uL"));
                assert_eq!(raw, "! 6.23");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await.unwrap() {
            ReaderEvent::Status(message) => assert_eq!(message, "hello"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_channel_sink_without_receivers_is_silent() {
        let sink = ChannelSink::default();
        // No subscriber; must not panic or block
        sink.on_status("nobody listening");
    }

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        sink.on_record(extractor::extract("K 0.8"), "K 0.8");
        sink.on_status("ok");

        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.records()[0].0.value("CRP"), Some("0.8 mg/dL"));
        assert_eq!(sink.statuses(), ["ok"]);
    }
}
