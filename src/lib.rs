//! # Hemolink Core Library
//!
//! A serial packet decoder for laboratory hematology/CRP analyzers:
//! - Stream framing over STX/ETX control bytes, footer markers, idle flush
//! - Field extraction into insertion-ordered records
//! - Heuristic recovery of mislabeled patient identifiers
//! - One background reader worker per connection
//!
//! The decoded records leave the core through the [`ResultSink`] boundary;
//! persistence, UI and reporting live on the other side of it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hemolink_core::{
//!     ChannelSink, ReaderEvent, ReaderWorker, SerialConfig, SerialTransport, WorkerConfig,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = SerialTransport::new(SerialConfig::new("/dev/ttyUSB0", 9600));
//!     let sink = Arc::new(ChannelSink::default());
//!     let mut rx = sink.subscribe();
//!
//!     let worker = ReaderWorker::spawn(Box::new(transport), sink, WorkerConfig::default());
//!
//!     while let Ok(event) = rx.recv().await {
//!         match event {
//!             ReaderEvent::Record { record, .. } => println!("{}", record.receipt()),
//!             ReaderEvent::Status(message) => eprintln!("{message}"),
//!         }
//!     }
//!
//!     worker.shutdown().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::config::{AppConfig, ReaderSettings};
pub use crate::core::extractor::{extract, sanitize};
pub use crate::core::framer::{
    FramerConfig, FramerState, RawPacketBody, StreamEncoding, StreamFramer, ETX, STX,
};
pub use crate::core::identifiers::{Identifier, IDENTIFIER_MAP};
pub use crate::core::record::{FieldRecord, FieldValue, MISC};
pub use crate::core::resolver::resolve_id;
pub use crate::core::sink::{ChannelSink, MemorySink, ReaderEvent, ResultSink};
pub use crate::core::transport::{
    create_transport, list_ports, MemoryTransport, SerialConfig, SerialFlowControl, SerialParity,
    SerialTransport, Transport, TransportError, TransportTrait, TransportType, BAUD_RATES,
};
pub use crate::core::worker::{ReaderWorker, WorkerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
