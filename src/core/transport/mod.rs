//! Transport layer for analyzer connections
//!
//! The reader worker consumes transports through [`TransportTrait`]:
//! open, poll for available bytes, read, close. Implementations:
//! - Serial ports (the transport real analyzers use)
//! - In-memory scripted streams (tests and demos)

mod memory;
mod serial;

pub use memory::MemoryTransport;
pub use serial::{
    list_ports, SerialConfig, SerialFlowControl, SerialParity, SerialTransport, BAUD_RATES,
};

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

/// Transport configuration enumeration
#[derive(Debug, Clone)]
pub enum Transport {
    /// Serial port connection
    Serial(SerialConfig),
}

/// Transport type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    /// Serial port
    Serial,
    /// In-memory scripted stream
    Memory,
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "Serial"),
            Self::Memory => write!(f, "Memory"),
        }
    }
}

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Port not found
    #[error("Port not found: {0}")]
    PortNotFound(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Not open
    #[error("Transport not open")]
    NotOpen,

    /// Remote end closed the stream
    #[error("Disconnected")]
    Disconnected,
}

/// Transport contract consumed by the reader worker
#[async_trait]
pub trait TransportTrait: Send {
    /// Open the underlying connection
    async fn open(&mut self) -> Result<(), TransportError>;

    /// Number of bytes ready to read without blocking
    fn bytes_available(&self) -> Result<usize, TransportError>;

    /// Read up to `count` bytes; may return fewer
    async fn read(&mut self, count: usize) -> Result<Bytes, TransportError>;

    /// Close the underlying connection
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Check if the transport is open
    fn is_open(&self) -> bool;

    /// Get transport type
    fn transport_type(&self) -> TransportType;

    /// Get connection info string
    fn connection_info(&self) -> String;
}

/// Create a transport instance from configuration
pub fn create_transport(config: Transport) -> Box<dyn TransportTrait> {
    match config {
        Transport::Serial(cfg) => Box::new(SerialTransport::new(cfg)),
    }
}
