//! In-memory scripted transport
//!
//! Replays a prepared sequence of byte chunks, one chunk per read, exactly
//! as a slow serial link would hand them over. Used by the worker tests and
//! by demos that have no analyzer attached.

use super::{TransportError, TransportTrait, TransportType};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;

/// Scripted transport replaying canned byte chunks
pub struct MemoryTransport {
    chunks: VecDeque<Bytes>,
    open: bool,
    fail_open: bool,
}

impl MemoryTransport {
    /// Create a transport that will replay the given chunks in order
    pub fn new(chunks: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into_iter().map(Bytes::from).collect(),
            open: false,
            fail_open: false,
        }
    }

    /// Create a transport whose `open` call fails
    pub fn failing() -> Self {
        Self {
            chunks: VecDeque::new(),
            open: false,
            fail_open: true,
        }
    }

    /// Number of chunks not yet read
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }
}

#[async_trait]
impl TransportTrait for MemoryTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        if self.fail_open {
            return Err(TransportError::ConnectionFailed(
                "scripted open failure".to_string(),
            ));
        }
        self.open = true;
        Ok(())
    }

    fn bytes_available(&self) -> Result<usize, TransportError> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        Ok(self.chunks.front().map_or(0, Bytes::len))
    }

    async fn read(&mut self, _count: usize) -> Result<Bytes, TransportError> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        Ok(self.chunks.pop_front().unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn transport_type(&self) -> TransportType {
        TransportType::Memory
    }

    fn connection_info(&self) -> String {
        format!("memory ({} chunks)", self.chunks.len())
    }
}
