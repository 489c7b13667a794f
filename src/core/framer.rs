//! Stream framing for analyzer byte streams
//!
//! Converts an irregularly-chunked serial byte stream into discrete packet
//! bodies. Framing rules, tried in order while draining the buffer:
//!
//! 1. Primary: text strictly between the STX (0x02) and ETX (0x03) control
//!    bytes
//! 2. Secondary: when a terminal marker (footer line prefix or trailing
//!    reference substring) is buffered without control bytes, cut at the last
//!    newline
//! 3. Idle flush: a non-empty buffer with no arrivals past the idle threshold
//!    is emitted whole, for instruments that omit the final terminator
//!
//! The drain loop is an explicit two-state machine: `Waiting` while bytes may
//! still arrive and frames are being drained, `Idle` once a tick observes a
//! stalled non-empty buffer. Byte decoding never fails.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Start-of-packet control byte
pub const STX: char = '\x02';
/// End-of-packet control byte
pub const ETX: char = '\x03';

/// Substrings that mark a transmission as complete when no ETX ever arrives
const TERMINAL_MARKERS: &[&str] = &["\n$FE", " CRP"];

/// One framed packet body, ready for field extraction
pub type RawPacketBody = String;

/// Byte decoding preference for the incoming stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StreamEncoding {
    /// Single-byte Latin-1 decoding; every byte maps to a character
    #[default]
    Latin1,
    /// Lossy UTF-8 decoding; undecodable sequences are dropped
    Utf8Lossy,
}

/// Decode incoming bytes to text; total over all inputs
pub fn decode(bytes: &[u8], encoding: StreamEncoding) -> String {
    match encoding {
        StreamEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        StreamEncoding::Utf8Lossy => String::from_utf8_lossy(bytes)
            .chars()
            .filter(|&c| c != char::REPLACEMENT_CHARACTER)
            .collect(),
    }
}

/// Framer drain state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerState {
    /// Bytes may still arrive; frames are drained as they complete
    Waiting,
    /// No new bytes observed; eligible for idle flush once the threshold
    /// elapses
    Idle,
}

/// Framer tuning
#[derive(Debug, Clone)]
pub struct FramerConfig {
    /// Idle period after which a non-empty buffer is flushed whole
    pub idle_flush: Duration,
    /// Soft cap on buffered text; exceeding it forces a flush
    pub max_buffer: usize,
    /// Byte decoding preference
    pub encoding: StreamEncoding,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            idle_flush: Duration::from_secs(5),
            max_buffer: 256 * 1024,
            encoding: StreamEncoding::default(),
        }
    }
}

/// Stateful packet framer owning the accumulation buffer for one connection
pub struct StreamFramer {
    config: FramerConfig,
    buffer: String,
    last_activity: Instant,
    state: FramerState,
}

impl Default for StreamFramer {
    fn default() -> Self {
        Self::new(FramerConfig::default())
    }
}

impl StreamFramer {
    /// Create a framer with the given tuning
    pub fn new(config: FramerConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            last_activity: Instant::now(),
            state: FramerState::Waiting,
        }
    }

    /// Feed newly arrived bytes, returning every packet body completed by
    /// them in arrival order
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<RawPacketBody> {
        if bytes.is_empty() {
            return Vec::new();
        }
        self.buffer.push_str(&decode(bytes, self.config.encoding));
        self.last_activity = Instant::now();
        self.state = FramerState::Waiting;

        let mut bodies = self.drain();
        if self.buffer.len() > self.config.max_buffer {
            tracing::warn!(
                "frame buffer exceeded {} bytes with no frame marker, forcing flush",
                self.config.max_buffer
            );
            bodies.push(std::mem::take(&mut self.buffer));
        }
        bodies
    }

    /// Periodic check for idle flush; returns the whole buffer as one body
    /// when the stream has stalled past the idle threshold
    pub fn tick(&mut self, now: Instant) -> Option<RawPacketBody> {
        if self.buffer.is_empty() {
            return None;
        }
        if now.duration_since(self.last_activity) > self.config.idle_flush {
            tracing::debug!("idle flush of {} buffered bytes", self.buffer.len());
            self.state = FramerState::Waiting;
            return Some(std::mem::take(&mut self.buffer));
        }
        self.state = FramerState::Idle;
        None
    }

    /// Current drain state
    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Number of buffered, not-yet-framed bytes
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn drain(&mut self) -> Vec<RawPacketBody> {
        let mut bodies = Vec::new();
        loop {
            if let Some(body) = self.take_primary() {
                bodies.push(body);
                continue;
            }
            if let Some(body) = self.take_secondary() {
                bodies.push(body);
                continue;
            }
            break;
        }
        bodies
    }

    /// Primary framing: STX ... ETX, text strictly between the control bytes
    fn take_primary(&mut self) -> Option<RawPacketBody> {
        let stx = self.buffer.find(STX)?;
        let etx = self.buffer.find(ETX)?;
        if etx <= stx {
            return None;
        }
        let body = self.buffer[stx + 1..etx].to_string();
        self.buffer.drain(..=etx);
        Some(body)
    }

    /// Secondary framing: a buffered terminal marker with no frame bytes;
    /// the packet runs through the last newline in the buffer
    fn take_secondary(&mut self) -> Option<RawPacketBody> {
        if !TERMINAL_MARKERS.iter().any(|m| self.buffer.contains(m)) {
            return None;
        }
        let last_nl = self.buffer.rfind('\n')?;
        if last_nl == 0 {
            return None;
        }
        let body = self.buffer[..=last_nl].to_string();
        self.buffer.drain(..=last_nl);
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_frames_one_chunk() {
        let mut framer = StreamFramer::default();
        let bodies = framer.feed(b"\x02A\x03\x02B\x03");
        assert_eq!(bodies, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn test_frame_split_across_feeds() {
        let mut framer = StreamFramer::default();
        assert!(framer.feed(b"\x02! 6.2").is_empty());
        assert!(framer.feed(b"3\nK 0.8").is_empty());
        let bodies = framer.feed(b"\x03");
        assert_eq!(bodies, vec!["! 6.23\nK 0.8".to_string()]);
    }

    #[test]
    fn test_secondary_framing_on_footer_marker() {
        let mut framer = StreamFramer::default();
        let bodies = framer.feed(b"! 6.23\nK 0.8\n$FE v1\n");
        assert_eq!(bodies, vec!["! 6.23\nK 0.8\n$FE v1\n".to_string()]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn test_secondary_framing_keeps_trailing_partial_line() {
        let mut framer = StreamFramer::default();
        let bodies = framer.feed(b"x CRP 0.8\nrest");
        assert_eq!(bodies, vec!["x CRP 0.8\n".to_string()]);
        assert_eq!(framer.buffered(), "rest".len());
    }

    #[test]
    fn test_idle_flush() {
        let mut framer = StreamFramer::default();
        assert!(framer.feed(b"\x02partial").is_empty());

        let now = Instant::now();
        assert_eq!(framer.tick(now), None);
        assert_eq!(framer.state(), FramerState::Idle);

        let later = now + Duration::from_secs(6);
        assert_eq!(framer.tick(later), Some("\x02partial".to_string()));
        assert_eq!(framer.buffered(), 0);
        assert_eq!(framer.state(), FramerState::Waiting);
    }

    #[test]
    fn test_tick_on_empty_buffer() {
        let mut framer = StreamFramer::default();
        assert_eq!(framer.tick(Instant::now() + Duration::from_secs(60)), None);
    }

    #[test]
    fn test_overflow_forces_flush() {
        let mut framer = StreamFramer::new(FramerConfig {
            max_buffer: 8,
            ..FramerConfig::default()
        });
        let bodies = framer.feed(b"0123456789ab");
        assert_eq!(bodies, vec!["0123456789ab".to_string()]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn test_latin1_decode_never_fails() {
        let mut framer = StreamFramer::default();
        let bodies = framer.feed(&[STX as u8, b'A', 0xFF, ETX as u8]);
        assert_eq!(bodies, vec!["A\u{ff}".to_string()]);
    }

    #[test]
    fn test_utf8_lossy_drops_bad_sequences() {
        assert_eq!(decode(b"A\xF0B", StreamEncoding::Utf8Lossy), "AB");
        assert_eq!(decode(b"A\xFFB", StreamEncoding::Latin1), "A\u{ff}B");
    }

    #[test]
    fn test_stale_etx_before_stx_waits_for_idle_flush() {
        // An ETX left over from a torn frame precedes the next STX; neither
        // framing rule applies, so the buffer rides until the idle flush.
        let mut framer = StreamFramer::default();
        assert!(framer.feed(b"\x03junk\x02pending\x03").is_empty());
        let flushed = framer.tick(Instant::now() + Duration::from_secs(6));
        assert_eq!(flushed, Some("\x03junk\x02pending\x03".to_string()));
    }
}
