//! Application settings for the reader

use crate::core::framer::{FramerConfig, StreamEncoding};
use crate::core::transport::SerialConfig;
use crate::core::worker::WorkerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reader settings
    pub reader: ReaderSettings,
    /// Recently used ports
    pub recent_ports: Vec<String>,
}

impl AppConfig {
    /// Load config from the default location
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = super::config_dir()
            .ok_or("Could not determine config directory")?
            .join("config.toml");
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path; missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = super::config_dir()
            .ok_or("Could not determine config directory")?
            .join("config.toml");
        self.save_to(&config_path)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Remember a port as recently used, most recent first
    pub fn remember_port(&mut self, port: &str) {
        self.recent_ports.retain(|p| p != port);
        self.recent_ports.insert(0, port.to_string());
        self.recent_ports.truncate(8);
    }
}

/// Reader settings persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderSettings {
    /// Serial port configuration
    pub serial: SerialConfig,
    /// Poll sleep when no bytes are pending, in milliseconds
    pub poll_interval_ms: u64,
    /// Idle period after which a non-empty buffer is flushed, in seconds
    pub idle_flush_secs: u64,
    /// Soft cap on the frame buffer, in bytes
    pub max_buffer_bytes: usize,
    /// Byte decoding preference
    pub encoding: StreamEncoding,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        let framer = FramerConfig::default();
        Self {
            serial: SerialConfig::default(),
            poll_interval_ms: 80,
            idle_flush_secs: framer.idle_flush.as_secs(),
            max_buffer_bytes: framer.max_buffer,
            encoding: framer.encoding,
        }
    }
}

impl ReaderSettings {
    /// Build the worker tuning these settings describe
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            framer: FramerConfig {
                idle_flush: Duration::from_secs(self.idle_flush_secs),
                max_buffer: self.max_buffer_bytes,
                encoding: self.encoding,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_framer_defaults() {
        let settings = ReaderSettings::default();
        let config = settings.worker_config();
        assert_eq!(config.poll_interval, Duration::from_millis(80));
        assert_eq!(config.framer.idle_flush, Duration::from_secs(5));
        assert_eq!(config.framer.encoding, StreamEncoding::Latin1);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.reader.serial.port = "/dev/ttyUSB3".to_string();
        config.reader.idle_flush_secs = 9;
        config.remember_port("/dev/ttyUSB3");
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.reader.serial.port, "/dev/ttyUSB3");
        assert_eq!(loaded.reader.idle_flush_secs, 9);
        assert_eq!(loaded.recent_ports, ["/dev/ttyUSB3"]);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded.reader.poll_interval_ms, 80);
    }

    #[test]
    fn test_remember_port_dedupes() {
        let mut config = AppConfig::default();
        config.remember_port("COM1");
        config.remember_port("COM2");
        config.remember_port("COM1");
        assert_eq!(config.recent_ports, ["COM1", "COM2"]);
    }
}
