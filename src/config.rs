//! Configuration for framelink
//!
//! Centralized configuration with sensible defaults. Built once at startup
//! and passed by reference; nothing mutates it afterwards.

use std::time::Duration;

use crate::error::{LinkError, Result};

/// Largest payload a UDP datagram can carry over IPv4
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Main configuration for client and servers
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Address the command client connects to (host:port)
    pub server_addr: String,

    /// TCP listen address for the frame responder
    pub listen_addr: String,

    /// UDP bind address for the datagram service
    pub datagram_addr: String,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Fixed reply sent for every datagram
    pub ack_message: String,

    /// Max size of one decoded frame payload (in bytes)
    pub max_frame_size: usize,

    /// Receive buffer size for one datagram (in bytes)
    /// Longer datagrams are truncated by the OS.
    pub max_datagram_size: usize,

    // -------------------------------------------------------------------------
    // Concurrency Configuration
    // -------------------------------------------------------------------------
    /// Max datagram handlers running at once (None = unbounded)
    pub max_in_flight: Option<usize>,

    /// Max concurrent TCP connections on the frame responder
    pub max_connections: usize,

    // -------------------------------------------------------------------------
    // Timing Configuration
    // -------------------------------------------------------------------------
    /// Socket read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    /// How often server loops check for shutdown (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:7070".to_string(),
            listen_addr: "127.0.0.1:7070".to_string(),
            datagram_addr: "0.0.0.0:7070".to_string(),
            ack_message: "OK, data received".to_string(),
            max_frame_size: 1024 * 1024, // 1 MB
            max_datagram_size: 1024,
            max_in_flight: None,
            max_connections: 1024,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5000,
            poll_interval_ms: 100,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that limits and intervals are usable
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_size == 0 {
            return Err(LinkError::Config("max_frame_size must be non-zero".to_string()));
        }
        if self.max_datagram_size == 0 || self.max_datagram_size > MAX_UDP_PAYLOAD {
            return Err(LinkError::Config(format!(
                "max_datagram_size must be between 1 and {}, got {}",
                MAX_UDP_PAYLOAD, self.max_datagram_size
            )));
        }
        if self.max_in_flight == Some(0) {
            return Err(LinkError::Config("max_in_flight must be non-zero".to_string()));
        }
        if self.max_connections == 0 {
            return Err(LinkError::Config("max_connections must be non-zero".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(LinkError::Config("poll_interval_ms must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Read timeout as a socket option value
    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    /// Write timeout as a socket option value
    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the address the client connects to
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the UDP bind address
    pub fn datagram_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.datagram_addr = addr.into();
        self
    }

    /// Set the acknowledgment sent for every datagram
    pub fn ack_message(mut self, message: impl Into<String>) -> Self {
        self.config.ack_message = message.into();
        self
    }

    /// Set the maximum frame payload size (in bytes)
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set the datagram receive buffer size (in bytes)
    pub fn max_datagram_size(mut self, size: usize) -> Self {
        self.config.max_datagram_size = size;
        self
    }

    /// Bound the number of concurrent datagram handlers
    pub fn max_in_flight(mut self, limit: Option<usize>) -> Self {
        self.config.max_in_flight = limit;
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the shutdown poll interval (in milliseconds)
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
