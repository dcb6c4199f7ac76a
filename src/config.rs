//! Buffer configuration.
//!
//! Settings can be built in code or loaded from JSON, e.g. from a
//! connection-string parser that hands options down as a document:
//!
//! ```
//! use packetwire::BufferConfig;
//! use std::time::Duration;
//!
//! let config = BufferConfig::from_json(r#"{"read_timeout_ms": 1500}"#).unwrap();
//! assert_eq!(config.read_timeout(), Some(Duration::from_millis(1500)));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buffer::MAX_PACKET_SIZE;
use crate::error::Result;

/// Configuration for a [`PacketBuffer`](crate::PacketBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Per-read deadline in milliseconds. `0` disables the deadline.
    pub read_timeout_ms: u64,
    /// Largest frame whose buffer is kept for reuse.
    pub max_packet_size: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 0,
            max_packet_size: MAX_PACKET_SIZE,
        }
    }
}

impl BufferConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the per-read deadline. A zero duration disables it; any other
    /// duration is kept to at least one millisecond.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        let ms = if timeout.is_zero() {
            0
        } else {
            timeout.as_millis().max(1)
        };
        self.read_timeout_ms = u64::try_from(ms).unwrap_or(u64::MAX);
        self
    }

    /// Set the reuse cap for checkout buffers.
    pub fn with_max_packet_size(mut self, max_packet_size: usize) -> Self {
        self.max_packet_size = max_packet_size;
        self
    }

    /// The per-read deadline, if any.
    pub fn read_timeout(&self) -> Option<Duration> {
        match self.read_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}
