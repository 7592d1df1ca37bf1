//! Core configuration types for the cache buster
//!
//! This module contains the `BusterConfig` struct that carries every knob
//! the resource hasher needs. Nothing is read from ambient global state:
//! callers build a config and hand it to `ResourceHasher::new`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Main configuration struct for digest computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusterConfig {
    /// Timeout in seconds for a whole remote request, body included
    ///
    /// Default: 30 seconds
    pub(crate) request_timeout_secs: u64,

    /// Timeout in seconds for establishing a remote connection
    ///
    /// Default: 10 seconds
    pub(crate) connect_timeout_secs: u64,

    /// Timeout in seconds for streaming one local file to the end
    ///
    /// Default: 30 seconds
    pub(crate) read_timeout_secs: u64,

    /// Upper bound on hashes in flight at once
    ///
    /// `None` launches every hash of a URL table together.
    ///
    /// Default: None
    pub(crate) max_concurrent_hashes: Option<usize>,
}

impl BusterConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    #[must_use]
    pub fn max_concurrent_hashes(&self) -> Option<usize> {
        self.max_concurrent_hashes
    }
}

impl Default for BusterConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            max_concurrent_hashes: None,
        }
    }
}
