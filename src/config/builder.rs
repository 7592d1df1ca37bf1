//! Fluent builder for `BusterConfig`
//!
//! Every field has a default, so the builder can be finished at any point.
//! `build()` validates the values that would otherwise surface as confusing
//! runtime failures (zero timeouts, a zero concurrency bound).

use thiserror::Error;

use super::types::BusterConfig;

/// Rejected configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A timeout of zero would fail every hash immediately
    #[error("{field} must be at least 1 second")]
    ZeroTimeout { field: &'static str },

    /// A bound of zero would never let a hash start
    #[error("max_concurrent_hashes must be at least 1")]
    ZeroConcurrency,
}

#[derive(Debug, Clone, Default)]
pub struct BusterConfigBuilder {
    pub(crate) config: BusterConfig,
}

impl BusterConfig {
    /// Create a builder for configuring a `BusterConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> BusterConfigBuilder {
        BusterConfigBuilder::default()
    }
}

impl BusterConfigBuilder {
    /// Set the timeout for a whole remote request
    ///
    /// The limit covers the response body too, so a server trickling bytes
    /// forever is cut off.
    ///
    /// # Example
    /// ```rust
    /// # use css_cache_buster::config::BusterConfig;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = BusterConfig::builder()
    ///     .request_timeout_secs(5)
    ///     .build()?;
    /// assert_eq!(config.request_timeout().as_secs(), 5);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    /// Set the timeout for streaming a single local file
    #[must_use]
    pub fn read_timeout_secs(mut self, secs: u64) -> Self {
        self.config.read_timeout_secs = secs;
        self
    }

    /// Bound the number of hashes running at once
    ///
    /// `None` (the default) launches every hash together.
    #[must_use]
    pub fn max_concurrent_hashes(mut self, limit: Option<usize>) -> Self {
        self.config.max_concurrent_hashes = limit;
        self
    }

    pub fn build(self) -> Result<BusterConfig, ConfigError> {
        let config = self.config;

        for (field, secs) in [
            ("request_timeout_secs", config.request_timeout_secs),
            ("connect_timeout_secs", config.connect_timeout_secs),
            ("read_timeout_secs", config.read_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::ZeroTimeout { field });
            }
        }

        if config.max_concurrent_hashes == Some(0) {
            return Err(ConfigError::ZeroConcurrency);
        }

        Ok(config)
    }
}
