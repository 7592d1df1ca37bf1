//! Content hashing for local and remote resources
//!
//! The hasher streams bytes into an MD5 accumulator without buffering the
//! whole resource:
//! - Local paths are read in fixed-size chunks through `tokio::fs::File`.
//! - Remote URLs are fetched with a plain GET and the body is consumed via
//!   `bytes_stream()`.
//!
//! The response status is never inspected. Whatever body bytes arrive,
//! error pages included, are what gets hashed.
//!
//! ## Usage
//!
//! ```ignore
//! use css_cache_buster::cache_buster::ResourceHasher;
//! use css_cache_buster::config::BusterConfig;
//!
//! let hasher = ResourceHasher::new(BusterConfig::default())?;
//! let digest = hasher.hash("/dev/null").await?;
//! assert_eq!(digest, "d41d8cd98f00b204e9800998ecf8427e");
//! ```

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use md5::{Digest, Md5};
use reqwest::Client;
use tokio::io::AsyncReadExt;
use url::Url;

use super::locator::ResourceLocator;
use super::types::HashError;
use crate::config::BusterConfig;
use crate::utils::READ_CHUNK_SIZE;

/// Lowercase hex MD5 of an in-memory byte slice
#[must_use]
pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Computes content digests for URL table locators
///
/// Cheap to clone: `reqwest::Client` is reference counted internally.
#[derive(Debug, Clone)]
pub struct ResourceHasher {
    client: Client,
    config: BusterConfig,
    /// Whether `client` was built from `config`, so its timeouts are known
    owns_client: bool,
}

impl ResourceHasher {
    /// Build a hasher with its own HTTP client configured from `config`
    pub fn new(config: BusterConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            config,
            owns_client: true,
        })
    }

    /// Build a hasher around an existing client
    ///
    /// The client's own timeouts apply to remote requests; `config` still
    /// governs local reads and concurrency. Remote timeouts surface as
    /// [`HashError::Fetch`] since the client's limits are not known here.
    #[must_use]
    pub fn with_client(client: Client, config: BusterConfig) -> Self {
        Self {
            client,
            config,
            owns_client: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BusterConfig {
        &self.config
    }

    /// Hash the bytes behind a URL table value
    pub async fn hash(&self, locator: &str) -> Result<String, HashError> {
        match ResourceLocator::classify(locator) {
            ResourceLocator::Remote(url) => self.hash_remote(locator, url).await,
            ResourceLocator::Local(path) => self.hash_local(locator, &path).await,
        }
    }

    async fn hash_remote(&self, locator: &str, url: Url) -> Result<String, HashError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.fetch_error(locator, e))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Hashing body of non-success response ({status}) from {locator}");
        }

        let mut hasher = Md5::new();
        let mut total_size = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| self.fetch_error(locator, e))?;
            hasher.update(&chunk);
            total_size += chunk.len() as u64;
        }

        let digest = hex::encode(hasher.finalize());
        log::debug!("Hashed {total_size} bytes from {locator}: {digest}");
        Ok(digest)
    }

    async fn hash_local(&self, locator: &str, path: &Path) -> Result<String, HashError> {
        let limit = self.config.read_timeout();

        let read = async {
            let mut file = tokio::fs::File::open(path).await?;
            let mut hasher = Md5::new();
            let mut buffer = vec![0u8; READ_CHUNK_SIZE];
            let mut total_size = 0u64;

            loop {
                let n = file.read(&mut buffer).await?;
                if n == 0 {
                    break;
                }
                hasher.update(&buffer[..n]);
                total_size += n as u64;
            }

            Ok::<_, std::io::Error>((hasher.finalize(), total_size))
        };

        let (digest, total_size) = tokio::time::timeout(limit, read)
            .await
            .map_err(|_| HashError::Timeout {
                locator: locator.to_string(),
                limit,
            })?
            .map_err(|source| HashError::Read {
                locator: locator.to_string(),
                source,
            })?;

        let digest = hex::encode(digest);
        log::debug!("Hashed {total_size} bytes from {locator}: {digest}");
        Ok(digest)
    }

    fn fetch_error(&self, locator: &str, source: reqwest::Error) -> HashError {
        let limit = if source.is_timeout() {
            self.timeout_limit(source.is_connect())
        } else {
            None
        };

        match limit {
            Some(limit) => HashError::Timeout {
                locator: locator.to_string(),
                limit,
            },
            None => HashError::Fetch {
                locator: locator.to_string(),
                source,
            },
        }
    }

    /// Limit that expired for a timed-out request, if this hasher set it
    fn timeout_limit(&self, during_connect: bool) -> Option<Duration> {
        if !self.owns_client {
            return None;
        }
        if during_connect {
            Some(self.config.connect_timeout())
        } else {
            Some(self.config.request_timeout())
        }
    }
}
