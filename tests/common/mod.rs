//! Test utilities and helper functions for the cache buster test suite

use anyhow::Result;
use css_cache_buster::{BusterConfig, ResourceHasher, UrlTable};
use mockito::{Mock, Server, ServerGuard};
use std::io::Write;
use tempfile::NamedTempFile;

/// MD5 of the empty byte sequence
#[allow(dead_code)]
pub const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

/// Sets up a mock HTTP server
#[allow(dead_code)]
pub async fn setup_mock_server() -> ServerGuard {
    Server::new_async().await
}

/// Creates a mock endpoint that serves `body` with the given status
#[allow(dead_code)]
pub async fn create_body_mock(
    server: &mut ServerGuard,
    path: &str,
    status: usize,
    body: &[u8],
) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body(body)
        .create_async()
        .await
}

/// Helper to create test URLs
#[allow(dead_code)]
pub fn test_url(server: &ServerGuard, path: &str) -> String {
    format!("{}{}", server.url(), path)
}

/// Writes `content` to a fresh temporary file
#[allow(dead_code)]
pub fn create_temp_resource(content: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content)?;
    Ok(file)
}

/// Hasher with default configuration
#[allow(dead_code)]
pub fn default_hasher() -> ResourceHasher {
    ResourceHasher::new(BusterConfig::default()).expect("Failed to build test hasher")
}

/// Builds a URL table from literal pairs
#[allow(dead_code)]
pub fn table<K: AsRef<str>, V: AsRef<str>>(entries: &[(K, V)]) -> UrlTable {
    entries
        .iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect()
}

/// Binds a listener that completes TCP handshakes but never answers
///
/// Requests to the returned URL hang until the client gives up. The
/// listener must be kept alive for the duration of the test.
#[allow(dead_code)]
pub async fn hanging_endpoint() -> Result<(tokio::net::TcpListener, String)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/hang", listener.local_addr()?);
    Ok((listener, url))
}

/// Returns a URL on a port nothing listens on
#[allow(dead_code)]
pub async fn refused_endpoint() -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/refused"))
}
