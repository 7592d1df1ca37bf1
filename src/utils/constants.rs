//! Shared configuration constants for the cache buster
//!
//! This module contains default values and wire-level constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Query parameter injected into every rewritten URL
///
/// Existing rewritten stylesheets depend on this exact name, so it is
/// not configurable.
pub const CACHE_BUSTER_PARAM: &str = "md5-by-cache-buster";

/// Default timeout for a whole remote request: 30 seconds
///
/// Covers connection, headers and the full body stream. A hung server
/// otherwise stalls every stylesheet waiting on the digest map.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default TCP/TLS connect timeout: 10 seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default timeout for reading one local file to the end: 30 seconds
///
/// Local reads rarely take long, but network mounts and FIFOs can block
/// forever.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Chunk size used when streaming local files into the digest: 8 KiB
pub const READ_CHUNK_SIZE: usize = 8 * 1024;
