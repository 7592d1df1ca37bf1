//! Shared types for the cache buster: document contents, the digest map,
//! and the error hierarchy surfaced by hashing and transformation.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncRead;

/// CSS-side URL key → lowercase hex digest
///
/// Built fresh for every transform and dropped with it.
pub type DigestMap = HashMap<String, String>;

/// How a stylesheet is handed to the transform
///
/// Only fully buffered contents are supported. An incremental stream is
/// rejected up front rather than silently buffered.
pub enum Contents {
    Buffer(Vec<u8>),
    Stream(Pin<Box<dyn AsyncRead + Send>>),
}

impl Contents {
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self, Contents::Stream(_))
    }
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Contents::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Vec<u8>> for Contents {
    fn from(bytes: Vec<u8>) -> Self {
        Contents::Buffer(bytes)
    }
}

impl From<String> for Contents {
    fn from(text: String) -> Self {
        Contents::Buffer(text.into_bytes())
    }
}

impl From<&str> for Contents {
    fn from(text: &str) -> Self {
        Contents::Buffer(text.as_bytes().to_vec())
    }
}

/// Failure to compute the digest of one resource
#[derive(Debug, Error)]
pub enum HashError {
    /// Local file could not be opened or read
    #[error("failed to read local resource '{locator}'")]
    Read {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote request failed at the transport level
    ///
    /// Non-2xx statuses never produce this; their bodies are hashed.
    #[error("failed to fetch remote resource '{locator}'")]
    Fetch {
        locator: String,
        #[source]
        source: reqwest::Error,
    },

    /// Reading the resource took longer than the configured limit
    #[error("timed out after {limit:?} reading resource '{locator}'")]
    Timeout { locator: String, limit: Duration },
}

impl HashError {
    /// The locator whose bytes could not be hashed
    #[must_use]
    pub fn locator(&self) -> &str {
        match self {
            HashError::Read { locator, .. }
            | HashError::Fetch { locator, .. }
            | HashError::Timeout { locator, .. } => locator,
        }
    }
}

/// Stage of the transform at which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStage {
    DigestMap,
}

impl fmt::Display for TransformStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformStage::DigestMap => write!(f, "digest map construction"),
        }
    }
}

/// Error returned to callers of the top-level transform
#[derive(Debug, Error)]
pub enum TransformError {
    /// The document arrived as an incremental stream
    #[error("streaming input is not supported; provide a fully buffered document")]
    UnsupportedInputKind,

    /// A stage failed; the original cause is kept as the source
    #[error("cache busting failed during {stage}")]
    Stage {
        stage: TransformStage,
        #[source]
        source: HashError,
    },

    /// Shutdown was signalled before the transform finished
    #[error("cache busting was cancelled")]
    Cancelled,
}

impl TransformError {
    /// The underlying hashing failure, if any
    #[must_use]
    pub fn hash_error(&self) -> Option<&HashError> {
        match self {
            TransformError::Stage { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias for Result with `TransformError`
pub type TransformResult<T> = Result<T, TransformError>;
