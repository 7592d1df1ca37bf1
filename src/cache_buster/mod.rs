//! CSS resource cache busting
//!
//! This module appends a content digest to every `url(...)` in a stylesheet
//! whose body appears in a caller-supplied URL table, so that changing a
//! resource's bytes changes every URL pointing at it.

// Sub-modules
pub mod hasher;
pub mod locator;
pub mod orchestrator;
pub mod rewriter;
pub mod types;

// Re-exports for public API
pub use hasher::{ResourceHasher, md5_hex};
pub use locator::ResourceLocator;
pub use orchestrator::{CacheBuster, build_digest_map, transform, transform_until};
pub use rewriter::{rewrite, with_cache_buster};
pub use types::{
    Contents, DigestMap, HashError, TransformError, TransformResult, TransformStage,
};
