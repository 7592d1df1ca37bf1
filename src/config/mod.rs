//! Configuration module for digest computation
//!
//! This module provides the `BusterConfig` struct and its builder for
//! configuring remote fetch and local read behaviour with validation and
//! sensible defaults.

// Sub-modules
pub mod builder;
pub mod types;

// Re-exports for public API
pub use builder::{BusterConfigBuilder, ConfigError};
pub use types::BusterConfig;
