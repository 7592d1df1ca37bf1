pub mod cache_buster;
pub mod config;
pub mod url_table;
pub mod utils;

pub use cache_buster::{
    CacheBuster, Contents, DigestMap, HashError, ResourceHasher, ResourceLocator,
    TransformError, TransformResult, build_digest_map, rewrite, transform, transform_until,
};
pub use config::{BusterConfig, ConfigError};
pub use url_table::{UrlTable, UrlTableError};
pub use utils::CACHE_BUSTER_PARAM;
