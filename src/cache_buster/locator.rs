//! Classification of resource locators into local paths and remote URLs.

use std::fmt;
use std::path::PathBuf;

use url::Url;

/// Schemes fetched over the network; anything else is a filesystem path
const REMOTE_SCHEMES: &[&str] = &["http", "https"];

/// Where the bytes of a resource come from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceLocator {
    Local(PathBuf),
    Remote(Url),
}

impl ResourceLocator {
    /// Classify a URL table value
    ///
    /// The value is remote only when it parses as an absolute URL whose
    /// scheme is `http` or `https`. Scheme comparison happens after URL
    /// parsing, which lowercases the scheme (`HTTP://x` is remote).
    /// Everything else, including Windows drive paths such as `C:\x` that
    /// parse with a one-letter scheme, is a local path taken verbatim.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if REMOTE_SCHEMES.contains(&url.scheme()) => ResourceLocator::Remote(url),
            _ => ResourceLocator::Local(PathBuf::from(raw)),
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, ResourceLocator::Remote(_))
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLocator::Local(path) => write!(f, "{}", path.display()),
            ResourceLocator::Remote(url) => write!(f, "{url}"),
        }
    }
}
