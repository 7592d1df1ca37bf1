//! The caller-supplied mapping from CSS-side URLs to resource locators.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a URL table from disk
#[derive(Debug, Error)]
pub enum UrlTableError {
    #[error("failed to read URL table {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("URL table {} is not a JSON object of strings", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// CSS-side URL → local path or `http(s)` URL of the real resource
///
/// Keys are the literal URL text as it appears inside `url(...)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlTable(BTreeMap<String, String>);

impl UrlTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the locator for a CSS-side URL
    pub fn insert(&mut self, css_url: impl Into<String>, locator: impl Into<String>) {
        self.0.insert(css_url.into(), locator.into());
    }

    #[must_use]
    pub fn get(&self, css_url: &str) -> Option<&str> {
        self.0.get(css_url).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(css_url, locator)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Load a table from a JSON file such as `{"a.woff": "./fonts/a.woff"}`
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UrlTableError> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path)
            .await
            .map_err(|source| UrlTableError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let table: Self = serde_json::from_slice(&raw).map_err(|source| UrlTableError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Loaded {} URL table entries from {}", table.len(), path.display());
        Ok(table)
    }
}

impl<K, V> FromIterator<(K, V)> for UrlTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
