//! Digest map construction and the top-level transform
//!
//! All hashes for a URL table are launched together and joined with
//! fail-fast semantics: the first failure drops every hash still in
//! flight. The rewrite only starts once the digest map is complete.

use std::collections::HashMap;
use std::future::Future;

use futures::future::try_join_all;
use tokio::sync::Semaphore;

use super::hasher::ResourceHasher;
use super::rewriter::rewrite;
use super::types::{
    Contents, DigestMap, HashError, TransformError, TransformResult, TransformStage,
};
use crate::url_table::UrlTable;

/// Hash every locator of `table` and map each CSS-side key to its digest
///
/// Keys sharing a locator share one hash computation. An empty table
/// returns immediately without any I/O.
pub async fn build_digest_map(
    table: &UrlTable,
    hasher: &ResourceHasher,
) -> Result<DigestMap, HashError> {
    if table.is_empty() {
        return Ok(DigestMap::new());
    }

    let mut keys_by_locator: HashMap<&str, Vec<&str>> = HashMap::new();
    for (css_url, locator) in table.iter() {
        keys_by_locator.entry(locator).or_default().push(css_url);
    }

    let semaphore = hasher.config().max_concurrent_hashes().map(Semaphore::new);

    log::debug!(
        "Hashing {} distinct resources for {} URL table entries",
        keys_by_locator.len(),
        table.len()
    );

    let futures = keys_by_locator.keys().map(|&locator| {
        let semaphore = semaphore.as_ref();
        async move {
            // Only errs on a closed semaphore, which never happens here
            let _permit = match semaphore {
                Some(sem) => sem.acquire().await.ok(),
                None => None,
            };
            let digest = hasher.hash(locator).await?;
            Ok::<_, HashError>((locator, digest))
        }
    });

    let digests = try_join_all(futures).await?;

    let mut map = DigestMap::with_capacity(table.len());
    for (locator, digest) in digests {
        if let Some(keys) = keys_by_locator.get(locator) {
            for &css_url in keys {
                map.insert(css_url.to_string(), digest.clone());
            }
        }
    }

    Ok(map)
}

/// Rewrite a buffered stylesheet against `table`
///
/// Streamed contents are rejected before any hashing. Buffered bytes are
/// decoded as UTF-8, replacing invalid sequences with U+FFFD.
pub async fn transform(
    contents: Contents,
    table: &UrlTable,
    hasher: &ResourceHasher,
) -> TransformResult<String> {
    let bytes = match contents {
        Contents::Buffer(bytes) => bytes,
        Contents::Stream(_) => return Err(TransformError::UnsupportedInputKind),
    };

    let digests = build_digest_map(table, hasher)
        .await
        .map_err(|source| {
            log::warn!("Failed to hash {}: {source}", source.locator());
            TransformError::Stage {
                stage: TransformStage::DigestMap,
                source,
            }
        })?;

    let css = String::from_utf8_lossy(&bytes);
    Ok(rewrite(&css, &digests))
}

/// Like [`transform`], but gives up as soon as `shutdown` resolves
///
/// Every hash still in flight is dropped when shutdown wins the race.
pub async fn transform_until<F>(
    contents: Contents,
    table: &UrlTable,
    hasher: &ResourceHasher,
    shutdown: F,
) -> TransformResult<String>
where
    F: Future<Output = ()>,
{
    tokio::select! {
        result = transform(contents, table, hasher) => result,
        () = shutdown => {
            log::debug!("Cache busting cancelled by shutdown signal");
            Err(TransformError::Cancelled)
        }
    }
}

/// A URL table paired with the hasher that resolves it
///
/// Mirrors how a build step is configured once and then fed stylesheets
/// one at a time. Digests are recomputed for every stylesheet.
#[derive(Debug, Clone)]
pub struct CacheBuster {
    table: UrlTable,
    hasher: ResourceHasher,
}

impl CacheBuster {
    #[must_use]
    pub fn new(table: UrlTable, hasher: ResourceHasher) -> Self {
        Self { table, hasher }
    }

    #[must_use]
    pub fn table(&self) -> &UrlTable {
        &self.table
    }

    pub async fn transform(&self, contents: impl Into<Contents>) -> TransformResult<String> {
        transform(contents.into(), &self.table, &self.hasher).await
    }

    pub async fn transform_until<F>(
        &self,
        contents: impl Into<Contents>,
        shutdown: F,
    ) -> TransformResult<String>
    where
        F: Future<Output = ()>,
    {
        transform_until(contents.into(), &self.table, &self.hasher, shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache_buster::hasher::md5_hex;
    use crate::config::BusterConfig;
    use std::io::Write;

    fn hasher() -> ResourceHasher {
        ResourceHasher::new(BusterConfig::default()).unwrap()
    }

    fn temp_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[tokio::test]
    async fn test_empty_table_yields_empty_map() {
        let map = build_digest_map(&UrlTable::new(), &hasher()).await.unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_map_is_exact_over_table_keys() {
        let a = temp_file(b"alpha");
        let b = temp_file(b"beta");
        let a_path = a.path().to_str().unwrap();
        let b_path = b.path().to_str().unwrap();

        let table: UrlTable = [("a.png", a_path), ("b.png", b_path), ("alias.png", a_path)]
            .into_iter()
            .collect();

        let map = build_digest_map(&table, &hasher()).await.unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map["a.png"], md5_hex(b"alpha"));
        assert_eq!(map["alias.png"], md5_hex(b"alpha"));
        assert_eq!(map["b.png"], md5_hex(b"beta"));
    }

    #[tokio::test]
    async fn test_bounded_concurrency_still_hashes_everything() {
        let files: Vec<_> = (0..5).map(|i| temp_file(format!("{i}").as_bytes())).collect();
        let table: UrlTable = files
            .iter()
            .enumerate()
            .map(|(i, f)| (format!("{i}.png"), f.path().to_str().unwrap().to_string()))
            .collect();

        let config = BusterConfig::builder()
            .max_concurrent_hashes(Some(1))
            .build()
            .unwrap();
        let map = build_digest_map(&table, &ResourceHasher::new(config).unwrap())
            .await
            .unwrap();

        assert_eq!(map.len(), 5);
        assert_eq!(map["3.png"], md5_hex(b"3"));
    }

    #[tokio::test]
    async fn test_first_failure_aborts_map() {
        let ok = temp_file(b"ok");
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let table: UrlTable = [
            ("ok.png", ok.path().to_str().unwrap().to_string()),
            ("missing.png", missing.to_str().unwrap().to_string()),
        ]
        .into_iter()
        .collect();

        let err = build_digest_map(&table, &hasher()).await.unwrap_err();
        assert_eq!(err.locator(), missing.to_str().unwrap());
    }

    #[tokio::test]
    async fn test_transform_rejects_streams() {
        let contents = Contents::Stream(Box::pin(tokio::io::empty()));
        let err = transform(contents, &UrlTable::new(), &hasher())
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedInputKind));
    }

    #[tokio::test]
    async fn test_transform_decodes_invalid_utf8_lossily() {
        let contents = Contents::Buffer(b"a { b: \xff url(x) }".to_vec());
        let out = transform(contents, &UrlTable::new(), &hasher())
            .await
            .unwrap();
        assert_eq!(out, "a { b: \u{FFFD} url(x) }");
    }

    #[tokio::test]
    async fn test_transform_until_pending_shutdown_completes() {
        let table = UrlTable::new();
        let out = transform_until(
            "url(a.png)".into(),
            &table,
            &hasher(),
            std::future::pending(),
        )
        .await
        .unwrap();
        assert_eq!(out, "url(a.png)");
    }
}
