//! Remote hashing behaviour: status handling, transport failures, timeouts
//! and cancellation.

mod common;

use std::time::{Duration, Instant};

use common::*;
use css_cache_buster::cache_buster::md5_hex;
use css_cache_buster::{
    BusterConfig, HashError, ResourceHasher, TransformError, transform, transform_until,
};

#[tokio::test]
async fn test_remote_body_digest_is_deterministic() {
    let mut server = setup_mock_server().await;
    let body = vec![b'z'; 200_000];
    let _mock = create_body_mock(&mut server, "/big.bin", 200, &body).await;
    let url = test_url(&server, "/big.bin");

    let hasher = default_hasher();
    let first = hasher.hash(&url).await.unwrap();
    let second = hasher.hash(&url).await.unwrap();

    assert_eq!(first, md5_hex(&body));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_non_success_status_body_is_hashed() {
    let mut server = setup_mock_server().await;
    let _mock = create_body_mock(&mut server, "/gone.woff", 404, b"not found").await;

    let digest = default_hasher()
        .hash(&test_url(&server, "/gone.woff"))
        .await
        .unwrap();

    assert_eq!(digest, md5_hex(b"not found"));
}

#[tokio::test]
async fn test_connection_refused_is_fetch_error() {
    let url = refused_endpoint().await.unwrap();

    let err = default_hasher().hash(&url).await.unwrap_err();

    assert_eq!(err.locator(), url);
    assert!(matches!(err, HashError::Fetch { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_hung_server_times_out() {
    let (_listener, url) = hanging_endpoint().await.unwrap();
    let config = BusterConfig::builder()
        .request_timeout_secs(1)
        .build()
        .unwrap();

    let err = ResourceHasher::new(config)
        .unwrap()
        .hash(&url)
        .await
        .unwrap_err();

    match err {
        HashError::Timeout { locator, limit } => {
            assert_eq!(locator, url);
            assert_eq!(limit, Duration::from_secs(1));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_shutdown_cancels_hung_transform() {
    let (_listener, url) = hanging_endpoint().await.unwrap();
    let table = table(&[("a.png", url)]);

    let result = transform_until(
        "url(a.png)".into(),
        &table,
        &default_hasher(),
        tokio::time::sleep(Duration::from_millis(100)),
    )
    .await;

    assert!(matches!(result, Err(TransformError::Cancelled)));
}

#[tokio::test]
async fn test_external_client_timeout_reported_as_fetch() {
    let (_listener, url) = hanging_endpoint().await.unwrap();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = ResourceHasher::with_client(client, BusterConfig::default())
        .hash(&url)
        .await
        .unwrap_err();

    match err {
        HashError::Fetch { locator, source } => {
            assert_eq!(locator, url);
            assert!(source.is_timeout(), "got {source:?}");
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_local_failure_drops_pending_remote_hash() {
    let (_listener, url) = hanging_endpoint().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.woff");
    let missing = missing.to_str().unwrap().to_string();
    let table = table(&[("slow.ttf", url), ("missing.woff", missing.clone())]);

    // Default request timeout is 30s; the local failure must not wait for it
    let started = Instant::now();
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        transform(
            "url(slow.ttf) url(missing.woff)".into(),
            &table,
            &default_hasher(),
        ),
    )
    .await
    .expect("transform should fail without waiting on the hung request");

    let err = result.unwrap_err();
    let hash_error = err.hash_error().expect("stage failure carries hash error");
    assert!(matches!(hash_error, HashError::Read { .. }), "got {hash_error:?}");
    assert_eq!(hash_error.locator(), missing);
    assert!(started.elapsed() < Duration::from_secs(5));
}
