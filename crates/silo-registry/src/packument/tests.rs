//! Unit tests for the packument cache

use super::*;

use silo_cache::MemoryCache;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::RegistryOptions;

fn packument_body() -> serde_json::Value {
    serde_json::json!({
        "name": "smallest",
        "dist-tags": { "latest": "1.0.1" },
        "versions": {
            "1.0.0": { "dist": { "tarball": "https://x/smallest-1.0.0.tgz", "shasum": "aaa" } },
            "1.0.1": { "dist": { "tarball": "https://x/smallest-1.0.1.tgz", "shasum": "bbb" } }
        }
    })
}

async fn cache_against(server: &MockServer) -> PackumentCache {
    let client = RegistryClient::with_options(RegistryOptions {
        registry: server.uri(),
        ..RegistryOptions::default()
    })
    .unwrap();
    PackumentCache::new(Arc::new(client), Arc::new(MemoryCache::new()))
}

#[tokio::test]
async fn test_fetch_and_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/smallest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(packument_body()))
        .expect(1)
        .mount(&server)
        .await;

    let cache = cache_against(&server).await;
    let packument = cache.get("smallest").await.unwrap();
    assert_eq!(packument.name, "smallest");
    assert_eq!(packument.dist_tags.get("latest").unwrap(), "1.0.1");
    assert_eq!(packument.versions.len(), 2);
}

#[tokio::test]
async fn test_second_call_hits_cache_not_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/smallest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(packument_body()))
        .expect(1) // a second network call fails verification
        .mount(&server)
        .await;

    let cache = cache_against(&server).await;
    let first = cache.get("smallest").await.unwrap();
    let second = cache.get("smallest").await.unwrap();
    assert_eq!(first.dist_tags, second.dist_tags);
}

#[tokio::test]
async fn test_concurrent_calls_collapse_to_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/smallest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(packument_body()))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(cache_against(&server).await);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            cache.get("smallest").await.unwrap()
        }));
    }
    for handle in handles {
        let packument = handle.await.unwrap();
        assert_eq!(packument.name, "smallest");
    }
}

#[tokio::test]
async fn test_404_is_package_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let cache = cache_against(&server).await;
    let err = cache.get("ghost").await.unwrap_err();
    assert!(matches!(err, SiloError::PackageNotFound { ref name } if name == "ghost"));
}

#[tokio::test]
async fn test_401_is_package_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private-pkg"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let cache = cache_against(&server).await;
    assert!(cache.get("private-pkg").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_server_error_includes_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream melted"))
        .mount(&server)
        .await;

    let cache = cache_against(&server).await;
    let err = cache.get("broken").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("503"));
    assert!(message.contains("upstream melted"));
}

#[tokio::test]
async fn test_negative_results_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "flaky",
                "dist-tags": { "latest": "1.0.0" },
                "versions": { "1.0.0": { "dist": { "tarball": "https://x/f.tgz", "shasum": "" } } }
            })),
        )
        .mount(&server)
        .await;

    let cache = cache_against(&server).await;
    assert!(cache.get("flaky").await.is_err());
    // the 404 was not cached, so the retry reaches the now-healthy endpoint
    let packument = cache.get("flaky").await.unwrap();
    assert_eq!(packument.name, "flaky");
}
