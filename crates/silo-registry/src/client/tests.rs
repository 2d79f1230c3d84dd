//! Unit tests for the registry client

use super::*;

use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(uri: &str, scope: Option<&str>, auth: AuthConfig) -> RegistryClient {
    RegistryClient::with_options(RegistryOptions {
        registry: uri.to_string(),
        scope: scope.map(str::to_string),
        auth,
    })
    .unwrap()
}

#[tokio::test]
async fn test_default_client() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(client.registry(), PUBLIC_REGISTRY);
    assert_eq!(
        client.package_url("lodash", ""),
        "https://registry.npmjs.org/lodash"
    );
}

#[tokio::test]
async fn test_slash_appended_to_registry_root() {
    let client = client_for("https://npm.example.com", None, AuthConfig::default());
    assert_eq!(client.registry(), "https://npm.example.com/");
}

#[tokio::test]
async fn test_package_url_with_version_suffix() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(
        client.package_url("lodash", "4.17.21"),
        "https://registry.npmjs.org/lodash/4.17.21"
    );
}

#[tokio::test]
async fn test_scope_fallback_to_public_registry() {
    let client = client_for(
        "https://npm.pkg.github.com/",
        Some("@my-org"),
        AuthConfig::default(),
    );

    // in-scope names stay on the configured registry
    assert_eq!(
        client.package_url("@my-org/widgets", ""),
        "https://npm.pkg.github.com/@my-org/widgets"
    );

    // everything else resolves publicly
    assert_eq!(
        client.package_url("react", ""),
        "https://registry.npmjs.org/react"
    );
    assert_eq!(
        client.package_url("@other/pkg", "1.0.0"),
        "https://registry.npmjs.org/@other/pkg/1.0.0"
    );
}

#[tokio::test]
async fn test_no_scope_keeps_configured_registry() {
    let client = client_for("https://mirror.example.com/", None, AuthConfig::default());
    assert_eq!(
        client.package_url("react", ""),
        "https://mirror.example.com/react"
    );
}

#[tokio::test]
async fn test_bearer_token_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pkg"))
        .and(header("authorization", "Bearer sekrit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(
        &server.uri(),
        None,
        AuthConfig {
            token: Some("sekrit".to_string()),
            ..AuthConfig::default()
        },
    );
    let url = client.package_url("pkg", "");
    let response = client.get(&url).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_basic_auth_sent_when_no_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pkg"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(
        &server.uri(),
        None,
        AuthConfig {
            token: None,
            user: Some("alice".to_string()),
            password: Some("hunter2".to_string()),
        },
    );
    let url = client.package_url("pkg", "");
    let response = client.get(&url).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_no_auth_header_without_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pkg"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server.uri(), None, AuthConfig::default());
    let response = client.get(&client.package_url("pkg", "")).await.unwrap();
    assert_eq!(response.status(), 200);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let has_auth = requests[0]
        .headers
        .iter()
        .any(|(name, _)| name.as_str().eq_ignore_ascii_case("authorization"));
    assert!(!has_auth);
}
