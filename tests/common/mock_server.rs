//! Mock server helpers for HTTP contract tests
//!
//! Thin wrappers over wiremock for the sync endpoints.

use std::time::Duration;

use crmsync::client::sync_client::HttpTransport;
use crmsync::shared::SyncConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

/// Transport pointed at `server` with the test token
pub fn transport_for(server: &MockServer) -> HttpTransport {
    let config = SyncConfig::builder()
        .server_url(server.uri())
        .api_token(TEST_TOKEN)
        .request_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    HttpTransport::new(&config).unwrap()
}

/// Answer every push with `response`
pub async fn mount_push(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/sync/push"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Answer every pull with `response`
pub async fn mount_pull(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/sync/pull"))
        .respond_with(response)
        .mount(server)
        .await;
}
