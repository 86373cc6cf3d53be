//! HTTP contract of the push/pull transport, checked against wiremock

use std::time::Duration;

use assert_matches::assert_matches;
use crmsync::client::sync_client::{HttpTransport, SyncTransport};
use crmsync::shared::error::SyncError;
use crmsync::shared::protocol::PushRequest;
use crmsync::shared::queue_item::Operation;
use crmsync::shared::SyncConfig;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{mount_pull, mount_push, transport_for, TEST_TOKEN};

fn push_request() -> PushRequest {
    PushRequest {
        operation: Operation::Create,
        model: "Lead".to_string(),
        record_id: "L1".to_string(),
        data: json!({"name": "Acme"}),
        user_id: "U1".to_string(),
    }
}

#[tokio::test]
async fn test_push_sends_contract_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sync/push"))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .and(body_json(json!({
            "operation": "CREATE",
            "model": "Lead",
            "recordId": "L1",
            "data": {"name": "Acme"},
            "userId": "U1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"applied": true, "seq": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    crate::assert_ok!(transport.push(&push_request()).await);
}

#[tokio::test]
async fn test_push_conflict_flag() {
    let server = MockServer::start().await;
    mount_push(
        &server,
        ResponseTemplate::new(409).set_body_json(json!({"conflict": true, "message": "Lead L1 already exists"})),
    )
    .await;

    let error = transport_for(&server).push(&push_request()).await.unwrap_err();
    assert!(error.is_conflict());
    assert_eq!(error.to_string(), "Conflict: Lead L1 already exists");
}

#[tokio::test]
async fn test_push_conflict_flag_decides_not_status() {
    let server = MockServer::start().await;
    mount_push(
        &server,
        ResponseTemplate::new(409).set_body_json(json!({"message": "locked"})),
    )
    .await;

    let error = transport_for(&server).push(&push_request()).await.unwrap_err();
    assert!(!error.is_conflict());
    assert_matches!(error, SyncError::Api { status: 409, ref message } if message == "locked");
}

#[tokio::test]
async fn test_push_server_error_without_body() {
    let server = MockServer::start().await;
    mount_push(&server, ResponseTemplate::new(500)).await;

    let error = transport_for(&server).push(&push_request()).await.unwrap_err();
    assert_eq!(error.status_code(), Some(500));
}

#[tokio::test]
async fn test_pull_sends_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sync/pull"))
        .and(query_param("since", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "changes": [{
                "seq": 13,
                "operation": "DELETE",
                "model": "Reminder",
                "recordId": "R4",
                "data": null,
                "userId": "U3",
                "appliedAt": "2024-05-01T10:00:00Z"
            }],
            "cursor": 13
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = crate::assert_ok!(transport_for(&server).pull(Some(12)).await);
    assert_eq!(response.cursor, Some(13));
    assert_eq!(response.changes.len(), 1);
    assert_eq!(response.changes[0].operation, Operation::Delete);
}

#[tokio::test]
async fn test_pull_unauthenticated() {
    let server = MockServer::start().await;
    mount_pull(&server, ResponseTemplate::new(401)).await;

    crate::assert_err!(
        transport_for(&server).pull(None).await,
        SyncError::Unauthenticated
    );
}

#[tokio::test]
async fn test_pull_login_page_is_not_json() {
    let server = MockServer::start().await;
    mount_pull(
        &server,
        ResponseTemplate::new(200).set_body_raw(
            "<html><body>Please sign in</body></html>",
            "text/html; charset=utf-8",
        ),
    )
    .await;

    let error = transport_for(&server).pull(None).await.unwrap_err();
    assert_matches!(error, SyncError::NotJson { ref content_type } if content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_pull_media_type_is_case_insensitive() {
    let server = MockServer::start().await;
    mount_pull(
        &server,
        ResponseTemplate::new(200).set_body_raw("{\"changes\": [], \"cursor\": 4}", "Application/JSON"),
    )
    .await;

    let response = crate::assert_ok!(transport_for(&server).pull(Some(4)).await);
    assert!(response.changes.is_empty());
    assert_eq!(response.cursor, Some(4));
}

#[tokio::test]
async fn test_pull_garbled_json_is_not_json() {
    let server = MockServer::start().await;
    mount_pull(
        &server,
        ResponseTemplate::new(200).set_body_raw("{\"changes\": [oops", "application/json"),
    )
    .await;

    crate::assert_err!(
        transport_for(&server).pull(None).await,
        SyncError::NotJson { .. }
    );
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = SyncConfig::builder()
        .server_url(format!("http://127.0.0.1:{}", port))
        .request_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let transport = HttpTransport::new(&config).unwrap();

    crate::assert_err!(transport.push(&push_request()).await, SyncError::Http(_));
}
