//! End to end: sync engine and HTTP transport against the reference server

use std::sync::Arc;
use std::time::Duration;

use crmsync::backend::server::{create_app, ServerConfig};
use crmsync::client::offline::{MemoryStorage, RetryPolicy};
use crmsync::client::sync::{ConnectivityProbe, HttpProbe, PullOutcome, Resolution, ResolveOutcome};
use crmsync::client::{HttpTransport, SyncContext, SyncTransport};
use crmsync::shared::queue_item::{ItemState, NewQueueItem};
use crmsync::shared::SyncConfig;
use pretty_assertions::assert_eq;
use serde_json::json;

const TOKEN: &str = "server-test-token";

async fn spawn_server() -> String {
    let config = ServerConfig::default().with_tokens([TOKEN]);
    let app = create_app(&config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client_config(url: &str, token: Option<&str>) -> SyncConfig {
    let mut builder = SyncConfig::builder()
        .server_url(url)
        .request_timeout(Duration::from_secs(5))
        .max_retries(None);
    if let Some(token) = token {
        builder = builder.api_token(token);
    }
    builder.build().unwrap()
}

async fn context(url: &str, token: Option<&str>) -> SyncContext {
    let config = client_config(url, token);
    let transport = Arc::new(HttpTransport::new(&config).unwrap());
    let probe = HttpProbe::new(&config).unwrap();
    let tracker = crmsync::client::ConnectivityTracker::from_probe(&probe).await;

    SyncContext::with_parts(config, Arc::new(MemoryStorage::new()), transport, tracker).await
}

#[tokio::test]
async fn test_health_probe() {
    let url = spawn_server().await;
    let probe = HttpProbe::new(&client_config(&url, None)).unwrap();
    assert!(probe.check().await);
}

#[tokio::test]
async fn test_lead_lifecycle_round_trip() {
    let url = spawn_server().await;
    let writer = context(&url, Some(TOKEN)).await;
    assert!(writer.tracker().is_online());

    writer
        .queue()
        .enqueue(NewQueueItem::create("Lead", "L1", json!({"name": "Acme", "stage": "new"}), "U1"))
        .await;
    writer
        .queue()
        .enqueue(NewQueueItem::update("Lead", "L1", json!({"stage": "won"}), "U1"))
        .await;

    let result = writer.engine().trigger_sync().await;
    assert_eq!((result.synced, result.failed, result.conflicts), (2, 0, 0));
    assert_eq!(
        result.pull,
        Some(PullOutcome::Applied {
            changes: 2,
            cursor: Some(2)
        })
    );
    assert_eq!(writer.queue().count().await, 0);

    // a second client only sees what happened after its own cursor
    let reader = context(&url, Some(TOKEN)).await;
    let first = reader.engine().pull_changes().await;
    assert_eq!(
        first,
        PullOutcome::Applied {
            changes: 2,
            cursor: Some(2)
        }
    );
    let again = reader.engine().pull_changes().await;
    assert_eq!(
        again,
        PullOutcome::Applied {
            changes: 0,
            cursor: Some(2)
        }
    );
}

#[tokio::test]
async fn test_conflict_then_server_resolution() {
    let url = spawn_server().await;
    let client = context(&url, Some(TOKEN)).await;

    let orphan = client
        .queue()
        .enqueue(NewQueueItem::update("Payment", "P404", json!({"status": "verified"}), "U1"))
        .await;

    let result = client.engine().trigger_sync().await;
    assert_eq!(result.conflicts, 1);
    assert_eq!(client.queue().get(orphan).await.unwrap().state, ItemState::Conflict);

    assert_eq!(
        client.engine().resolve_conflict(orphan, Resolution::Local).await,
        ResolveOutcome::StillConflicting
    );
    assert_eq!(
        client.engine().resolve_conflict(orphan, Resolution::Server).await,
        ResolveOutcome::Discarded
    );
    assert_eq!(client.queue().count().await, 0);
}

#[tokio::test]
async fn test_missing_token_is_soft_failure() {
    let url = spawn_server().await;
    let client = context(&url, None).await;

    client
        .queue()
        .enqueue(NewQueueItem::create("Reminder", "R1", json!({"due": "tomorrow"}), "U1"))
        .await;

    let result = client.engine().trigger_sync().await;
    assert!(result.success);
    assert_eq!(result.failed, 1);
    assert_eq!(result.pull, Some(PullOutcome::Unauthenticated));
    assert_eq!(client.queue().count().await, 1);
}

#[tokio::test]
async fn test_unauthorized_push_carries_message() {
    let url = spawn_server().await;
    let transport = HttpTransport::new(&client_config(&url, Some("wrong"))).unwrap();

    let error = transport
        .push(&crmsync::shared::PushRequest {
            operation: crmsync::shared::Operation::Create,
            model: "Lead".to_string(),
            record_id: "L1".to_string(),
            data: json!({}),
            user_id: "U1".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(error.status_code(), Some(401));
    assert!(!error.is_conflict());
    assert!(error.to_string().contains("Not authenticated"));
}

#[tokio::test]
async fn test_retry_policy_from_config() {
    let config = SyncConfig::builder().max_retries(Some(3)).build().unwrap();
    assert_eq!(
        RetryPolicy::from_max_retries(config.max_retries),
        RetryPolicy::limited(3)
    );
}
