//! Queue persistence across restarts on the file and SQLite backends

use std::sync::Arc;

use crmsync::client::local_db::LocalDatabase;
use crmsync::client::offline::{FileStorage, KeyValueStorage, LocalQueue, QUEUE_STORAGE_KEY};
use crmsync::shared::queue_item::{ItemState, NewQueueItem};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn fill(queue: &LocalQueue) {
    queue
        .enqueue(NewQueueItem::create("Lead", "L1", json!({"name": "Acme"}), "U1"))
        .await;
    queue
        .enqueue(NewQueueItem::create("Payment", "P1", json!({"amount": 1200}), "U1"))
        .await;
    queue
        .enqueue(NewQueueItem::delete("Reminder", "R1", "U2"))
        .await;
}

fn summary(items: &[crmsync::shared::QueueItem]) -> Vec<(u64, String, String)> {
    items
        .iter()
        .map(|item| (item.id.0, item.model.clone(), item.record_id.clone()))
        .collect()
}

#[tokio::test]
async fn test_file_backend_restores_order_and_ids() {
    let dir = tempfile::tempdir().unwrap();

    let before = {
        let queue = LocalQueue::load(Arc::new(FileStorage::new(dir.path()))).await;
        fill(&queue).await;
        let first = queue.items().await[0].id;
        queue.record_failure(first, "timeout").await;
        queue.items().await
    };

    let restored = LocalQueue::load(Arc::new(FileStorage::new(dir.path()))).await;
    let after = restored.items().await;

    assert_eq!(summary(&after), summary(&before));
    assert_eq!(after[0].state, ItemState::Failed);
    assert_eq!(after[0].attempts, 1);
}

#[tokio::test]
async fn test_sqlite_backend_restores_order_and_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crmsync.db");

    let before = {
        let db = LocalDatabase::open(&path).await.unwrap();
        let queue = LocalQueue::load(Arc::new(db.clone())).await;
        fill(&queue).await;
        let items = queue.items().await;
        db.pool().close().await;
        items
    };

    let db = LocalDatabase::open(&path).await.unwrap();
    let restored = LocalQueue::load(Arc::new(db)).await;

    assert_eq!(summary(&restored.items().await), summary(&before));
    assert_eq!(restored.count_by_model("Payment").await, 1);
}

#[tokio::test]
async fn test_persisted_blob_is_camel_case_array() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(dir.path()));
    let queue = LocalQueue::load(storage.clone()).await;
    fill(&queue).await;

    let raw = storage.get(QUEUE_STORAGE_KEY).await.unwrap().unwrap();
    let blob: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let entries = blob.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["operation"], "CREATE");
    assert_eq!(entries[0]["recordId"], "L1");
    assert_eq!(entries[2]["operation"], "DELETE");
}
