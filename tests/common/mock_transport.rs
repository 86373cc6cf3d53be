//! Scripted transport for engine tests
//!
//! Records every push in arrival order and answers from a per-record script.
//! Records without a script are accepted.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use crmsync::client::sync_client::SyncTransport;
use crmsync::shared::error::{Result, SyncError};
use crmsync::shared::protocol::{PullResponse, PushRequest};

/// Scripted answer to one push
#[derive(Debug, Clone)]
pub enum PushReply {
    Accept,
    Conflict,
    Fail(u16),
}

/// Scripted answer to every pull
#[derive(Debug, Clone)]
pub enum PullReply {
    Changes(PullResponse),
    Unauthenticated,
    NotJson,
    Fail(u16),
}

#[derive(Debug)]
pub struct ScriptedTransport {
    pushed: Mutex<Vec<PushRequest>>,
    replies: Mutex<HashMap<String, VecDeque<PushReply>>>,
    pull_reply: Mutex<PullReply>,
    pull_cursors: Mutex<Vec<Option<u64>>>,
    pulls: AtomicUsize,
    push_delay: Option<Duration>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self {
            pushed: Mutex::new(Vec::new()),
            replies: Mutex::new(HashMap::new()),
            pull_reply: Mutex::new(PullReply::Changes(PullResponse::default())),
            pull_cursors: Mutex::new(Vec::new()),
            pulls: AtomicUsize::new(0),
            push_delay: None,
        }
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every push sleeps for `delay` before answering
    pub fn with_push_delay(mut self, delay: Duration) -> Self {
        self.push_delay = Some(delay);
        self
    }

    /// Queue replies for pushes of `record_id`
    pub fn script(&self, record_id: &str, replies: impl IntoIterator<Item = PushReply>) {
        self.replies
            .lock()
            .unwrap()
            .entry(record_id.to_string())
            .or_default()
            .extend(replies);
    }

    pub fn set_pull_reply(&self, reply: PullReply) {
        *self.pull_reply.lock().unwrap() = reply;
    }

    pub fn pushed(&self) -> Vec<PushRequest> {
        self.pushed.lock().unwrap().clone()
    }

    pub fn push_count(&self) -> usize {
        self.pushed.lock().unwrap().len()
    }

    pub fn pull_count(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }

    pub fn pull_cursors(&self) -> Vec<Option<u64>> {
        self.pull_cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncTransport for ScriptedTransport {
    async fn push(&self, request: &PushRequest) -> Result<()> {
        self.pushed.lock().unwrap().push(request.clone());
        if let Some(delay) = self.push_delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&request.record_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(PushReply::Accept);

        match reply {
            PushReply::Accept => Ok(()),
            PushReply::Conflict => Err(SyncError::conflict(format!(
                "{} {} changed on the server",
                request.model, request.record_id
            ))),
            PushReply::Fail(status) => Err(SyncError::api(status, "scripted failure")),
        }
    }

    async fn pull(&self, cursor: Option<u64>) -> Result<PullResponse> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        self.pull_cursors.lock().unwrap().push(cursor);

        let reply = self.pull_reply.lock().unwrap().clone();
        match reply {
            PullReply::Changes(response) => Ok(response),
            PullReply::Unauthenticated => Err(SyncError::Unauthenticated),
            PullReply::NotJson => Err(SyncError::NotJson {
                content_type: "text/html".to_string(),
            }),
            PullReply::Fail(status) => Err(SyncError::api(status, "pull failed")),
        }
    }
}
