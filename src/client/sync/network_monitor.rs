//! # Network Monitor
//!
//! Tracks whether the sync server is reachable.
//!
//! ## Features
//!
//! - **Single flag**: one boolean, seeded from a snapshot and flipped by
//!   transition events
//! - **No debouncing**: a flapping link produces a flapping state
//! - **Observable**: every transition is published on a `watch` channel
//! - **Probing**: [`ConnectivityTracker::spawn_probe_loop`] turns periodic
//!   reachability checks into transition events
//!
//! The tracker never starts a sync itself. Reacting to "back online" is
//! left to the auto-sync coordinator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::shared::config::SyncConfig;
use crate::shared::error::Result;
use crate::shared::protocol::HEALTH_PATH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl From<bool> for NetworkStatus {
    fn from(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

/// Something that can tell whether the server is reachable right now
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn check(&self) -> bool;
}

/// Probe that issues `GET /health` against the sync server
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            url: config.api_url(HEALTH_PATH),
        })
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn check(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Health probe failed: {}", e);
                false
            }
        }
    }
}

/// Shared online/offline state
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    sender: Arc<watch::Sender<bool>>,
}

impl ConnectivityTracker {
    /// Create a tracker seeded with `online`
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create a tracker seeded from one probe result
    pub async fn from_probe(probe: &dyn ConnectivityProbe) -> Self {
        Self::new(probe.check().await)
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn status(&self) -> NetworkStatus {
        self.is_online().into()
    }

    /// Apply a transition event.
    ///
    /// Subscribers are only woken when the value actually changes.
    pub fn set_online(&self, online: bool) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            tracing::info!("Connectivity changed: {:?}", NetworkStatus::from(online));
        }
    }

    /// Receiver that observes every transition
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Run `probe` every `interval` and feed the results into the tracker.
    ///
    /// The task runs until the returned handle is aborted.
    pub fn spawn_probe_loop(
        &self,
        probe: Arc<dyn ConnectivityProbe>,
        interval: Duration,
    ) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracker.set_online(probe.check().await);
            }
        })
    }
}

impl Default for ConnectivityTracker {
    fn default() -> Self {
        Self::new(true)
    }
}
