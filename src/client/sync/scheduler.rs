//! # Sync Scheduler
//!
//! Decides when drain passes run: once after a startup delay, then on a
//! fixed interval, and whenever connectivity comes back.
//!
//! The scheduler is the only component that reacts to connectivity
//! transitions, so a reconnect produces one trigger rather than one per
//! observer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::sync::SyncEngine;
use crate::shared::config::SyncConfig;

/// Timing of automatic drain passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSchedule {
    pub enabled: bool,
    pub startup_delay: Duration,
    pub interval: Duration,
}

impl SyncSchedule {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            enabled: config.auto_sync,
            startup_delay: config.startup_delay,
            interval: config.sync_interval,
        }
    }
}

/// Handle of the background auto-sync task.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct AutoSync {
    handle: Option<JoinHandle<()>>,
}

impl AutoSync {
    /// Spawn the auto-sync task, or return an idle handle when the schedule
    /// is disabled.
    pub fn start(engine: Arc<SyncEngine>, schedule: SyncSchedule) -> Self {
        if !schedule.enabled {
            tracing::info!("Auto-sync disabled");
            return Self { handle: None };
        }

        let handle = tokio::spawn(async move {
            Self::run(engine, schedule).await;
        });
        Self {
            handle: Some(handle),
        }
    }

    async fn run(engine: Arc<SyncEngine>, schedule: SyncSchedule) {
        tokio::time::sleep(schedule.startup_delay).await;

        let mut online_rx = engine.tracker().subscribe();
        let mut ticker = tokio::time::interval(schedule.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if !*online_rx.borrow_and_update() {
                        continue;
                    }
                    tracing::info!("Back online, triggering sync");
                }
            }

            let result = engine.trigger_sync().await;
            if result.is_rejected() {
                tracing::debug!("Scheduled sync was rejected");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the background task
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AutoSync {
    fn drop(&mut self) {
        self.stop();
    }
}
