/**
 * CRM Sync Agent Entry Point
 *
 * Headless client process: loads configuration, restores the local queue,
 * keeps connectivity up to date, drains the queue on schedule and logs the
 * status surface until interrupted.
 */
use std::sync::Arc;

use crmsync::client::config;
use crmsync::client::sync::HttpProbe;
use crmsync::client::SyncContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = config::load()?;
    tracing::info!(
        "Starting sync agent against {} ({:?} storage)",
        config.server_url,
        config.storage
    );

    let context = SyncContext::build(config.clone()).await?;

    let probe = Arc::new(HttpProbe::new(&config)?);
    let probe_task = context
        .tracker()
        .spawn_probe_loop(probe, config.sync_interval);

    let _auto_sync = context.start_auto_sync();
    let poller = context.status().spawn_polling(config.status_poll_interval);
    let mut status_rx = poller.subscribe();

    let mut changes_rx = context.engine().subscribe_changes();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down sync agent");
                break;
            }
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = status_rx.borrow_and_update().clone();
                tracing::info!(
                    "Queue: {} pending, {} failed, {} conflicts (online: {})",
                    snapshot.pending,
                    snapshot.failed,
                    snapshot.conflicts,
                    snapshot.is_online
                );
            }
            batch = changes_rx.recv() => {
                match batch {
                    Ok(changes) => tracing::info!("Received {} remote change(s)", changes.len()),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} change batch(es)", skipped);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    probe_task.abort();
    let snapshot = context.status().snapshot().await;
    if snapshot.total > 0 {
        tracing::warn!("{} mutation(s) still queued at shutdown", snapshot.total);
    }

    Ok(())
}
