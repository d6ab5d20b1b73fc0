use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::catalog::NodeCatalog;

/// Spawns the periodic refresh task (spec §4.2, default interval 5 minutes).
///
/// Mirrors the teacher's rate-limiter cleanup task: a dedicated
/// `tokio::spawn`'d loop ticking a `tokio::time::interval`, holding
/// only an `Arc` clone of the catalog so the handle can be dropped
/// (and the task aborted) independently of catalog ownership.
pub fn spawn_refresh_scheduler(catalog: Arc<NodeCatalog>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately; the initial refresh runs at startup instead
        loop {
            ticker.tick().await;
            if let Err(error) = catalog.refresh().await {
                warn!(error = %error, "scheduled catalog refresh failed");
            }
        }
    })
}
