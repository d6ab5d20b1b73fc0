//! Catalog event fan-out.
//!
//! Spec §9 calls for "a narrow listener interface... no untyped
//! broadcast" but the teacher's own codebase favors `tokio::sync::broadcast`
//! for cross-task fan-out. `SPEC_FULL.md` §9 keeps both: [`CatalogListener`]
//! for callers that want typed, synchronous hooks wired in at
//! construction, and a [`tokio::sync::broadcast::Receiver`] for callers
//! that just want to `.subscribe()` from wherever they sit.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::snapshot::SyncSource;

/// A single catalog lifecycle event (spec §4.2: `synced`, `syncError`, `connected`, `disconnected`).
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    Synced { source: SyncSource, node_count: usize },
    SyncError { message: String },
    Connected,
    Disconnected,
}

/// Narrow listener interface attached at wire-up time (spec §9).
#[async_trait]
pub trait CatalogListener: Send + Sync {
    async fn on_catalog_synced(&self, source: SyncSource, node_count: usize) {
        let _ = (source, node_count);
    }
    async fn on_catalog_error(&self, message: &str) {
        let _ = message;
    }
    async fn on_connected(&self) {}
    async fn on_disconnected(&self) {}
}

/// Fans a [`CatalogEvent`] out to every attached [`CatalogListener`] and
/// to the broadcast channel.
pub struct EventHub {
    listeners: Vec<Arc<dyn CatalogListener>>,
    sender: broadcast::Sender<CatalogEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(64);
        Self { listeners: Vec::new(), sender }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn CatalogListener>) {
        self.listeners.push(listener);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    pub async fn emit(&self, event: CatalogEvent) {
        let _ = self.sender.send(event.clone());
        for listener in &self.listeners {
            match &event {
                CatalogEvent::Synced { source, node_count } => listener.on_catalog_synced(*source, *node_count).await,
                CatalogEvent::SyncError { message } => listener.on_catalog_error(message).await,
                CatalogEvent::Connected => listener.on_connected().await,
                CatalogEvent::Disconnected => listener.on_disconnected().await,
            }
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
