use std::collections::HashMap;

use chrono::{DateTime, Utc};
use copilot_core::model::{CredentialType, NodeType};

/// Which source in the acquisition ladder produced the last successful refresh (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncSource {
    SessionIntrospection,
    ApiKeyIntrospection,
    ApiKeyAlternate,
    WorkflowScan,
    None,
}

impl SyncSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncSource::SessionIntrospection => "sessionIntrospection",
            SyncSource::ApiKeyIntrospection => "apiKeyIntrospection",
            SyncSource::ApiKeyAlternate => "apiKeyAlternate",
            SyncSource::WorkflowScan => "workflowScan",
            SyncSource::None => "none",
        }
    }
}

/// An immutable, fully-populated catalog snapshot (spec §4.2, "atomic refresh").
///
/// Readers hold an `Arc<CatalogSnapshot>` clone; a refresh builds a new
/// one and swaps the `Arc` under the write lock, so a reader never
/// observes a partially-populated map.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub node_types: HashMap<String, NodeType>,
    pub credential_types: HashMap<String, CredentialType>,
    pub last_sync: Option<DateTime<Utc>>,
    pub sync_source: SyncSource,
    pub engine_version: Option<String>,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self {
            node_types: HashMap::new(),
            credential_types: HashMap::new(),
            last_sync: None,
            sync_source: SyncSource::None,
            engine_version: None,
        }
    }
}

impl CatalogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.node_types.is_empty()
    }
}

/// Aggregate statistics over the current snapshot (spec §4.2).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatistics {
    pub total_nodes: usize,
    pub total_credential_types: usize,
    pub trigger_count: usize,
    pub action_count: usize,
    pub ai_node_count: usize,
    pub last_sync: Option<DateTime<Utc>>,
    pub engine_version: Option<String>,
    pub sync_source: SyncSource,
}

impl CatalogSnapshot {
    pub fn statistics(&self) -> CatalogStatistics {
        let trigger_count = self.node_types.values().filter(|nt| nt.is_trigger_like()).count();
        let ai_node_count = self.node_types.values().filter(|nt| nt.is_ai_capable()).count();
        CatalogStatistics {
            total_nodes: self.node_types.len(),
            total_credential_types: self.credential_types.len(),
            trigger_count,
            action_count: self.node_types.len() - trigger_count,
            ai_node_count,
            last_sync: self.last_sync,
            engine_version: self.engine_version.clone(),
            sync_source: self.sync_source,
        }
    }
}
