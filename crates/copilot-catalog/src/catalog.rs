use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use copilot_core::config::Config;
use copilot_core::deadline::Deadline;
use copilot_core::error::CoreResult;
use copilot_core::model::{CredentialType, NodeType};
use copilot_engine::{EngineClient, ListFilters};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::events::{CatalogEvent, CatalogListener, EventHub};
use crate::policy::NodeRestrictionPolicy;
use crate::snapshot::{CatalogSnapshot, CatalogStatistics, SyncSource};

const WORKFLOW_SCAN_PAGE_SIZE: u32 = 100;

/// Maintains the authoritative, in-memory node/credential type snapshot (spec §4.2).
pub struct NodeCatalog {
    engine: Arc<EngineClient>,
    policy: NodeRestrictionPolicy,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
    events: EventHub,
    fetch_deadline: Duration,
    session_username: Option<String>,
    session_password: Option<String>,
}

impl NodeCatalog {
    pub fn new(engine: Arc<EngineClient>, config: &Config) -> Self {
        let (session_username, session_password) = match &config.session_credentials {
            Some(credentials) => (Some(credentials.username.clone()), Some(credentials.password.clone())),
            None => (None, None),
        };
        Self {
            engine,
            policy: NodeRestrictionPolicy::new(config.policy.clone()),
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::default())),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            events: EventHub::new(),
            fetch_deadline: config.catalog_fetch_deadline,
            session_username,
            session_password,
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn CatalogListener>) {
        self.events.add_listener(listener);
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// A non-blocking read of the current snapshot.
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Refresh the catalog, coalescing overlapping calls (spec §4.2,
    /// "only one refresh runs at a time; overlapping ticks are coalesced").
    pub async fn refresh(&self) -> CoreResult<()> {
        let generation_before = self.generation.load(Ordering::SeqCst);
        let _guard = self.refresh_lock.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation_before {
            return Ok(());
        }

        let deadline = Deadline::after(self.fetch_deadline);
        match self.acquire_node_types(deadline).await {
            Ok((node_types, source)) => {
                let credential_types = self.fetch_credential_types(deadline).await.unwrap_or_default();
                let node_types = self.apply_policy(node_types);
                let snapshot = CatalogSnapshot {
                    node_types,
                    credential_types,
                    last_sync: Some(chrono::Utc::now()),
                    sync_source: source,
                    engine_version: None,
                };
                let node_count = snapshot.node_types.len();
                *self.snapshot.write().await = Arc::new(snapshot);
                self.generation.fetch_add(1, Ordering::SeqCst);
                info!(source = source.as_str(), node_count, "catalog refreshed");
                self.events.emit(CatalogEvent::Synced { source, node_count }).await;
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "catalog refresh failed, retaining previous snapshot");
                self.events.emit(CatalogEvent::SyncError { message: error.to_string() }).await;
                Err(error)
            }
        }
    }

    fn apply_policy(&self, candidates: HashMap<String, NodeType>) -> HashMap<String, NodeType> {
        candidates
            .into_iter()
            .filter(|(identifier, _)| self.policy.evaluate(identifier).is_allowed())
            .collect()
    }

    /// Acquisition ladder (spec §4.2): stop at the first source that
    /// returns a non-empty list.
    async fn acquire_node_types(&self, deadline: Deadline) -> CoreResult<(HashMap<String, NodeType>, SyncSource)> {
        if let (Some(username), Some(password)) = (&self.session_username, &self.session_password) {
            if self.engine.authenticate_session(username, password, deadline).await.is_ok() {
                if let Ok(value) = self.engine.fetch_node_types_session(deadline).await {
                    let parsed = parse_node_types(&value);
                    if !parsed.is_empty() {
                        return Ok((parsed, SyncSource::SessionIntrospection));
                    }
                }
            }
        }

        if let Ok(value) = self.engine.fetch_node_types_api_key(deadline).await {
            let parsed = parse_node_types(&value);
            if !parsed.is_empty() {
                return Ok((parsed, SyncSource::ApiKeyIntrospection));
            }
        }

        if let Ok(value) = self.engine.fetch_node_types_alternate(deadline).await {
            let parsed = parse_node_types(&value);
            if !parsed.is_empty() {
                return Ok((parsed, SyncSource::ApiKeyAlternate));
            }
        }

        let scanned = self.scan_workflows_for_node_types(deadline).await?;
        Ok((scanned, SyncSource::WorkflowScan))
    }

    async fn fetch_credential_types(&self, deadline: Deadline) -> Option<HashMap<String, CredentialType>> {
        match self.engine.fetch_credential_types(deadline).await {
            Ok(value) => Some(parse_credential_types(&value)),
            Err(error) => {
                warn!(error = %error, "credential type fetch failed; credential checks degrade to soft warnings");
                None
            }
        }
    }

    /// Workflow scan fallback (spec §4.2, step 4): paginate every
    /// stored workflow, fetch each in full, and synthesize minimal
    /// catalog entries from the distinct `(type, typeVersion)` pairs seen.
    async fn scan_workflows_for_node_types(&self, deadline: Deadline) -> CoreResult<HashMap<String, NodeType>> {
        let mut seen: HashMap<String, u32> = HashMap::new();
        let mut cursor = None;

        loop {
            let filters = ListFilters { limit: Some(WORKFLOW_SCAN_PAGE_SIZE), cursor: cursor.clone(), ..Default::default() };
            let page = self.engine.list_workflows(filters, deadline).await?;

            for summary in &page.items {
                let Some(id) = &summary.id else { continue };
                let Ok(workflow) = self.engine.get_workflow(id, deadline).await else { continue };
                for node in &workflow.nodes {
                    seen.entry(node.type_id.clone()).or_insert(node.type_version);
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
            if deadline.is_expired() {
                break;
            }
        }

        Ok(seen.into_iter().map(|(identifier, version)| (identifier.clone(), NodeType::synthesized(identifier, version))).collect())
    }

    // --- Query API (spec §4.2) ---

    pub async fn get(&self, identifier: &str) -> Option<NodeType> {
        self.snapshot().await.node_types.get(identifier).cloned()
    }

    pub async fn credential_type(&self, identifier: &str) -> Option<CredentialType> {
        self.snapshot().await.credential_types.get(identifier).cloned()
    }

    /// Case-insensitive substring search over identifier/display/description,
    /// ordered by match position then display name.
    pub async fn search(&self, query: &str) -> Vec<NodeType> {
        let needle = query.to_lowercase();
        let snapshot = self.snapshot().await;
        let mut matches: Vec<(usize, NodeType)> = snapshot
            .node_types
            .values()
            .filter_map(|node_type| {
                let haystacks = [&node_type.identifier, &node_type.display_name, &node_type.description];
                haystacks
                    .iter()
                    .filter_map(|haystack| haystack.to_lowercase().find(&needle))
                    .min()
                    .map(|position| (position, node_type.clone()))
            })
            .collect();

        matches.sort_by(|(pos_a, node_a), (pos_b, node_b)| pos_a.cmp(pos_b).then_with(|| node_a.display_name.cmp(&node_b.display_name)));
        matches.into_iter().map(|(_, node_type)| node_type).collect()
    }

    /// Up to `limit` suggestions for a missing type identifier, searched
    /// by its last dotted segment (spec §4.4, Layer 2).
    pub async fn suggest(&self, missing_identifier: &str, limit: usize) -> Vec<String> {
        let suffix = missing_identifier.rsplit('.').next().unwrap_or(missing_identifier);
        self.search(suffix).await.into_iter().take(limit).map(|node_type| node_type.identifier).collect()
    }

    pub async fn triggers(&self) -> Vec<NodeType> {
        self.snapshot().await.node_types.values().filter(|nt| nt.is_trigger_like()).cloned().collect()
    }

    pub async fn ai_capable(&self) -> Vec<NodeType> {
        self.snapshot().await.node_types.values().filter(|nt| nt.is_ai_capable()).cloned().collect()
    }

    pub async fn statistics(&self) -> CatalogStatistics {
        self.snapshot().await.statistics()
    }
}

/// Best-effort parse of a node-type introspection response into the
/// canonical catalog shape. The Engine's introspection endpoints are
/// version-specific (spec §4.2); this accepts either a bare array or
/// an object carrying the array under a `nodeTypes`/`data` key.
fn parse_node_types(value: &serde_json::Value) -> HashMap<String, NodeType> {
    let array = extract_array(value, &["nodeTypes", "data", "types"]);
    array
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<NodeType>(entry).ok())
        .map(|node_type| (node_type.identifier.clone(), node_type))
        .collect()
}

fn parse_credential_types(value: &serde_json::Value) -> HashMap<String, CredentialType> {
    let array = extract_array(value, &["credentialTypes", "data", "types"]);
    array
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<CredentialType>(entry).ok())
        .map(|credential_type| (credential_type.identifier.clone(), credential_type))
        .collect()
}

fn extract_array(value: &serde_json::Value, keys: &[&str]) -> Vec<serde_json::Value> {
    if let serde_json::Value::Array(items) = value {
        return items.clone();
    }
    for key in keys {
        if let Some(serde_json::Value::Array(items)) = value.get(key) {
            return items.clone();
        }
    }
    Vec::new()
}
