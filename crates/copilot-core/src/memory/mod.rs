//! Shared Memory (spec §4.5).
//!
//! A process-local, owner-tagged key/value store used for the
//! validation cache, routing telemetry, and any other inter-component
//! hand-off that doesn't warrant its own channel. Expiration is lazy —
//! entries past their TTL are simply excluded from reads and swept out
//! opportunistically — rather than driven by a background reaper task,
//! matching the single-tier simplification called for in
//! `SPEC_FULL.md` §9 relative to the teacher's multi-tier cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// A Shared Memory entry (spec §3, "Shared-memory entry").
#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    owner: String,
    created_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Filter for [`SharedMemory::query`].
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Prefix-with-wildcard pattern; a trailing `%` matches any key suffix.
    pub pattern: Option<String>,
    pub owner: Option<String>,
    pub max_age: Option<Duration>,
    pub limit: Option<usize>,
}

fn matches_pattern(key: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('%') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

/// A single matched entry returned by [`SharedMemory::query`].
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub key: String,
    pub value: serde_json::Value,
    pub owner: String,
    pub age: Duration,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
}

/// The Shared Memory store (spec §4.5). Cheap to clone — internally `Arc`-wrapped.
#[derive(Debug, Clone)]
pub struct SharedMemory {
    inner: Arc<RwLock<Inner>>,
}

impl Default for SharedMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedMemory {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(Inner::default())) }
    }

    /// Insert or overwrite an entry, regardless of who wrote the prior one.
    ///
    /// Spec §4.5 only requires `delete` to enforce owner matching;
    /// `set` is unconditional so a component can refresh its own cached
    /// values without first reading them back.
    pub async fn set(&self, key: impl Into<String>, value: serde_json::Value, owner: impl Into<String>, ttl: Duration) {
        let mut inner = self.inner.write().await;
        inner.entries.insert(
            key.into(),
            Entry { value, owner: owner.into(), created_at: Instant::now(), ttl },
        );
    }

    /// Read a live (non-expired) entry's value.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let inner = self.inner.read().await;
        inner.entries.get(key).filter(|entry| !entry.is_expired()).map(|entry| entry.value.clone())
    }

    /// Delete an entry, but only if `owner` matches the entry's owner tag.
    /// Returns `true` if an entry was removed.
    pub async fn delete(&self, key: &str, owner: &str) -> bool {
        let mut inner = self.inner.write().await;
        if inner.entries.get(key).is_some_and(|entry| entry.owner == owner) {
            inner.entries.remove(key);
            true
        } else {
            false
        }
    }

    /// Query entries by prefix-with-wildcard pattern, owner, and age,
    /// excluding expired entries.
    pub async fn query(&self, filter: QueryFilter) -> Vec<QueryHit> {
        let inner = self.inner.read().await;
        let mut hits: Vec<QueryHit> = inner
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .filter(|(key, _)| filter.pattern.as_deref().is_none_or(|pattern| matches_pattern(key, pattern)))
            .filter(|(_, entry)| filter.owner.as_deref().is_none_or(|owner| entry.owner == owner))
            .filter(|(_, entry)| filter.max_age.is_none_or(|max_age| entry.created_at.elapsed() <= max_age))
            .map(|(key, entry)| QueryHit {
                key: key.clone(),
                value: entry.value.clone(),
                owner: entry.owner.clone(),
                age: entry.created_at.elapsed(),
            })
            .collect();

        hits.sort_by(|a, b| a.key.cmp(&b.key));
        if let Some(limit) = filter.limit {
            hits.truncate(limit);
        }
        hits
    }

    /// Drop every expired entry. Called opportunistically by long-lived
    /// owners (catalog refresh tick, router telemetry sweep) rather
    /// than on a dedicated background task.
    pub async fn reap_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());
        before - inner.entries.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let memory = SharedMemory::new();
        memory.set("validation-cache:abc", json!({"valid": true}), "gateway", Duration::from_secs(60)).await;
        assert_eq!(memory.get("validation-cache:abc").await, Some(json!({"valid": true})));
    }

    #[tokio::test]
    async fn expired_entries_are_excluded_from_get() {
        let memory = SharedMemory::new();
        memory.set("k", json!(1), "owner", Duration::from_millis(1)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(memory.get("k").await, None);
    }

    #[tokio::test]
    async fn delete_requires_matching_owner() {
        let memory = SharedMemory::new();
        memory.set("k", json!(1), "owner-a", Duration::from_secs(60)).await;
        assert!(!memory.delete("k", "owner-b").await);
        assert!(memory.delete("k", "owner-a").await);
        assert_eq!(memory.get("k").await, None);
    }

    #[tokio::test]
    async fn query_matches_prefix_wildcard_and_owner() {
        let memory = SharedMemory::new();
        memory.set("execution-metrics:1", json!(1), "router", Duration::from_secs(60)).await;
        memory.set("execution-metrics:2", json!(2), "router", Duration::from_secs(60)).await;
        memory.set("validation-cache:x", json!(3), "gateway", Duration::from_secs(60)).await;

        let hits = memory
            .query(QueryFilter { pattern: Some("execution-metrics:%".into()), ..Default::default() })
            .await;
        assert_eq!(hits.len(), 2);

        let hits = memory.query(QueryFilter { owner: Some("gateway".into()), ..Default::default() }).await;
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn reap_expired_removes_only_stale_entries() {
        let memory = SharedMemory::new();
        memory.set("stale", json!(1), "owner", Duration::from_millis(1)).await;
        memory.set("fresh", json!(2), "owner", Duration::from_secs(60)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let reaped = memory.reap_expired().await;
        assert_eq!(reaped, 1);
        assert_eq!(memory.len().await, 1);
    }
}
