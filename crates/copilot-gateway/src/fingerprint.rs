//! Deterministic validation-cache fingerprint (spec §4.4 "Caching").

use copilot_core::model::Workflow;
use sha2::{Digest, Sha256};

/// Hashes a profile label plus a stable reduction of the workflow: the
/// sequence of `(nodeName, nodeType)` pairs in document order, the
/// connection count, and the node count. Deliberately excludes
/// parameters, credentials, and positions — none of those affect which
/// layers 0..5 pass, so including them would fragment the cache for no
/// benefit.
pub fn compute(workflow: &Workflow, profile: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(profile.as_bytes());
    hasher.update([0u8]);

    for node in &workflow.nodes {
        hasher.update(node.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(node.type_id.as_bytes());
        hasher.update([0u8]);
    }

    let connection_count: usize = workflow
        .connections
        .values()
        .flat_map(|by_channel| by_channel.values())
        .flat_map(|outputs| outputs.iter())
        .map(|endpoints| endpoints.len())
        .sum();

    hasher.update(connection_count.to_le_bytes());
    hasher.update(workflow.nodes.len().to_le_bytes());

    format!("{:x}", hasher.finalize())
}

/// A short label distinguishing gateway configurations that would
/// otherwise produce the same fingerprint for the same document but a
/// different layer outcome (strict mode changes whether warnings fail
/// admission; semantic/dry-run flags change which layers even run).
pub fn profile_label(strict_mode: bool, semantic_check_enabled: bool) -> String {
    format!("strict={strict_mode};semantic={semantic_check_enabled}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::model::{Node, Position};
    use std::collections::HashMap;

    fn node(name: &str, type_id: &str) -> Node {
        Node {
            id: None,
            name: name.to_string(),
            type_id: type_id.to_string(),
            type_version: 1,
            position: Position::new(0.0, 0.0),
            parameters: serde_json::Map::new(),
            credentials: HashMap::new(),
            disabled: false,
            continue_on_fail: false,
            execute_once: false,
            retry_on_fail: false,
        }
    }

    fn workflow(nodes: Vec<Node>) -> Workflow {
        Workflow {
            id: None,
            name: "wf".into(),
            nodes,
            connections: HashMap::new(),
            settings: None,
            tags: vec![],
            static_data: None,
            pinned_data: None,
            active: false,
        }
    }

    #[test]
    fn identical_documents_fingerprint_identically() {
        let a = workflow(vec![node("a", "pkg-base.start")]);
        let b = workflow(vec![node("a", "pkg-base.start")]);
        assert_eq!(compute(&a, "p"), compute(&b, "p"));
    }

    #[test]
    fn different_profile_changes_fingerprint() {
        let wf = workflow(vec![node("a", "pkg-base.start")]);
        assert_ne!(compute(&wf, "strict=true"), compute(&wf, "strict=false"));
    }

    #[test]
    fn node_name_or_type_change_changes_fingerprint() {
        let a = workflow(vec![node("a", "pkg-base.start")]);
        let b = workflow(vec![node("a", "pkg-base.noOp")]);
        assert_ne!(compute(&a, "p"), compute(&b, "p"));
    }

    #[test]
    fn parameter_changes_do_not_affect_fingerprint() {
        let mut a = workflow(vec![node("a", "pkg-base.start")]);
        a.nodes[0].parameters.insert("x".into(), serde_json::json!(1));
        let b = workflow(vec![node("a", "pkg-base.start")]);
        assert_eq!(compute(&a, "p"), compute(&b, "p"));
    }
}
