//! Layer 0 — Node Restriction Policy (spec §4.4).
//!
//! Runs directly against the raw input, before Layer 1 has parsed it
//! into a canonical [`copilot_core::model::Workflow`] — "grossly
//! disallowed inputs are rejected even on malformed documents;
//! structural problems are left to Layer 1." So this reads `nodes[].type`
//! out of the input `serde_json::Value` defensively, ignoring entries
//! that don't look like nodes at all rather than erroring on them.

use std::collections::BTreeSet;

use copilot_catalog::PolicyDecision;
use copilot_core::error::{ErrorCode, Layer};

use crate::result::{LayerOutcome, ValidationError};

pub fn run(input: &serde_json::Value, policy: &copilot_catalog::NodeRestrictionPolicy) -> LayerOutcome {
    let mut outcome = LayerOutcome::default();

    let Some(nodes) = input.get("nodes").and_then(serde_json::Value::as_array) else {
        return outcome;
    };

    // Evaluate each distinct (name, type) pair once; a type repeated
    // across nodes shouldn't produce duplicate rejection errors.
    let mut seen = BTreeSet::new();
    for (index, node) in nodes.iter().enumerate() {
        let Some(type_id) = node.get("type").and_then(serde_json::Value::as_str) else {
            continue;
        };
        let name = node.get("name").and_then(serde_json::Value::as_str).map(str::to_string).unwrap_or_else(|| format!("[{index}]"));

        if !seen.insert((name.clone(), type_id.to_string())) {
            continue;
        }

        if let PolicyDecision::Rejected { reason, suggestions } = policy.evaluate(type_id) {
            outcome.errors.push(
                ValidationError::new(Layer::NodeRestrictions, ErrorCode::NodeNotAllowed, reason)
                    .with_path(format!("nodes.{name}.type"))
                    .with_suggestions(suggestions),
            );
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::config::PolicyConfig;
    use copilot_catalog::NodeRestrictionPolicy;

    #[test]
    fn rejects_disallowed_community_node_with_suggestions() {
        let policy = NodeRestrictionPolicy::new(PolicyConfig::default());
        let input = serde_json::json!({
            "name": "wf",
            "nodes": [{"name": "a", "type": "community-pkg.fancy"}],
        });
        let outcome = run(&input, &policy);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].code, ErrorCode::NodeNotAllowed);
        assert!(!outcome.errors[0].suggestions.is_empty());
    }

    #[test]
    fn official_prefix_passes() {
        let policy = NodeRestrictionPolicy::new(PolicyConfig::default());
        let input = serde_json::json!({
            "name": "wf",
            "nodes": [{"name": "a", "type": "pkg-base.httpRequest"}],
        });
        assert!(run(&input, &policy).passed());
    }

    #[test]
    fn malformed_node_entries_are_ignored_not_errored() {
        let policy = NodeRestrictionPolicy::new(PolicyConfig::default());
        let input = serde_json::json!({ "name": "wf", "nodes": ["not-an-object", 5] });
        assert!(run(&input, &policy).passed());
    }
}
