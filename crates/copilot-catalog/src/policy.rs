//! Node Restriction policy filter (spec §4.2).

use copilot_core::config::PolicyConfig;

/// Default "official" identifier prefixes admitted regardless of the
/// community-allowed flag or allow-list (spec §4.2).
const OFFICIAL_PREFIXES: &[&str] = &["pkg-base.", "@org/langchain.", "pkg-langchain."];

/// Static mapping from a blocked community-package prefix to the
/// official alternatives suggested in a rejection (spec §4.2).
const BLOCKED_ALTERNATIVES: &[(&str, &[&str])] = &[
    ("community-pkg.fancy", &["pkg-base.httpRequest", "pkg-base.function"]),
    ("community-pkg.", &["pkg-base.httpRequest", "pkg-base.function", "pkg-base.code"]),
];

/// Outcome of checking a single node type identifier against policy.
#[derive(Debug, Clone)]
pub enum PolicyDecision {
    Allowed,
    Rejected { reason: String, suggestions: Vec<String> },
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyDecision::Allowed)
    }
}

/// Evaluates whether a node type identifier may be admitted into the catalog
/// or pass Layer 0 of the Validation Gateway.
pub struct NodeRestrictionPolicy {
    config: PolicyConfig,
}

impl NodeRestrictionPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, identifier: &str) -> PolicyDecision {
        if OFFICIAL_PREFIXES.iter().any(|prefix| identifier.starts_with(prefix)) {
            return PolicyDecision::Allowed;
        }
        if self.config.community_nodes_allowed {
            return PolicyDecision::Allowed;
        }
        if self.config.community_allow_list.contains(identifier) {
            return PolicyDecision::Allowed;
        }

        let suggestions = BLOCKED_ALTERNATIVES
            .iter()
            .find(|(prefix, _)| identifier.starts_with(*prefix))
            .map(|(_, suggestions)| suggestions.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        PolicyDecision::Rejected {
            reason: format!("node type '{identifier}' is not an official node and is not allow-listed"),
            suggestions,
        }
    }
}
