use serde::{Deserialize, Serialize};

use super::connection::Channel;

/// A single configurable property on a node or credential type (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub display_condition: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Vec<serde_json::Value>,
}

/// A node type catalog entry (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    pub identifier: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub versions: Vec<u32>,
    #[serde(default)]
    pub default_parameters: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub input_channels: Vec<Channel>,
    #[serde(default)]
    pub output_channels: Vec<Channel>,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub required_credentials: Vec<String>,
    #[serde(default)]
    pub group_tags: Vec<String>,
    /// Categorization metadata used by the AI-capable heuristic (§4.2, spec §3.1).
    #[serde(default)]
    pub codex_categories: Vec<String>,
}

impl NodeType {
    pub fn is_trigger_like(&self) -> bool {
        self.group_tags.iter().any(|tag| tag == "trigger")
            || self.identifier.to_lowercase().contains("trigger")
            || self.identifier.to_lowercase().contains("webhook")
    }

    pub fn is_ai_capable(&self) -> bool {
        self.group_tags.iter().any(|tag| tag == "ai")
            || self.codex_categories.iter().any(|category| category.eq_ignore_ascii_case("ai"))
            || self.identifier.to_lowercase().contains("langchain")
    }

    /// Minimal synthesized entry produced by the workflow-scan fallback (spec §4.2).
    pub fn synthesized(identifier: impl Into<String>, type_version: u32) -> Self {
        let identifier = identifier.into();
        Self {
            display_name: identifier.clone(),
            description: String::new(),
            versions: vec![type_version],
            default_parameters: serde_json::Map::new(),
            input_channels: vec![Channel::Main],
            output_channels: vec![Channel::Main],
            properties: Vec::new(),
            required_credentials: Vec::new(),
            group_tags: Vec::new(),
            codex_categories: Vec::new(),
            identifier,
        }
    }
}

/// A credential type catalog entry (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialType {
    pub identifier: String,
    pub display_name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    #[serde(default)]
    pub auth_scheme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_type(identifier: &str) -> NodeType {
        NodeType::synthesized(identifier, 1)
    }

    #[test]
    fn trigger_heuristic_matches_group_tag_or_name() {
        let webhook = node_type("pkg-base.webhook");
        assert!(webhook.is_trigger_like());

        let mut tagged = node_type("pkg-base.customStart");
        tagged.group_tags.push("trigger".into());
        assert!(tagged.is_trigger_like());

        assert!(!node_type("pkg-base.httpRequest").is_trigger_like());
    }

    #[test]
    fn ai_capable_heuristic_matches_langchain_identifiers() {
        assert!(node_type("@org/langchain.agent").is_ai_capable());

        let mut categorized = node_type("pkg-base.custom");
        categorized.codex_categories.push("AI".into());
        assert!(categorized.is_ai_capable());

        assert!(!node_type("pkg-base.httpRequest").is_ai_capable());
    }
}
