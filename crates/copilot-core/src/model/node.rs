use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::position::Position;

/// A reference to a configured credential, stored under a credential-slot name on a [`Node`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialReference {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A single node in a [`super::Workflow`] (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier, assigned by the Engine on creation.
    #[serde(default)]
    pub id: Option<String>,

    /// Human name, unique within the owning workflow.
    pub name: String,

    /// Catalog type identifier, e.g. `pkg-base.httpRequest`.
    #[serde(rename = "type")]
    pub type_id: String,

    pub type_version: u32,

    pub position: Position,

    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,

    /// Credential-slot name -> reference.
    #[serde(default)]
    pub credentials: HashMap<String, CredentialReference>,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub continue_on_fail: bool,

    #[serde(default)]
    pub execute_once: bool,

    #[serde(default)]
    pub retry_on_fail: bool,
}

impl Node {
    /// The last dotted segment of the type identifier, used by Layer 2's
    /// suggestion search (spec §4.4).
    pub fn type_suffix(&self) -> &str {
        self.type_id.rsplit('.').next().unwrap_or(&self.type_id)
    }
}
