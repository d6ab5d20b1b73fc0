use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::connection::{Channel, ConnectionEndpoint};
use super::node::Node;

/// Workflow-level execution ordering policy (spec §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOrder {
    V0,
    V1,
}

/// Optional workflow-level settings (spec §3.1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSettings {
    #[serde(default)]
    pub execution_order: Option<ExecutionOrder>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub error_workflow_id: Option<String>,
    #[serde(default)]
    pub execution_timeout_seconds: Option<u64>,
}

/// The canonical Workflow shape every layer past Layer 1 operates on (spec §3).
///
/// `connections` keeps the Engine's own wire shape — a map from source
/// node name to channel to output-index to a list of endpoints — since
/// that's what `updateWorkflow`/`createWorkflow` must send back. The
/// arena-indexed [`super::Connection`] form used internally by graph
/// traversal (orphan detection, dry-run cloning) is derived on demand
/// via [`Workflow::resolve_connections`] rather than stored
/// redundantly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,

    pub nodes: Vec<Node>,

    #[serde(default)]
    pub connections: HashMap<String, HashMap<Channel, Vec<Vec<ConnectionEndpoint>>>>,

    #[serde(default)]
    pub settings: Option<WorkflowSettings>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub static_data: Option<serde_json::Value>,

    #[serde(default)]
    pub pinned_data: Option<serde_json::Value>,

    #[serde(default)]
    pub active: bool,
}

impl Workflow {
    /// Name -> arena index, built once per canonicalization pass.
    pub fn node_index(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.name.as_str(), idx))
            .collect()
    }

    /// Resolve the name-keyed wire connections into the arena-indexed
    /// form, skipping endpoints whose node name isn't present in this
    /// workflow (Layer 3 reports those as errors; this method just
    /// omits them rather than panicking, so it's safe to call on
    /// not-yet-validated documents).
    pub fn resolve_connections(&self) -> Vec<super::connection::Connection> {
        use super::connection::{ChannelKey, Connection};

        let index = self.node_index();
        let mut resolved = Vec::new();

        for (src_name, by_channel) in &self.connections {
            let Some(&src_idx) = index.get(src_name.as_str()) else {
                continue;
            };
            for (channel, outputs) in by_channel {
                for (out_idx, endpoints) in outputs.iter().enumerate() {
                    for endpoint in endpoints {
                        let Some(&dst_idx) = index.get(endpoint.node.as_str()) else {
                            continue;
                        };
                        resolved.push(Connection {
                            src_idx,
                            src_channel_index: ChannelKey { channel: (*channel).into(), index: out_idx as u32 },
                            dst_idx,
                            dst_channel: ChannelKey { channel: endpoint.channel.into(), index: endpoint.index },
                            dst_index: endpoint.index,
                        });
                    }
                }
            }
        }

        resolved
    }

    /// Every node name referenced as either side of any connection.
    pub fn connected_node_names(&self) -> std::collections::HashSet<&str> {
        let mut names = std::collections::HashSet::new();
        for (src_name, by_channel) in &self.connections {
            names.insert(src_name.as_str());
            for outputs in by_channel.values() {
                for endpoints in outputs {
                    for endpoint in endpoints {
                        names.insert(endpoint.node.as_str());
                    }
                }
            }
        }
        names
    }
}
