//! Layer 3 — Connection integrity (spec §4.4).
//!
//! Purely structural, no catalog or network access (spec §5: layers 0,
//! 1, 3 do no I/O). Operates on the Engine's name-keyed wire format
//! directly rather than [`Workflow::resolve_connections`]'s
//! arena-indexed form, since the path expressions this layer reports
//! (`connections.<src>.<channel>[<i>]`) are naturally phrased in terms
//! of names.

use copilot_core::error::{ErrorCode, Layer};
use copilot_core::model::Workflow;

use crate::result::{LayerOutcome, ValidationError, ValidationWarning};

pub fn run(workflow: &Workflow) -> LayerOutcome {
    let mut outcome = LayerOutcome::default();
    let node_names: std::collections::HashSet<&str> = workflow.nodes.iter().map(|node| node.name.as_str()).collect();

    for (source, by_channel) in &workflow.connections {
        if !node_names.contains(source.as_str()) {
            outcome.errors.push(
                ValidationError::new(Layer::Connections, ErrorCode::ConnectionSourceMissing, format!("connection source '{source}' is not a node in this workflow"))
                    .with_path(format!("connections.{source}")),
            );
            continue;
        }

        for (channel, outputs) in by_channel {
            for (output_index, endpoints) in outputs.iter().enumerate() {
                for endpoint in endpoints {
                    if !node_names.contains(endpoint.node.as_str()) {
                        outcome.errors.push(
                            ValidationError::new(
                                Layer::Connections,
                                ErrorCode::ConnectionTargetMissing,
                                format!("connection target '{}' is not a node in this workflow", endpoint.node),
                            )
                            .with_path(format!("connections.{source}.{}[{output_index}]", channel_path_segment(*channel))),
                        );
                    }
                }
            }
        }
    }

    let connected = workflow.connected_node_names();
    for node in &workflow.nodes {
        if connected.contains(node.name.as_str()) {
            continue;
        }
        if super::looks_trigger_like(&node.type_id) {
            continue;
        }
        outcome.warnings.push(
            ValidationWarning::new(Layer::Connections, ErrorCode::OrphanNode, format!("node '{}' is never referenced by any connection", node.name))
                .with_path(format!("nodes.{}", node.name)),
        );
    }

    outcome
}

fn channel_path_segment(channel: copilot_core::model::Channel) -> &'static str {
    match channel {
        copilot_core::model::Channel::Main => "main",
        copilot_core::model::Channel::AiTool => "ai_tool",
        copilot_core::model::Channel::AiAgent => "ai_agent",
        copilot_core::model::Channel::AiMemory => "ai_memory",
        copilot_core::model::Channel::AiOutputParser => "ai_output_parser",
        copilot_core::model::Channel::AiLanguageModel => "ai_language_model",
        copilot_core::model::Channel::AiDocument => "ai_document",
        copilot_core::model::Channel::AiEmbedding => "ai_embedding",
        copilot_core::model::Channel::AiRetriever => "ai_retriever",
        copilot_core::model::Channel::AiTextSplitter => "ai_text_splitter",
        copilot_core::model::Channel::AiVectorStore => "ai_vector_store",
    }
}
