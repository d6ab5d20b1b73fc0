//! Layer 1 — Workflow Schema & Structural Validator (spec §4.3, §4.4).
//!
//! Parses an arbitrary `serde_json::Value` into the canonical
//! [`Workflow`]. Structural problems are collected as a list of
//! `SCHEMA_ERROR`s rather than failing fast on the first one, so a
//! caller fixing a document sees every problem in one round trip.

use copilot_core::error::{ErrorCode, Layer};
use copilot_core::model::Workflow;

use crate::result::{LayerOutcome, ValidationError, ValidationWarning};

const ENUMERATED_CHANNELS: &[&str] = &[
    "main",
    "ai_tool",
    "ai_agent",
    "ai_memory",
    "ai_output_parser",
    "ai_language_model",
    "ai_document",
    "ai_embedding",
    "ai_retriever",
    "ai_text_splitter",
    "ai_vector_store",
];

const ENUMERATED_EXECUTION_ORDERS: &[&str] = &["v0", "v1"];

/// Runs the structural checks against raw input and, if none fire,
/// parses it into the canonical [`Workflow`] shape.
pub fn validate_and_parse(input: &serde_json::Value) -> Result<(Workflow, LayerOutcome), LayerOutcome> {
    let mut outcome = LayerOutcome::default();
    check_name(input, &mut outcome);
    let node_names = check_nodes(input, &mut outcome);
    check_connections(input, &node_names, &mut outcome);
    check_execution_order(input, &mut outcome);

    if !outcome.passed() {
        return Err(outcome);
    }

    match serde_json::from_value::<Workflow>(input.clone()) {
        Ok(workflow) => {
            structural_warnings(&workflow, &mut outcome);
            Ok((workflow, outcome))
        }
        Err(error) => {
            outcome.errors.push(ValidationError::new(Layer::Schema, ErrorCode::SchemaError, format!("document failed to parse: {error}")));
            Err(outcome)
        }
    }
}

fn check_name(input: &serde_json::Value, outcome: &mut LayerOutcome) {
    let name = input.get("name").and_then(serde_json::Value::as_str).unwrap_or("");
    if name.trim().is_empty() {
        outcome
            .errors
            .push(ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "workflow name is missing or empty").with_path("name"));
    }
}

/// Returns the set of node names seen, used by the connections check.
fn check_nodes(input: &serde_json::Value, outcome: &mut LayerOutcome) -> std::collections::HashSet<String> {
    let mut names = std::collections::HashSet::new();

    let Some(nodes) = input.get("nodes").and_then(serde_json::Value::as_array) else {
        outcome.errors.push(ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "nodes field is missing").with_path("nodes"));
        return names;
    };
    if nodes.is_empty() {
        outcome.errors.push(ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "node list is empty").with_path("nodes"));
        return names;
    }

    for (index, node) in nodes.iter().enumerate() {
        let path_prefix = format!("nodes[{index}]");
        let name = node.get("name").and_then(serde_json::Value::as_str);
        match name {
            Some(name) if !name.trim().is_empty() => {
                names.insert(name.to_string());
            }
            _ => outcome.errors.push(
                ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "node is missing a name").with_path(format!("{path_prefix}.name")),
            ),
        }

        if node.get("type").and_then(serde_json::Value::as_str).is_none_or(str::is_empty) {
            outcome.errors.push(
                ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "node is missing a type").with_path(format!("{path_prefix}.type")),
            );
        }

        if let Some(position) = node.get("position") {
            if !is_valid_position(position) {
                outcome.errors.push(
                    ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "position must be a [x, y] tuple or {x, y} object")
                        .with_path(format!("{path_prefix}.position")),
                );
            }
        }
    }

    names
}

fn is_valid_position(value: &serde_json::Value) -> bool {
    if let Some(array) = value.as_array() {
        return array.len() == 2 && array.iter().all(serde_json::Value::is_number);
    }
    if let Some(object) = value.as_object() {
        return object.get("x").is_some_and(serde_json::Value::is_number) && object.get("y").is_some_and(serde_json::Value::is_number);
    }
    false
}

fn check_connections(input: &serde_json::Value, node_names: &std::collections::HashSet<String>, outcome: &mut LayerOutcome) {
    let Some(connections) = input.get("connections").and_then(serde_json::Value::as_object) else {
        return;
    };

    for (source, by_channel) in connections {
        let Some(by_channel) = by_channel.as_object() else {
            outcome.errors.push(
                ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "connection channel map must be an object")
                    .with_path(format!("connections.{source}")),
            );
            continue;
        };

        for (channel, outputs) in by_channel {
            if !ENUMERATED_CHANNELS.contains(&channel.as_str()) {
                outcome.errors.push(
                    ValidationError::new(Layer::Schema, ErrorCode::SchemaError, format!("'{channel}' is not an enumerated connection channel"))
                        .with_path(format!("connections.{source}.{channel}")),
                );
                continue;
            }

            let Some(outputs) = outputs.as_array() else {
                outcome.errors.push(
                    ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "channel value must be a list of output lists")
                        .with_path(format!("connections.{source}.{channel}")),
                );
                continue;
            };

            for (output_index, endpoints) in outputs.iter().enumerate() {
                let Some(endpoints) = endpoints.as_array() else {
                    outcome.errors.push(
                        ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "each output must be a list of endpoints")
                            .with_path(format!("connections.{source}.{channel}[{output_index}]")),
                    );
                    continue;
                };
                for endpoint in endpoints {
                    if !is_valid_endpoint(endpoint) {
                        outcome.errors.push(
                            ValidationError::new(Layer::Schema, ErrorCode::SchemaError, "endpoint must be {node, type?, index?}")
                                .with_path(format!("connections.{source}.{channel}[{output_index}]")),
                        );
                    }
                }
            }

            let _ = node_names; // node-existence of endpoints is Layer 3's job, not Layer 1's.
        }
    }
}

fn is_valid_endpoint(value: &serde_json::Value) -> bool {
    let Some(object) = value.as_object() else { return false };
    let Some(node) = object.get("node").and_then(serde_json::Value::as_str) else { return false };
    if node.trim().is_empty() {
        return false;
    }
    if let Some(channel_type) = object.get("type") {
        if !channel_type.as_str().is_some_and(|c| ENUMERATED_CHANNELS.contains(&c)) {
            return false;
        }
    }
    true
}

fn check_execution_order(input: &serde_json::Value, outcome: &mut LayerOutcome) {
    let Some(order) = input.get("settings").and_then(|s| s.get("execution_order")).and_then(serde_json::Value::as_str) else {
        return;
    };
    if !ENUMERATED_EXECUTION_ORDERS.contains(&order) {
        outcome.errors.push(
            ValidationError::new(Layer::Schema, ErrorCode::SchemaError, format!("'{order}' is not an enumerated execution order"))
                .with_path("settings.execution_order"),
        );
    }
}

/// Non-blocking structural warnings (spec §4.3): no node looks like a
/// trigger, or the workflow has only one non-webhook node.
fn structural_warnings(workflow: &Workflow, outcome: &mut LayerOutcome) {
    let has_trigger = workflow.nodes.iter().any(|node| super::looks_trigger_like(&node.type_id));
    if !has_trigger {
        outcome.warnings.push(ValidationWarning::new(Layer::Schema, ErrorCode::SchemaError, "no node in this workflow looks like a trigger"));
    }

    let non_webhook_count = workflow.nodes.iter().filter(|node| !node.type_id.to_lowercase().contains("webhook")).count();
    if non_webhook_count <= 1 {
        outcome.warnings.push(ValidationWarning::new(Layer::Schema, ErrorCode::SchemaError, "workflow has only one non-webhook node"));
    }
}
