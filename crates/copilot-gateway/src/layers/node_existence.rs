//! Layer 2 — Node existence (spec §4.4).

use copilot_catalog::NodeCatalog;
use copilot_core::error::{ErrorCode, Layer};
use copilot_core::model::Workflow;

use crate::result::{LayerOutcome, ValidationError, ValidationWarning};

const MAX_SUGGESTIONS: usize = 3;

pub async fn run(workflow: &Workflow, catalog: &NodeCatalog) -> LayerOutcome {
    let mut outcome = LayerOutcome::default();

    if catalog.snapshot().await.is_empty() {
        outcome.warnings.push(ValidationWarning::new(Layer::NodeExistence, ErrorCode::CatalogNotReady, "node catalog has no snapshot yet; skipping node-existence checks"));
        return outcome;
    }

    for node in &workflow.nodes {
        if super::SENTINEL_NODE_TYPES.contains(&node.type_id.as_str()) {
            continue;
        }
        if catalog.get(&node.type_id).await.is_some() {
            continue;
        }

        let suggestions = catalog.suggest(&node.type_id, MAX_SUGGESTIONS).await;
        outcome.errors.push(
            ValidationError::new(Layer::NodeExistence, ErrorCode::NodeNotFound, format!("node type '{}' is not in the catalog", node.type_id))
                .with_path(format!("nodes.{}", node.name))
                .with_suggestions(suggestions),
        );
    }

    outcome
}
