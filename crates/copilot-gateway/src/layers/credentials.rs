//! Layer 4 — Credentials (spec §4.4).

use copilot_catalog::NodeCatalog;
use copilot_core::error::{ErrorCode, Layer};
use copilot_core::model::Workflow;

use crate::result::{LayerOutcome, ValidationError, ValidationWarning};

pub async fn run(workflow: &Workflow, catalog: &NodeCatalog) -> LayerOutcome {
    let mut outcome = LayerOutcome::default();

    for node in &workflow.nodes {
        let Some(node_type) = catalog.get(&node.type_id).await else {
            // Node existence is Layer 2's concern; an unknown type here
            // just means there's nothing to check credentials against.
            continue;
        };

        for required_slot in &node_type.required_credentials {
            let filled = node.credentials.get(required_slot).is_some_and(|reference| !reference.id.trim().is_empty());
            if !filled {
                outcome.errors.push(
                    ValidationError::new(Layer::Credentials, ErrorCode::CredentialMissing, format!("required credential slot '{required_slot}' is not filled"))
                        .with_path(format!("nodes.{}.credentials.{required_slot}", node.name)),
                );
            }
        }

        for slot in node.credentials.keys() {
            if catalog.credential_type(slot).await.is_none() {
                outcome.warnings.push(
                    ValidationWarning::new(Layer::Credentials, ErrorCode::CredentialTypeUnknown, format!("credential slot '{slot}' does not match any known credential type"))
                        .with_path(format!("nodes.{}.credentials.{slot}", node.name)),
                );
            }
        }
    }

    outcome
}
