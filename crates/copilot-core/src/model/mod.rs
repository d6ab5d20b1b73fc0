//! Canonical data model (spec §3).
//!
//! Everything in this module is the *canonical* shape a [`Workflow`]
//! takes once Layer 1 of the Validation Gateway has parsed it
//! (spec §9: "Layer 1 is the sole boundary that converts untyped input
//! into the canonical form"). Every other layer, the Engine Client,
//! and the Smart Execution Router operate exclusively on these types —
//! none of them touch raw `serde_json::Value` workflow documents.

mod catalog;
mod connection;
mod node;
mod position;
mod workflow;

pub use catalog::{CredentialType, NodeType, PropertyDescriptor};
pub use connection::{Channel, Connection, ConnectionEndpoint};
pub use node::{CredentialReference, Node};
pub use position::Position;
pub use workflow::{ExecutionOrder, Workflow, WorkflowSettings};
