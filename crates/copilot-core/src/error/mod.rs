//! # Error Handling for the Workflow Copilot Control Plane
//!
//! All fallible operations in the control plane resolve to a variant
//! of [`CoreError`]. The taxonomy is closed (spec §7): validation
//! error kinds map one-to-one onto Validation Gateway layer failures,
//! transport error kinds map onto Engine Client failures, and a small
//! set of core-internal kinds cover deadlines, catalog unavailability,
//! and policy violations that don't originate in a single layer.
//!
//! ## Error Conversion
//!
//! [`CoreError`] implements [`From`] for the external error types the
//! rest of the workspace reaches for most often:
//!
//! - `reqwest::Error` → [`CoreError::Network`] or [`CoreError::ServerError`]
//! - `serde_json::Error` → [`CoreError::SchemaError`]

use std::fmt;

mod types;

pub use types::{CoreError, ErrorKind, RecoverySteps};

/// Convenience alias used throughout the workspace.
pub type CoreResult<T> = Result<T, CoreError>;

/// Stable machine code attached to every validation error (spec §4.4).
///
/// Rendered as its `Display` form (e.g. `NODE_NOT_FOUND`) when errors
/// cross a serialization boundary, so the enum is kept small and
/// additions require updating both spec and glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorCode {
    NodeNotAllowed,
    SchemaError,
    NodeNotFound,
    ConnectionSourceMissing,
    ConnectionTargetMissing,
    CredentialMissing,
    SemanticIssue,
    N8nRejected,
    DryRunError,
    ValidationException,
    CleanupFailed,

    /// Warning-only: the catalog has no snapshot yet (spec §4.4, Layer 2).
    CatalogNotReady,
    /// Warning-only: a node is never referenced by any connection (spec §4.4, Layer 3).
    OrphanNode,
    /// Warning-only: a node references a credential slot the catalog doesn't recognize (spec §4.4, Layer 4).
    CredentialTypeUnknown,
    /// Warning-only: Layer 5 ran with no Semantic Advisor attached or enabled (spec §4.7).
    SemanticSkipped,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NodeNotAllowed => "NODE_NOT_ALLOWED",
            ErrorCode::SchemaError => "SCHEMA_ERROR",
            ErrorCode::NodeNotFound => "NODE_NOT_FOUND",
            ErrorCode::ConnectionSourceMissing => "CONNECTION_SOURCE_MISSING",
            ErrorCode::ConnectionTargetMissing => "CONNECTION_TARGET_MISSING",
            ErrorCode::CredentialMissing => "CREDENTIAL_MISSING",
            ErrorCode::SemanticIssue => "SEMANTIC_ISSUE",
            ErrorCode::N8nRejected => "N8N_REJECTED",
            ErrorCode::DryRunError => "DRY_RUN_ERROR",
            ErrorCode::ValidationException => "VALIDATION_EXCEPTION",
            ErrorCode::CleanupFailed => "CLEANUP_FAILED",
            ErrorCode::CatalogNotReady => "CATALOG_NOT_READY",
            ErrorCode::OrphanNode => "ORPHAN_NODE",
            ErrorCode::CredentialTypeUnknown => "CREDENTIAL_TYPE_UNKNOWN",
            ErrorCode::SemanticSkipped => "SEMANTIC_SKIPPED",
        };
        f.write_str(s)
    }
}

/// Which layer of the Validation Gateway an error or warning originated in.
///
/// Matches the layer identifiers named throughout spec §4.4 and §8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layer {
    NodeRestrictions,
    Schema,
    NodeExistence,
    Connections,
    Credentials,
    Semantic,
    DryRun,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Layer::NodeRestrictions => "nodeRestrictions",
            Layer::Schema => "schema",
            Layer::NodeExistence => "nodeExistence",
            Layer::Connections => "connections",
            Layer::Credentials => "credentials",
            Layer::Semantic => "semantic",
            Layer::DryRun => "dryRun",
        };
        f.write_str(s)
    }
}
