//! The Validation Gateway (spec §4.4): the pre-admission control point
//! every workflow document passes through before it's allowed anywhere
//! near the Engine.

pub mod advisor;
pub mod fingerprint;
pub mod gateway;
pub mod layers;
pub mod result;

pub use advisor::{IssueSeverity, SemanticAdvisor, SemanticAdvisorError, SemanticAnalysis, SemanticIssue, WorkflowSummary};
pub use gateway::Gateway;
pub use result::{GatewayResult, LayerOutcome, ValidationError, ValidationWarning};
