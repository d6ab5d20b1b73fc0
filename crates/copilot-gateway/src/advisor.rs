//! Semantic Advisor consumed interface (spec §4.7).
//!
//! An optional, externally supplied capability. Its wire transport is
//! out of scope here — the gateway only knows this trait. Absence or
//! error never blocks admission; Layer 5 just degrades to a warning.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Compact, privacy-minimal view of a workflow handed to the advisor
/// (spec §4.7: "name, (nodeName, nodeType) list, edge list").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub name: String,
    pub nodes: Vec<(String, String)>,
    pub edges: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticIssue {
    pub severity: IssueSeverity,
    pub message: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticAnalysis {
    pub valid: bool,
    pub confidence: f64,
    #[serde(default)]
    pub issues: Vec<SemanticIssue>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Error)]
#[error("semantic advisor error: {0}")]
pub struct SemanticAdvisorError(pub String);

/// The capability the gateway consumes (spec §4.7). Only
/// `analyze_workflow_logic` is required; the rest are optional hooks
/// other components (e.g. the Smart Router or a future suggestion UI)
/// may call, defaulted to "not supported" here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SemanticAdvisor: Send + Sync {
    async fn analyze_workflow_logic(&self, summary: WorkflowSummary) -> Result<SemanticAnalysis, SemanticAdvisorError>;

    async fn parse_intent(&self, text: String) -> Option<serde_json::Value> {
        let _ = text;
        None
    }

    async fn recommend_nodes(&self, task: String, available: Vec<String>) -> Option<Vec<String>> {
        let _ = (task, available);
        None
    }

    async fn suggest_fixes(&self, errors: Vec<String>) -> Option<Vec<String>> {
        let _ = errors;
        None
    }

    async fn embed(&self, text: String) -> Option<Vec<f32>> {
        let _ = text;
        None
    }

    async fn similarity(&self, a: Vec<f32>, b: Vec<f32>) -> Option<f32> {
        let _ = (a, b);
        None
    }
}
