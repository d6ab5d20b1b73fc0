//! Layer 5 — Semantic (optional) (spec §4.4, §4.7).
//!
//! Never blocks admission: every outcome here is a warning, including
//! a failed or absent advisor.

use copilot_core::deadline::Deadline;
use copilot_core::error::{ErrorCode, Layer};
use copilot_core::model::Workflow;

use crate::advisor::{IssueSeverity, SemanticAdvisor, WorkflowSummary};
use crate::result::{LayerOutcome, ValidationWarning};

pub async fn run(workflow: &Workflow, advisor: Option<&dyn SemanticAdvisor>, enabled: bool, deadline: Deadline) -> LayerOutcome {
    let mut outcome = LayerOutcome::default();

    let Some(advisor) = advisor.filter(|_| enabled) else {
        outcome.warnings.push(ValidationWarning::new(Layer::Semantic, ErrorCode::SemanticSkipped, "no semantic advisor attached or enabled; layer skipped"));
        return outcome;
    };

    let summary = summarize(workflow);
    match deadline.run(advisor.analyze_workflow_logic(summary)).await {
        Ok(Ok(analysis)) => {
            for issue in analysis.issues {
                let prefix = match issue.severity {
                    IssueSeverity::Error => "error",
                    IssueSeverity::Warning => "warning",
                    IssueSeverity::Info => "info",
                };
                let message = match &issue.suggestion {
                    Some(suggestion) => format!("[{prefix}] {} (suggestion: {suggestion})", issue.message),
                    None => format!("[{prefix}] {}", issue.message),
                };
                outcome.warnings.push(ValidationWarning { layer: Layer::Semantic, code: ErrorCode::SemanticIssue, message, path: issue.path });
            }
        }
        Ok(Err(advisor_error)) => {
            outcome.warnings.push(ValidationWarning::new(Layer::Semantic, ErrorCode::SemanticIssue, format!("semantic advisor error: {advisor_error}")));
        }
        Err(deadline_exceeded) => {
            outcome.warnings.push(ValidationWarning::new(Layer::Semantic, ErrorCode::SemanticIssue, format!("semantic analysis exceeded its deadline: {deadline_exceeded}")));
        }
    }

    outcome
}

fn summarize(workflow: &Workflow) -> WorkflowSummary {
    let nodes = workflow.nodes.iter().map(|node| (node.name.clone(), node.type_id.clone())).collect();
    let mut edges = Vec::new();
    for (source, by_channel) in &workflow.connections {
        for outputs in by_channel.values() {
            for endpoints in outputs {
                for endpoint in endpoints {
                    edges.push((source.clone(), endpoint.node.clone()));
                }
            }
        }
    }
    WorkflowSummary { name: workflow.name.clone(), nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{MockSemanticAdvisor, SemanticAnalysis};
    use std::collections::HashMap;
    use std::time::Duration;

    fn empty_workflow() -> Workflow {
        Workflow { id: None, name: "wf".into(), nodes: vec![], connections: HashMap::new(), settings: None, tags: vec![], static_data: None, pinned_data: None, active: false }
    }

    #[tokio::test]
    async fn absent_advisor_skips_with_warning() {
        let outcome = run(&empty_workflow(), None, true, Deadline::after(Duration::from_secs(1))).await;
        assert!(outcome.passed());
        assert_eq!(outcome.warnings[0].code, ErrorCode::SemanticSkipped);
    }

    #[tokio::test]
    async fn disabled_flag_skips_even_with_advisor_attached() {
        let mock = MockSemanticAdvisor::new();
        let outcome = run(&empty_workflow(), Some(&mock), false, Deadline::after(Duration::from_secs(1))).await;
        assert_eq!(outcome.warnings[0].code, ErrorCode::SemanticSkipped);
    }

    #[tokio::test]
    async fn advisor_issues_become_warnings_never_errors() {
        let mut mock = MockSemanticAdvisor::new();
        mock.expect_analyze_workflow_logic().returning(|_| {
            Box::pin(async {
                Ok(SemanticAnalysis {
                    valid: false,
                    confidence: 0.4,
                    issues: vec![crate::advisor::SemanticIssue { severity: IssueSeverity::Error, message: "looks risky".into(), path: None, suggestion: None }],
                    suggestions: vec![],
                    summary: String::new(),
                })
            })
        });
        let outcome = run(&empty_workflow(), Some(&mock), true, Deadline::after(Duration::from_secs(1))).await;
        assert!(outcome.passed());
        assert!(outcome.warnings.iter().any(|w| w.message.contains("looks risky")));
    }
}
