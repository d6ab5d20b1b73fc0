//! Smart Execution Router vocabulary (spec §4.6).

use serde::{Deserialize, Serialize};

/// Which of the two execution routes a request can take (spec
/// GLOSSARY, "Path (router)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Path {
    /// Heuristic/agent-assisted preprocessing before the Engine.
    Agent,
    /// Direct deployment, bypassing agent preprocessing.
    Handler,
}

impl Path {
    fn other(self) -> Self {
        match self {
            Path::Agent => Path::Handler,
            Path::Handler => Path::Agent,
        }
    }
}

/// The four input shapes classification can produce (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClass {
    GoalOnly,
    WorkflowOnly,
    Both,
    Unknown,
}

/// What a caller hands the router to classify and route.
#[derive(Debug, Clone, Default)]
pub struct RouteInput {
    pub goal: Option<String>,
    pub workflow: Option<serde_json::Value>,
    /// An explicit override that bypasses classification entirely (spec §4.6).
    pub force: Option<Path>,
}

impl RouteInput {
    pub fn classify(&self) -> InputClass {
        let has_goal = self.goal.as_deref().is_some_and(|g| !g.trim().is_empty());
        let has_workflow = self.workflow.is_some();
        match (has_goal, has_workflow) {
            (true, false) => InputClass::GoalOnly,
            (false, true) => InputClass::WorkflowOnly,
            (true, true) => InputClass::Both,
            (false, false) => InputClass::Unknown,
        }
    }
}

/// The router's output (spec §4.6 "Decision rules").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDecision {
    pub path: Path,
    pub confidence: f64,
    pub reason: String,
    /// Set when a caller retry-on-failure policy should fall back to
    /// the other path (spec §4.6, "both" case).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_path: Option<Path>,
}

impl RouteDecision {
    pub fn forced(path: Path) -> Self {
        Self { path, confidence: 1.0, reason: "forced".to_string(), alternative_path: None }
    }

    pub fn certain(path: Path, reason: impl Into<String>) -> Self {
        Self { path, confidence: 1.0, reason: reason.into(), alternative_path: None }
    }

    pub fn uncertain(path: Path, confidence: f64, reason: impl Into<String>) -> Self {
        Self { path, confidence, reason: reason.into(), alternative_path: None }
    }

    pub fn with_alternative(path: Path, confidence: f64, reason: impl Into<String>) -> Self {
        Self { path, confidence, reason: reason.into(), alternative_path: Some(path.other()) }
    }
}

/// A single completed request's telemetry, recorded into Shared Memory
/// under `execution-metrics:<timestamp>:<random>` (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub path: Path,
    pub success: bool,
    pub latency_ms: u64,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// A single path's preference label relative to the other (spec §4.6,
/// "a single preference label {agent, handler, equal}").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Agent,
    Handler,
    Equal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathStatistics {
    pub executions: u64,
    pub successes: u64,
    pub total_latency_ms: u64,
}

impl PathStatistics {
    pub fn success_rate(&self) -> f64 {
        if self.executions == 0 {
            0.0
        } else {
            self.successes as f64 / self.executions as f64
        }
    }

    pub fn average_latency_ms(&self) -> f64 {
        if self.executions == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / self.executions as f64
        }
    }
}

/// The full statistics surface (spec §4.6, "Statistics API").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterStatistics {
    pub total_executions: u64,
    pub agent: PathStatistics,
    pub handler: PathStatistics,
    pub preference: Preference,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_goal_only() {
        let input = RouteInput { goal: Some("send an email".into()), workflow: None, force: None };
        assert_eq!(input.classify(), InputClass::GoalOnly);
    }

    #[test]
    fn classify_workflow_only() {
        let input = RouteInput { goal: None, workflow: Some(serde_json::json!({})), force: None };
        assert_eq!(input.classify(), InputClass::WorkflowOnly);
    }

    #[test]
    fn classify_both() {
        let input = RouteInput { goal: Some("x".into()), workflow: Some(serde_json::json!({})), force: None };
        assert_eq!(input.classify(), InputClass::Both);
    }

    #[test]
    fn classify_unknown_when_neither_present() {
        let input = RouteInput { goal: Some("   ".into()), workflow: None, force: None };
        assert_eq!(input.classify(), InputClass::Unknown);
    }

    #[test]
    fn alternative_path_is_the_opposite_of_the_chosen_one() {
        let decision = RouteDecision::with_alternative(Path::Agent, 0.7, "history favors agent");
        assert_eq!(decision.alternative_path, Some(Path::Handler));
    }
}
