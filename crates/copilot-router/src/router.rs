//! The Smart Execution Router itself (spec §4.6).

use copilot_core::memory::{QueryFilter, SharedMemory};
use rand::Rng;
use tracing::debug;

use crate::types::{ExecutionOutcome, InputClass, Path, PathStatistics, Preference, RouteDecision, RouteInput, RouterStatistics};

const MEMORY_OWNER: &str = "router";
const METRICS_KEY_PREFIX: &str = "execution-metrics:";

/// Routes requests between the agent and handler paths, learning from
/// recorded telemetry (spec §4.6). Cheap to clone: `SharedMemory` is
/// internally `Arc`-wrapped.
#[derive(Clone)]
pub struct Router {
    memory: SharedMemory,
    min_history_size: usize,
    metric_retention: std::time::Duration,
}

impl Router {
    pub fn new(memory: SharedMemory, min_history_size: usize, metric_retention: std::time::Duration) -> Self {
        Self { memory, min_history_size, metric_retention }
    }

    /// Classify and route a request (spec §4.6 "Decision rules").
    pub async fn decide(&self, input: &RouteInput) -> RouteDecision {
        if let Some(forced) = input.force {
            return RouteDecision::forced(forced);
        }

        match input.classify() {
            InputClass::GoalOnly => RouteDecision::certain(Path::Agent, "goal-only input"),
            InputClass::WorkflowOnly => RouteDecision::certain(Path::Handler, "workflow-only input"),
            InputClass::Unknown => RouteDecision::uncertain(Path::Agent, 0.2, "neither goal nor workflow present"),
            InputClass::Both => self.decide_mixed().await,
        }
    }

    async fn decide_mixed(&self) -> RouteDecision {
        let stats = self.aggregate().await;
        if stats.total_executions < self.min_history_size as u64 {
            return RouteDecision::uncertain(Path::Agent, 0.5, "insufficient history");
        }

        let agent_rate = stats.agent.success_rate();
        let handler_rate = stats.handler.success_rate();
        let delta = (agent_rate - handler_rate).abs();
        let confidence = (delta + 0.5).min(1.0);

        let winner = if agent_rate >= handler_rate { Path::Agent } else { Path::Handler };
        RouteDecision::with_alternative(
            winner,
            confidence,
            format!("recorded success rate favors {winner:?} ({agent_rate:.2} vs {handler_rate:.2})"),
        )
    }

    /// Record a completed request's outcome (spec §4.6 "Telemetry recording").
    pub async fn record_outcome(&self, outcome: ExecutionOutcome) {
        let key = format!("{METRICS_KEY_PREFIX}{}:{:08x}", outcome.recorded_at.timestamp_millis(), rand::thread_rng().gen::<u32>());
        let value = match serde_json::to_value(&outcome) {
            Ok(value) => value,
            Err(error) => {
                debug!(%error, "failed to serialize execution outcome; dropping metric");
                return;
            }
        };
        self.memory.set(key, value, MEMORY_OWNER, self.metric_retention).await;
    }

    /// Aggregate statistics over every live metric (spec §4.6 "Statistics API").
    pub async fn statistics(&self) -> RouterStatistics {
        self.aggregate().await
    }

    async fn aggregate(&self) -> RouterStatistics {
        let hits = self.memory.query(QueryFilter { pattern: Some(format!("{METRICS_KEY_PREFIX}%")), ..Default::default() }).await;

        let mut agent = PathStatistics::default();
        let mut handler = PathStatistics::default();

        for hit in hits {
            let Ok(outcome) = serde_json::from_value::<ExecutionOutcome>(hit.value) else { continue };
            let bucket = match outcome.path {
                Path::Agent => &mut agent,
                Path::Handler => &mut handler,
            };
            bucket.executions += 1;
            if outcome.success {
                bucket.successes += 1;
            }
            bucket.total_latency_ms += outcome.latency_ms;
        }

        let total_executions = agent.executions + handler.executions;
        let preference = match agent.success_rate().partial_cmp(&handler.success_rate()) {
            Some(std::cmp::Ordering::Greater) => Preference::Agent,
            Some(std::cmp::Ordering::Less) => Preference::Handler,
            _ => Preference::Equal,
        };

        RouterStatistics { total_executions, agent, handler, preference }
    }
}
