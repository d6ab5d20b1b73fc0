//! Smart Execution Router (spec §4.6): classifies a request, consults
//! recorded success/latency telemetry, and picks between the agent and
//! handler execution paths.

mod router;
mod types;

pub use router::Router;
pub use types::{ExecutionOutcome, InputClass, Path, PathStatistics, Preference, RouteDecision, RouteInput, RouterStatistics};
