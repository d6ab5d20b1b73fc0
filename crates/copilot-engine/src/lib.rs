//! # Copilot Engine
//!
//! Typed HTTP client for the workflow-automation Engine (spec §4.1):
//! workflow/execution/credential CRUD, health checking, webhook
//! triggering, and the raw introspection endpoints the Node Catalog
//! acquisition ladder consumes. Per-endpoint rate limiting and
//! retryable-error backoff are handled transparently by every call.

mod client;
mod rate_limit;
mod retry;
mod types;

pub use client::EngineClient;
pub use rate_limit::RateLimiter;
pub use retry::{with_retry, BackoffPolicy};
pub use types::{CredentialSummary, Execution, ExecutionStatus, HealthStatus, Headers, ListFilters, Page};
