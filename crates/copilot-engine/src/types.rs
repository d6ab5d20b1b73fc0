//! Wire types for Engine responses that aren't part of the canonical
//! workflow model (spec §3 "Execution metric" is a copilot-core model;
//! these are the Engine's own execution/credential/health shapes).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of [`crate::EngineClient::health`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    #[serde(default)]
    pub version: Option<String>,
}

/// A workflow execution as reported by the Engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: String,
    pub workflow_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionStatus {
    Running,
    Success,
    Failed,
    Stopped,
    Waiting,
}

/// Filters accepted by `listWorkflows`/`listExecutions` (spec §4.1, §6).
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    pub active: Option<bool>,
    pub workflow_id: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// A single page of results from a paginated Engine list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Summary form of a credential, as returned by `listCredentials`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: String,
}

/// Headers to attach to an outbound [`crate::EngineClient::trigger_webhook`] call.
pub type Headers = HashMap<String, String>;
