//! The Validation Gateway's result contract (spec §4.4, §7).

use copilot_core::error::{ErrorCode, Layer};
use serde::{Deserialize, Serialize};

/// A single blocking validation failure. Every error names the layer
/// it originated in and a stable machine code (spec §4.4 "Contracts on
/// error reporting").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub layer: Layer,
    pub code: ErrorCode,
    pub message: String,
    /// A path expression (`nodes.<name>.credentials.<slot>`,
    /// `connections.<src>.<channel>[<i>]`, ...) pinpointing the offending document location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Suggested alternatives or fixes. Most errors carry zero or one;
    /// `NODE_NOT_FOUND`/`NODE_NOT_ALLOWED` may carry up to three.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ValidationError {
    pub fn new(layer: Layer, code: ErrorCode, message: impl Into<String>) -> Self {
        Self { layer, code, message: message.into(), path: None, suggestions: Vec::new() }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

/// A non-blocking observation. Never causes `valid = false` unless
/// strict mode is enabled (spec §6, "strict mode").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub layer: Layer,
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ValidationWarning {
    pub fn new(layer: Layer, code: ErrorCode, message: impl Into<String>) -> Self {
        Self { layer, code, message: message.into(), path: None }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// The output of a single layer, before the orchestrator decides pass/fail.
#[derive(Debug, Clone, Default)]
pub struct LayerOutcome {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl LayerOutcome {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Full Validation Gateway result (spec §4.4 "Result").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub passed_layers: Vec<Layer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_layer: Option<Layer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run_id: Option<String>,
    pub elapsed_ms: u64,
    /// Not part of the spec's result shape, surfaced separately so
    /// callers can tell a cached 0..5 result from a freshly computed one.
    #[serde(default)]
    pub cached: bool,
}

/// The cacheable slice of a [`GatewayResult`]: everything through Layer
/// 5. Layer 6 is never cached (spec §4.4 "Caching") so it is recomputed
/// and merged in on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedOutcome {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub passed_layers: Vec<Layer>,
    pub failed_layer: Option<Layer>,
}

impl CachedOutcome {
    pub fn passed_through_layer_five(&self) -> bool {
        self.failed_layer.is_none()
    }
}
