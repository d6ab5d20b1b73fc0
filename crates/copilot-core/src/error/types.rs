use std::time::Duration;

/// Closed taxonomy of transport/API and core-internal failures (spec §7).
///
/// Validation failures are not exceptions — the Validation Gateway
/// always returns a typed result (see `copilot_gateway::GatewayResult`)
/// whose `errors` carry an [`crate::error::ErrorCode`] and
/// [`crate::error::Layer`] per spec §4.4. `CoreError` is reserved for
/// genuine faults: Engine Client transport failures, deadline
/// overruns, and the handful of core-internal conditions that don't
/// belong to a single validation layer. An unexpected `CoreError`
/// surfacing inside a validation layer is wrapped into a
/// `VALIDATION_EXCEPTION` error record rather than propagated raw
/// (spec §9, "Exceptions used for control flow in validation").
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The Engine rejected the request's credentials.
    #[error("unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// The Engine returned 404 for a resource that was expected to exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The Engine returned a 4xx response with a validation body.
    #[error("validation rejected by engine: {message}")]
    ValidationBadRequest { message: String, status: u16 },

    /// The Engine returned 429; `retry_after` reflects its header if present.
    #[error("rate limited by engine{}", retry_after.map(|d| format!(", retry after {:?}", d)).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    /// The Engine returned a 5xx response.
    #[error("engine server error: {message}")]
    ServerError { message: String, status: u16 },

    /// No response was received (timeout, connection refused, DNS failure, ...).
    #[error("network error: {message}")]
    Network { message: String },

    /// Session-based introspection credentials were rejected or expired.
    #[error("session authentication failed: {message}")]
    SessionAuth { message: String },

    /// A response didn't fit any of the above and can't be classified further.
    #[error("unknown engine error: {message}")]
    Unknown { message: String },

    /// An operation's deadline elapsed before it completed.
    #[error("deadline exceeded after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },

    /// The Node Catalog has no usable snapshot (no successful refresh yet,
    /// and no previous snapshot to fall back to).
    #[error("node catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    /// A request violated a policy decision outside the validation
    /// pipeline itself (e.g. a Coordinator-level guard).
    #[error("policy violation: {message}")]
    PolicyViolation { message: String },
}

impl CoreError {
    /// Whether retrying this error, unmodified, has a chance of succeeding.
    ///
    /// True for 429, 5xx, and transport errors (spec §4.1); false for
    /// everything else. The Engine Client's retry loop consults this
    /// before backing off.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            CoreError::RateLimited { .. } | CoreError::ServerError { .. } | CoreError::Network { .. }
        )
    }

    /// Human-readable recovery steps surfaced in the `{ok:false, error}` shape (spec §7).
    pub fn recovery_steps(&self) -> RecoverySteps {
        let steps: Vec<String> = match self {
            CoreError::Unauthenticated { .. } => {
                vec!["Check that the configured Engine API key is valid".into()]
            }
            CoreError::NotFound { .. } => vec!["Verify the resource id and that it still exists".into()],
            CoreError::ValidationBadRequest { .. } => {
                vec!["Inspect the engine's validation message and correct the request body".into()]
            }
            CoreError::RateLimited { retry_after } => match retry_after {
                Some(d) => vec![format!("Wait at least {:?} before retrying", d)],
                None => vec!["Back off and retry with exponential delay".into()],
            },
            CoreError::ServerError { .. } => vec!["Retry with backoff; escalate if it persists".into()],
            CoreError::Network { .. } => vec!["Check connectivity to the Engine base URL".into()],
            CoreError::SessionAuth { .. } => {
                vec!["Refresh or reconfigure the session credentials used for introspection".into()]
            }
            CoreError::Unknown { .. } => vec!["Inspect engine logs for unclassified failures".into()],
            CoreError::DeadlineExceeded { .. } => {
                vec!["Increase the configured deadline or investigate engine latency".into()]
            }
            CoreError::CatalogUnavailable { .. } => {
                vec!["Force a catalog resync once the engine is reachable".into()]
            }
            CoreError::PolicyViolation { .. } => vec!["Review the node restriction policy configuration".into()],
        };
        RecoverySteps(steps)
    }
}

/// Ordered list of human-readable recovery suggestions (spec §7, `recoverySteps[]`).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RecoverySteps(pub Vec<String>);

/// Broad classification used by callers that only need to branch on
/// shape rather than match every `CoreError` variant (e.g. metrics
/// labeling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    NotFound,
    Validation,
    RateLimit,
    Server,
    Network,
    Internal,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Unauthenticated { .. } | CoreError::SessionAuth { .. } => ErrorKind::Auth,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::ValidationBadRequest { .. } => ErrorKind::Validation,
            CoreError::RateLimited { .. } => ErrorKind::RateLimit,
            CoreError::ServerError { .. } => ErrorKind::Server,
            CoreError::Network { .. } => ErrorKind::Network,
            CoreError::Unknown { .. }
            | CoreError::DeadlineExceeded { .. }
            | CoreError::CatalogUnavailable { .. }
            | CoreError::PolicyViolation { .. } => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::ValidationBadRequest {
            message: format!("invalid JSON: {error}"),
            status: 400,
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            return CoreError::Network { message: error.to_string() };
        }
        match error.status() {
            Some(status) if status.as_u16() == 401 => CoreError::Unauthenticated { message: error.to_string() },
            Some(status) if status.as_u16() == 404 => CoreError::NotFound { message: error.to_string() },
            Some(status) if status.as_u16() == 429 => CoreError::RateLimited { retry_after: None },
            Some(status) if status.is_client_error() => CoreError::ValidationBadRequest {
                message: error.to_string(),
                status: status.as_u16(),
            },
            Some(status) if status.is_server_error() => CoreError::ServerError {
                message: error.to_string(),
                status: status.as_u16(),
            },
            _ => CoreError::Network { message: error.to_string() },
        }
    }
}
