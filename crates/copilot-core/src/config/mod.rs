//! Configuration management for the workflow copilot control plane.
//!
//! Every knob enumerated in spec §6 lives on [`Config`]. Precedence is
//! explicit config (callers constructing a [`Config`] by hand) >
//! environment variable (`Config::from_env`) > built-in default —
//! `from_env` itself only ever falls back to a default when the
//! variable is unset, so composing `Config { engine_api_key:
//! "...".into(), ..Config::from_env()? }` gives explicit config the
//! final say.

mod env;
mod error;

pub use error::{ConfigError, ConfigResult};

use std::collections::HashSet;
use std::time::Duration;

/// Per-endpoint token-bucket parameters (spec §5 rate-limit table).
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BucketConfig {
    pub tokens_per_second: f64,
    pub burst: f64,
}

impl BucketConfig {
    pub const fn new(tokens_per_second: f64, burst: f64) -> Self {
        Self { tokens_per_second, burst }
    }
}

/// The logical Engine endpoints that carry their own rate-limit bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEndpoint {
    WriteWorkflow,
    DeleteWorkflow,
    ReadWorkflow,
    ReadExecution,
    CreateExecution,
}

/// The full rate-limit table, defaulting to spec §5's per-endpoint figures.
#[derive(Debug, Clone)]
pub struct RateLimitTable {
    pub write_workflow: BucketConfig,
    pub delete_workflow: BucketConfig,
    pub read_workflow: BucketConfig,
    pub read_execution: BucketConfig,
    pub create_execution: BucketConfig,
    pub default: BucketConfig,
}

impl Default for RateLimitTable {
    fn default() -> Self {
        Self {
            write_workflow: BucketConfig::new(2.0, 5.0),
            delete_workflow: BucketConfig::new(1.0, 3.0),
            read_workflow: BucketConfig::new(5.0, 10.0),
            read_execution: BucketConfig::new(5.0, 10.0),
            create_execution: BucketConfig::new(3.0, 8.0),
            default: BucketConfig::new(2.0, 5.0),
        }
    }
}

impl RateLimitTable {
    pub fn for_endpoint(&self, endpoint: EngineEndpoint) -> BucketConfig {
        match endpoint {
            EngineEndpoint::WriteWorkflow => self.write_workflow,
            EngineEndpoint::DeleteWorkflow => self.delete_workflow,
            EngineEndpoint::ReadWorkflow => self.read_workflow,
            EngineEndpoint::ReadExecution => self.read_execution,
            EngineEndpoint::CreateExecution => self.create_execution,
        }
    }
}

/// Session-based credentials used for the richest catalog introspection source (spec §4.2).
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub username: String,
    pub password: String,
}

/// Node Restriction policy knobs (spec §4.2).
#[derive(Debug, Clone, Default)]
pub struct PolicyConfig {
    pub community_nodes_allowed: bool,
    pub community_allow_list: HashSet<String>,
}

/// The control plane's full configuration surface (spec §6, enumerated).
#[derive(Debug, Clone)]
pub struct Config {
    pub engine_base_url: String,
    pub engine_api_key: String,
    pub session_credentials: Option<SessionCredentials>,

    pub dry_run_enabled: bool,
    pub semantic_check_enabled: bool,
    pub strict_mode: bool,

    pub validation_deadline: Duration,
    pub catalog_refresh_interval: Duration,
    pub catalog_fetch_deadline: Duration,

    pub policy: PolicyConfig,
    pub rate_limits: RateLimitTable,

    pub router_min_history_size: usize,
    pub router_metric_retention: Duration,

    pub validation_cache_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// the spec §6 built-in defaults for anything unset. `ENGINE_BASE_URL`
    /// and `ENGINE_API_KEY` are required; every other knob has a default.
    pub fn from_env() -> ConfigResult<Self> {
        let engine_base_url =
            env::optional("ENGINE_BASE_URL").ok_or_else(|| ConfigError::RequiredFieldMissing("ENGINE_BASE_URL".into()))?;
        let engine_api_key =
            env::optional("ENGINE_API_KEY").ok_or_else(|| ConfigError::RequiredFieldMissing("ENGINE_API_KEY".into()))?;

        let session_credentials = match (env::optional("ENGINE_SESSION_USER"), env::optional("ENGINE_SESSION_PASSWORD")) {
            (Some(username), Some(password)) => Some(SessionCredentials { username, password }),
            _ => None,
        };

        let config = Self {
            engine_base_url,
            engine_api_key,
            session_credentials,
            dry_run_enabled: env::bool_with_default("DRY_RUN_ENABLED", true),
            semantic_check_enabled: env::bool_with_default("SEMANTIC_CHECK_ENABLED", false),
            strict_mode: env::bool_with_default("STRICT_MODE", false),
            validation_deadline: Duration::from_millis(env::with_default("VALIDATION_DEADLINE_MS", 60_000)),
            catalog_refresh_interval: Duration::from_millis(env::with_default("CATALOG_REFRESH_INTERVAL_MS", 300_000)),
            catalog_fetch_deadline: Duration::from_millis(env::with_default("CATALOG_FETCH_DEADLINE_MS", 30_000)),
            policy: PolicyConfig {
                community_nodes_allowed: env::bool_with_default("COMMUNITY_NODES_ALLOWED", false),
                community_allow_list: env::set_with_default("COMMUNITY_NODE_ALLOW_LIST", &[]),
            },
            rate_limits: RateLimitTable::default(),
            router_min_history_size: env::with_default("ROUTER_MIN_HISTORY_SIZE", 5),
            router_metric_retention: Duration::from_millis(env::with_default(
                "ROUTER_METRIC_RETENTION_MS",
                30 * 24 * 60 * 60 * 1000,
            )),
            validation_cache_ttl: Duration::from_millis(env::with_default(
                "VALIDATION_CACHE_TTL_MS",
                24 * 60 * 60 * 1000,
            )),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field invariants that `from_env`'s per-field parsing can't catch.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.engine_base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("engine_base_url must not be empty".into()));
        }
        if !self.engine_base_url.starts_with("http://") && !self.engine_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "engine_base_url".into(),
                value: self.engine_base_url.clone(),
            });
        }
        if self.engine_api_key.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("engine_api_key must not be empty".into()));
        }
        if self.router_min_history_size == 0 {
            return Err(ConfigError::ValidationFailed("router_min_history_size must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            engine_base_url: "https://engine.example.com".into(),
            engine_api_key: "secret-key".into(),
            session_credentials: None,
            dry_run_enabled: true,
            semantic_check_enabled: false,
            strict_mode: false,
            validation_deadline: Duration::from_millis(60_000),
            catalog_refresh_interval: Duration::from_millis(300_000),
            catalog_fetch_deadline: Duration::from_millis(30_000),
            policy: PolicyConfig::default(),
            rate_limits: RateLimitTable::default(),
            router_min_history_size: 5,
            router_metric_retention: Duration::from_secs(30 * 24 * 60 * 60),
            validation_cache_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }

    #[test]
    fn default_rate_limit_table_matches_spec_figures() {
        let table = RateLimitTable::default();
        assert_eq!(table.write_workflow.tokens_per_second, 2.0);
        assert_eq!(table.write_workflow.burst, 5.0);
        assert_eq!(table.delete_workflow.tokens_per_second, 1.0);
        assert_eq!(table.read_execution.burst, 10.0);
        assert_eq!(table.create_execution.tokens_per_second, 3.0);
    }

    #[test]
    fn rejects_empty_base_url() {
        let mut config = base_config();
        config.engine_base_url = "".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = base_config();
        config.engine_base_url = "ftp://engine.example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn accepts_well_formed_config() {
        assert!(base_config().validate().is_ok());
    }
}
