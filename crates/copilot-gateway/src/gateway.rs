//! The Validation Gateway orchestrator (spec §4.4).

use std::sync::Arc;
use std::time::{Duration, Instant};

use copilot_catalog::NodeCatalog;
use copilot_core::config::Config;
use copilot_core::deadline::Deadline;
use copilot_core::error::Layer;
use copilot_core::memory::{QueryFilter, SharedMemory};
use copilot_engine::EngineClient;
use tracing::debug;

use crate::advisor::SemanticAdvisor;
use crate::fingerprint;
use crate::layers;
use crate::result::{CachedOutcome, GatewayResult, ValidationError};

const MEMORY_OWNER: &str = "gateway";

/// Orchestrates the six-layer Validation Gateway (spec §4.4).
pub struct Gateway {
    catalog: Arc<NodeCatalog>,
    engine: Arc<EngineClient>,
    memory: SharedMemory,
    policy: copilot_catalog::NodeRestrictionPolicy,
    advisor: Option<Arc<dyn SemanticAdvisor>>,

    dry_run_enabled: bool,
    semantic_check_enabled: bool,
    strict_mode: bool,
    validation_deadline: Duration,
    validation_cache_ttl: Duration,
}

impl Gateway {
    pub fn new(config: &Config, catalog: Arc<NodeCatalog>, engine: Arc<EngineClient>, memory: SharedMemory, advisor: Option<Arc<dyn SemanticAdvisor>>) -> Self {
        Self {
            catalog,
            engine,
            memory,
            policy: copilot_catalog::NodeRestrictionPolicy::new(config.policy.clone()),
            // An attached advisor auto-enables semantic checking even if
            // the flag itself is unset (spec §6: "auto-enabled when an
            // advisor is attached").
            semantic_check_enabled: config.semantic_check_enabled || advisor.is_some(),
            advisor,
            dry_run_enabled: config.dry_run_enabled,
            strict_mode: config.strict_mode,
            validation_deadline: config.validation_deadline,
            validation_cache_ttl: config.validation_cache_ttl,
        }
    }

    /// Validate an arbitrary input document, running every enabled
    /// layer in order with short-circuit on the first failing layer
    /// (spec §4.4).
    pub async fn validate(&self, input: &serde_json::Value) -> GatewayResult {
        let started = Instant::now();
        let deadline = Deadline::after(self.validation_deadline);

        // Layer 0 runs on raw input, ahead of parsing (spec §4.4).
        let layer0 = layers::node_restrictions::run(input, &self.policy);
        if !layer0.passed() {
            return self.finish(started, layer0.errors, layer0.warnings, vec![], Some(Layer::NodeRestrictions), None, false);
        }
        let mut passed_layers = vec![Layer::NodeRestrictions];
        let mut warnings = layer0.warnings;

        let workflow = match layers::schema::validate_and_parse(input) {
            Ok((workflow, outcome)) => {
                warnings.extend(outcome.warnings);
                workflow
            }
            Err(outcome) => {
                return self.finish(started, outcome.errors, combine(warnings, outcome.warnings), passed_layers, Some(Layer::Schema), None, false);
            }
        };
        passed_layers.push(Layer::Schema);

        let profile = fingerprint::profile_label(self.strict_mode, self.semantic_check_enabled);
        let key = format!("validation-cache:{}", fingerprint::compute(&workflow, &profile));

        let (static_outcome, cached) = match self.load_cached(&key).await {
            Some(cached) => (cached, true),
            None => {
                let fresh = self.run_static_layers(&workflow, passed_layers.clone()).await;
                self.store_cached(&key, &fresh).await;
                (fresh, false)
            }
        };

        warnings.extend(static_outcome.warnings.clone());
        let mut errors = static_outcome.errors.clone();
        passed_layers = static_outcome.passed_layers.clone();

        if !static_outcome.passed_through_layer_five() {
            return self.finish(started, errors, warnings, passed_layers, static_outcome.failed_layer, None, cached);
        }

        if !self.dry_run_enabled {
            return self.finish(started, errors, warnings, passed_layers, None, None, cached);
        }

        let dry_run = layers::dry_run::run(&workflow, &self.engine, deadline.child(deadline.remaining())).await;
        warnings.extend(dry_run.layer.warnings);
        if !dry_run.layer.errors.is_empty() {
            errors.extend(dry_run.layer.errors);
            return self.finish(started, errors, warnings, passed_layers, Some(Layer::DryRun), dry_run.dry_run_id, cached);
        }
        passed_layers.push(Layer::DryRun);

        self.finish(started, errors, warnings, passed_layers, None, dry_run.dry_run_id, cached)
    }

    /// Layers 2..5: node existence, connections, credentials, semantic.
    /// Structural/static relative to the Engine (no dry-run), so this is
    /// the slice that gets cached.
    async fn run_static_layers(&self, workflow: &copilot_core::model::Workflow, mut passed_layers: Vec<Layer>) -> CachedOutcome {
        let mut errors: Vec<ValidationError> = Vec::new();
        let mut warnings = Vec::new();

        let layer2 = layers::node_existence::run(workflow, &self.catalog).await;
        warnings.extend(layer2.warnings);
        if !layer2.passed() {
            errors.extend(layer2.errors);
            return self.seal(errors, warnings, passed_layers, Some(Layer::NodeExistence));
        }
        passed_layers.push(Layer::NodeExistence);

        let layer3 = layers::connections::run(workflow);
        warnings.extend(layer3.warnings);
        if !layer3.passed() {
            errors.extend(layer3.errors);
            return self.seal(errors, warnings, passed_layers, Some(Layer::Connections));
        }
        passed_layers.push(Layer::Connections);

        let layer4 = layers::credentials::run(workflow, &self.catalog).await;
        warnings.extend(layer4.warnings);
        if !layer4.passed() {
            errors.extend(layer4.errors);
            return self.seal(errors, warnings, passed_layers, Some(Layer::Credentials));
        }
        passed_layers.push(Layer::Credentials);

        let semantic_deadline = Deadline::after(Duration::from_secs(10));
        let layer5 = layers::semantic::run(workflow, self.advisor.as_deref(), self.semantic_check_enabled, semantic_deadline).await;
        warnings.extend(layer5.warnings);
        passed_layers.push(Layer::Semantic);

        if self.strict_mode && !warnings.is_empty() {
            return self.seal(errors, warnings, passed_layers, None);
        }

        self.seal(errors, warnings, passed_layers, None)
    }

    fn seal(&self, errors: Vec<ValidationError>, warnings: Vec<crate::result::ValidationWarning>, passed_layers: Vec<Layer>, failed_layer: Option<Layer>) -> CachedOutcome {
        CachedOutcome { errors, warnings, passed_layers, failed_layer }
    }

    async fn load_cached(&self, key: &str) -> Option<CachedOutcome> {
        let value = self.memory.get(key).await?;
        match serde_json::from_value(value) {
            Ok(cached) => {
                debug!(key, "validation cache hit");
                Some(cached)
            }
            Err(error) => {
                debug!(key, %error, "validation cache entry failed to deserialize; recomputing");
                None
            }
        }
    }

    async fn store_cached(&self, key: &str, outcome: &CachedOutcome) {
        if let Ok(value) = serde_json::to_value(outcome) {
            self.memory.set(key.to_string(), value, MEMORY_OWNER, self.validation_cache_ttl).await;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        started: Instant,
        errors: Vec<ValidationError>,
        warnings: Vec<crate::result::ValidationWarning>,
        passed_layers: Vec<Layer>,
        failed_layer: Option<Layer>,
        dry_run_id: Option<String>,
        cached: bool,
    ) -> GatewayResult {
        let strict_failure = self.strict_mode && !warnings.is_empty();
        let valid = errors.is_empty() && failed_layer.is_none() && !strict_failure;
        GatewayResult {
            valid,
            errors,
            warnings,
            passed_layers,
            failed_layer,
            dry_run_id,
            elapsed_ms: started.elapsed().as_millis() as u64,
            cached,
        }
    }

    /// Forces a cache eviction for every stored fingerprint (used by
    /// the Coordinator's `forceCatalogResync`, since a catalog refresh
    /// can change a node's existence without changing the fingerprint).
    pub async fn invalidate_cache(&self) -> usize {
        let hits = self.memory.query(QueryFilter { pattern: Some("validation-cache:%".into()), ..Default::default() }).await;
        let mut removed = 0;
        for hit in hits {
            if self.memory.delete(&hit.key, MEMORY_OWNER).await {
                removed += 1;
            }
        }
        removed
    }
}

fn combine(mut a: Vec<crate::result::ValidationWarning>, b: Vec<crate::result::ValidationWarning>) -> Vec<crate::result::ValidationWarning> {
    a.extend(b);
    a
}
