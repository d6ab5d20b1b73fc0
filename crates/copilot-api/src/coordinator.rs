//! The Coordinator (spec §4.8, §6): the single typed entry point that
//! wires the Engine Client, Node Catalog, Validation Gateway, Smart
//! Execution Router, and Shared Memory together and exposes the
//! control plane's stable operation set. Constructed explicitly at
//! boot and passed by value or `Arc` — no process-wide singleton
//! (spec §9, "Process-wide singletons for catalog, gateway,
//! coordinator").

use std::sync::Arc;

use copilot_catalog::{CatalogStatistics, NodeCatalog};
use copilot_core::config::Config;
use copilot_core::deadline::Deadline;
use copilot_core::error::CoreResult;
use copilot_core::memory::SharedMemory;
use copilot_core::model::Workflow;
use copilot_engine::{EngineClient, Execution, ListFilters, Page};
use copilot_gateway::{Gateway, GatewayResult};
use copilot_router::{ExecutionOutcome, RouteDecision, RouteInput, Router, RouterStatistics};

use crate::error::CoordinatorError;

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// The outcome of a validate-then-deploy submission: the validation
/// result that admitted the document, plus the Engine's own copy of
/// what got created or updated.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeploySubmission {
    pub workflow: Workflow,
    pub validation: GatewayResult,
}

pub struct Coordinator {
    config: Config,
    engine: Arc<EngineClient>,
    catalog: Arc<NodeCatalog>,
    gateway: Arc<Gateway>,
    router: Arc<Router>,
    memory: SharedMemory,
}

impl Coordinator {
    pub fn new(
        config: Config,
        engine: Arc<EngineClient>,
        catalog: Arc<NodeCatalog>,
        gateway: Arc<Gateway>,
        router: Arc<Router>,
        memory: SharedMemory,
    ) -> Self {
        Self { config, engine, catalog, gateway, router, memory }
    }

    fn deadline(&self) -> Deadline {
        Deadline::after(self.config.validation_deadline)
    }

    /// Validate a workflow document without deploying it anywhere (spec §6).
    pub async fn submit_for_validation(&self, input: &serde_json::Value) -> CoordinatorResult<GatewayResult> {
        Ok(self.gateway.validate(input).await)
    }

    /// Validate, then create (no `id`) or update (`id` present) on the
    /// Engine. A failed validation short-circuits before any Engine
    /// call is made (spec §6, "submit with deploy").
    pub async fn submit_with_deploy(&self, input: &serde_json::Value) -> CoordinatorResult<DeploySubmission> {
        let validation = self.gateway.validate(input).await;
        if !validation.valid {
            return Err(CoordinatorError::validation_failed(validation));
        }

        let workflow: Workflow =
            serde_json::from_value(input.clone()).map_err(copilot_core::error::CoreError::from)?;

        let deployed = match &workflow.id {
            Some(id) => self.engine.update_workflow(id, &workflow, self.deadline()).await?,
            None => self.engine.create_workflow(&workflow, self.deadline()).await?,
        };

        Ok(DeploySubmission { workflow: deployed, validation })
    }

    pub async fn get_workflow(&self, id: &str) -> CoordinatorResult<Workflow> {
        Ok(self.engine.get_workflow(id, self.deadline()).await?)
    }

    pub async fn delete_workflow(&self, id: &str) -> CoordinatorResult<()> {
        Ok(self.engine.delete_workflow(id, self.deadline()).await?)
    }

    pub async fn list_workflows(&self, filters: ListFilters) -> CoordinatorResult<Page<Workflow>> {
        Ok(self.engine.list_workflows(filters, self.deadline()).await?)
    }

    pub async fn set_active(&self, id: &str, active: bool) -> CoordinatorResult<()> {
        Ok(self.engine.set_active(id, active, self.deadline()).await?)
    }

    pub async fn trigger_execution(&self, id: &str, data: Option<serde_json::Value>) -> CoordinatorResult<Execution> {
        Ok(self.engine.run(id, data, self.deadline()).await?)
    }

    pub async fn get_execution(&self, id: &str, include_data: bool) -> CoordinatorResult<Execution> {
        Ok(self.engine.get_execution(id, include_data, self.deadline()).await?)
    }

    pub async fn list_executions(&self, filters: ListFilters) -> CoordinatorResult<Page<Execution>> {
        Ok(self.engine.list_executions(filters, self.deadline()).await?)
    }

    pub async fn stop_execution(&self, id: &str) -> CoordinatorResult<()> {
        Ok(self.engine.stop_execution(id, self.deadline()).await?)
    }

    /// Force a catalog resync: purge every cached validation outcome
    /// (spec §4.4, "a forced resync invalidates the cache") then
    /// refresh the catalog snapshot.
    pub async fn resync_catalog(&self) -> CoordinatorResult<CatalogStatistics> {
        self.gateway.invalidate_cache().await;
        self.refresh_catalog().await?;
        Ok(self.catalog.statistics().await)
    }

    async fn refresh_catalog(&self) -> CoreResult<()> {
        self.catalog.refresh().await
    }

    pub async fn statistics(&self) -> CatalogStatistics {
        self.catalog.statistics().await
    }

    pub async fn router_statistics(&self) -> RouterStatistics {
        self.router.statistics().await
    }

    /// Classify and route a request between the agent and handler
    /// execution paths (spec §4.6); not part of spec §6's named
    /// operation list but the Coordinator is where the Router is wired
    /// in, so it's the natural place to expose it.
    pub async fn route(&self, input: RouteInput) -> RouteDecision {
        self.router.decide(&input).await
    }

    pub async fn record_execution_outcome(&self, outcome: ExecutionOutcome) {
        self.router.record_outcome(outcome).await
    }

    pub fn memory(&self) -> &SharedMemory {
        &self.memory
    }
}
