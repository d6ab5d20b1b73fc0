//! Wires a [`Coordinator`] together from [`Config`] (spec §4.8,
//! §9 "construct a typed Coordinator value at boot and pass it
//! explicitly; reject global mutable aliases").

use std::sync::Arc;

use copilot_api::Coordinator;
use copilot_catalog::NodeCatalog;
use copilot_core::config::Config;
use copilot_core::memory::SharedMemory;
use copilot_engine::EngineClient;
use copilot_gateway::Gateway;
use copilot_router::Router;
use tracing::info;

/// Builds the Coordinator and performs the initial catalog fill.
/// Returns the Coordinator plus a handle to the catalog's periodic
/// background refresh task so callers can decide whether to keep it
/// alive (a long-running daemon) or let it drop (a one-shot CLI
/// invocation).
pub async fn wire_up(config: Config) -> copilot_core::error::CoreResult<(Coordinator, Arc<NodeCatalog>)> {
    let engine = Arc::new(EngineClient::new(&config));
    let catalog = Arc::new(NodeCatalog::new(engine.clone(), &config));

    info!("performing initial catalog refresh");
    catalog.refresh().await?;

    let memory = SharedMemory::new();
    let gateway = Arc::new(Gateway::new(&config, catalog.clone(), engine.clone(), memory.clone(), None));
    let router = Arc::new(Router::new(memory.clone(), config.router_min_history_size, config.router_metric_retention));

    let coordinator = Coordinator::new(config, engine, catalog.clone(), gateway, router, memory);
    Ok((coordinator, catalog))
}
