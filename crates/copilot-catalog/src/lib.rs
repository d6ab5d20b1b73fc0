//! # Copilot Catalog
//!
//! Periodically refreshed, in-memory index of the Engine's node and
//! credential types (spec §4.2): a 4-step acquisition ladder, a Node
//! Restriction policy filter, atomic single-flight refresh, a query
//! API, and lifecycle events for downstream observers.

mod catalog;
mod events;
mod policy;
mod scheduler;
mod snapshot;

pub use catalog::NodeCatalog;
pub use events::{CatalogEvent, CatalogListener};
pub use policy::{NodeRestrictionPolicy, PolicyDecision};
pub use scheduler::spawn_refresh_scheduler;
pub use snapshot::{CatalogSnapshot, CatalogStatistics, SyncSource};

use thiserror::Error;

/// Errors specific to catalog operations, distinct from the generic
/// [`copilot_core::CoreError`] taxonomy only insofar as they add
/// catalog context; most variants simply wrap a `CoreError`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Engine(#[from] copilot_core::CoreError),

    #[error("catalog has no usable snapshot yet")]
    Unavailable,
}
