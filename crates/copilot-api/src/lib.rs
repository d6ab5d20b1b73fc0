//! # Copilot API
//!
//! The Coordinator (spec §4.8): a single typed facade over the Engine
//! Client, Node Catalog, Validation Gateway, Smart Execution Router,
//! and Shared Memory, exposing the control plane's stable operation
//! set (spec §6) as plain async methods. Transport-agnostic by design
//! — `copilot-app` is one caller, but nothing here assumes a CLI, an
//! HTTP server, or any other particular transport.

mod coordinator;
mod error;

pub use coordinator::{Coordinator, CoordinatorResult, DeploySubmission};
pub use error::{envelope, CoordinatorError, ErrorShape};
