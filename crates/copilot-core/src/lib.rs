//! # Copilot Core
//!
//! Canonical data model, error taxonomy, configuration, Shared Memory,
//! and deadline plumbing shared by every other crate in the workflow
//! copilot control plane.
//!
//! This crate intentionally does no I/O and executes no workflows. It
//! defines the shapes every other crate operates on (see [`model`]),
//! the closed error taxonomy they report through ([`error`]), the
//! enumerated configuration knobs (§6 of the specification, see
//! [`config`]), and the process-local TTL key/value store used for
//! caching and telemetry hand-off ([`memory`]).

pub mod config;
pub mod deadline;
pub mod error;
pub mod memory;
pub mod model;

pub use error::{CoreError, CoreResult};
