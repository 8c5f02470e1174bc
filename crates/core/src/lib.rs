//! # Leadpipe Core
//!
//! Pipeline business logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The remote store port
//! - The resilient query executor and its transient-failure classifier
//! - The error telemetry buffer and the actor that owns it
//! - Lead submission
//!
//! ## Architecture Principles
//! - Only depends on `leadpipe-common` and `leadpipe-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod leads;
pub mod query;
pub mod telemetry;

// Infrastructure ports
pub mod store_ports;

pub use leads::LeadService;
pub use query::{ResilientExecutor, TransientFailurePolicy};
pub use leadpipe_common::sync::Priority;
pub use store_ports::RemoteStore;
pub use telemetry::{
    ErrorBuffer, FlushOutcome, TelemetryError, TelemetryReporter, TelemetryWorker,
};
