//! # Leadpipe Domain
//!
//! Business domain types and models for the lead-capture request pipeline.
//!
//! This crate contains:
//! - The failure taxonomy shared by every pipeline stage
//! - Telemetry records and the environment snapshot attached to them
//! - The uniform `ResilientResult` returned to callers
//! - Lead submissions and configuration structures
//!
//! ## Architecture
//! - No dependencies on other Leadpipe crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
