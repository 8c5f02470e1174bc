//! # Leadpipe API
//!
//! Caller-facing layer - commands and the composition root.
//!
//! This crate contains:
//! - Commands (form handlers and error boundaries call these)
//! - Application context (dependency injection)
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
