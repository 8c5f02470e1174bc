//! # Leadpipe Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The REST adapter for the remote store
//! - HTTP client construction
//! - Configuration loading (environment, `.env`, TOML/JSON files)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `leadpipe-core`
//! - Contains all "impure" code (network, filesystem, process environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod store;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use store::RestStore;
