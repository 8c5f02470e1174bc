//! Resilient remote calls
//!
//! Wraps store operations with a per-attempt deadline and bounded retries,
//! and normalizes every failure into a user-facing message.

pub mod classifier;
pub mod executor;

pub use classifier::TransientFailurePolicy;
pub use executor::ResilientExecutor;
