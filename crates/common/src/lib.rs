//! Modular common utilities shared across Leadpipe crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: async infrastructure (timeout, retry, serialized request
//!   queue)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;
#[cfg(feature = "runtime")]
pub mod sync;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use resilience::{
    retry_with_policy, with_timeout, BackoffStrategy, Elapsed, InvalidRetryConfig, RetryConfig,
    RetryConfigBuilder, RetryDecision, RetryError, RetryExecutor, RetryOutcome, RetryPolicy,
    RetryResult, TimeoutError,
};
#[cfg(feature = "runtime")]
pub use sync::{Priority, QueueError, QueueMetrics, QueueMetricsSnapshot, QueueTicket, RequestQueue};
