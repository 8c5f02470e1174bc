//! Resilience patterns for fault tolerance and error handling
//!
//! This module provides **generic, reusable** resilience patterns:
//! - **Timeout**: Races an operation against a deadline without cancelling
//!   the abandoned work
//! - **Retry Logic**: Bounded attempts driven by a caller-supplied
//!   classifier, with fixed, linear or exponential delays
//!
//! Both are generic over the operation's output and error types. The
//! pipeline-specific classifier and failure mapping live in `leadpipe-core`.

pub mod retry;
pub mod timeout;

// Re-export retry types
pub use retry::{
    policies, retry_with_policy, BackoffStrategy, InvalidRetryConfig, RetryConfig,
    RetryConfigBuilder, RetryDecision, RetryError, RetryExecutor, RetryOutcome, RetryPolicy,
    RetryResult,
};
// Re-export timeout types
pub use timeout::{with_timeout, Elapsed, TimeoutError};
