//! Request serialization primitives
//!
//! ## Submodules
//!
//! - **`queue`**: single-consumer request queue that runs submitted
//!   operations one at a time, with `High` requests jumping the line
//!
//! For timeouts and retries around a single operation, see the `resilience`
//! module.

pub mod queue;

pub use queue::{
    Priority, QueueError, QueueMetrics, QueueMetricsSnapshot, QueueResult, QueueTicket,
    RequestQueue,
};
