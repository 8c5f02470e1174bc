// Serialized request queue with front-of-line priority

mod core;
mod errors;
pub mod metrics;
mod types;

pub use self::core::{QueueTicket, RequestQueue};
pub use self::errors::{QueueError, QueueResult};
pub use self::metrics::{QueueMetrics, QueueMetricsSnapshot};
pub use self::types::Priority;
