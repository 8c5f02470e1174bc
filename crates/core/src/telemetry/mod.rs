//! Best-effort error telemetry
//!
//! Failures are buffered in memory and written to the remote store in
//! batches. A failed write never drops records; they wait in the buffer for
//! the next trigger.

pub mod buffer;
pub mod worker;

pub use buffer::ErrorBuffer;
pub use worker::{FlushOutcome, TelemetryError, TelemetryReporter, TelemetryWorker};
