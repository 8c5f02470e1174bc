//! Commands - caller-facing entry points
//!
//! Every command logs its outcome and duration. Pipeline commands never fail
//! with an error type: failures come back inside `ResilientResult` as a
//! user-facing message.

mod leads;
mod telemetry;

pub use leads::*;
pub use telemetry::*;
