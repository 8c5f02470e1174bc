//! Domain types and models

pub mod lead;
pub mod result;
pub mod telemetry;

pub use lead::{Lead, SubmissionType};
pub use result::{ResilientResult, StoreError, StoreResponse};
pub use telemetry::{AppError, EnvironmentSnapshot, ErrorLogRow, ErrorRecord};
