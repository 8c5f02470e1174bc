//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! pipeline.

// Remote store tables
pub const LEADS_TABLE: &str = "leads";
pub const ERROR_LOGS_TABLE: &str = "error_logs";

// Resilient query defaults
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

// Telemetry buffer defaults
pub const DEFAULT_MAX_BUFFERED_ERRORS: usize = 50;
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_FLUSH_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 2_000;

/// Lower-cased substrings that mark a failure message as transient.
pub const RETRYABLE_MESSAGE_MARKERS: [&str; 4] = ["fetch", "network", "timeout", "econnrefused"];

// User-facing messages, one per failure kind
pub const TIMEOUT_USER_MESSAGE: &str =
    "The request took too long. Please check your connection and try again.";
pub const NETWORK_USER_MESSAGE: &str = "Unable to connect. Please check your internet connection.";
pub const BACKEND_USER_MESSAGE: &str = "Unable to complete the request. Please try again.";
pub const VALIDATION_USER_MESSAGE: &str = "Please check the highlighted fields and try again.";
pub const UNKNOWN_USER_MESSAGE: &str = "An unexpected error occurred. Please try again.";

// Context keys attached to contact form telemetry
pub const CONTACT_FORM_NAME: &str = "contact_modal";
