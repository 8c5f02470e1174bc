//! Error types used throughout the pipeline

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BACKEND_USER_MESSAGE, NETWORK_USER_MESSAGE, RETRYABLE_MESSAGE_MARKERS, TIMEOUT_USER_MESSAGE,
    UNKNOWN_USER_MESSAGE, VALIDATION_USER_MESSAGE,
};

/// Main error type for setup paths (configuration, client construction)
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LeadpipeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Leadpipe setup operations
pub type Result<T> = std::result::Result<T, LeadpipeError>;

/// Severity levels shared by failures and telemetry records.
///
/// Ordered so that `severity >= ErrorSeverity::Error` selects the records that
/// are echoed to the local diagnostic channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Degraded but operational
    Warning,
    /// Failure requiring attention
    Error,
    /// Immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Stable failure kind labels persisted with telemetry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    NetworkError,
    TimeoutError,
    BackendError,
    ValidationError,
    UnknownError,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::BackendError => "BACKEND_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a pipeline call can fail.
///
/// The executor maps each variant to exactly one user-facing message via
/// [`PipelineFailure::user_message`]; adding a variant forces a new mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineFailure {
    /// Connectivity-level failure (refused connection, DNS, dropped socket)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Deadline exceeded before the remote call answered
    #[error("Query timeout after {after:?}")]
    Timeout { after: Duration },

    /// The remote store answered with a logical error
    #[error("Backend error: {message}")]
    Backend { message: String, user_message: String, code: Option<String> },

    /// Produced upstream by form validation; never raised by the pipeline itself
    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    /// Anything uncategorized
    #[error("{message}")]
    Unknown { message: String },
}

impl PipelineFailure {
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::Timeout { after }
    }

    /// Backend failure carrying the fixed user-facing message.
    pub fn backend<S: Into<String>>(message: S, code: Option<String>) -> Self {
        Self::Backend {
            message: message.into(),
            user_message: BACKEND_USER_MESSAGE.to_string(),
            code,
        }
    }

    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    pub fn unknown<S: Into<String>>(message: S) -> Self {
        Self::Unknown { message: message.into() }
    }

    pub fn kind(&self) -> ErrorType {
        match self {
            Self::Network { .. } => ErrorType::NetworkError,
            Self::Timeout { .. } => ErrorType::TimeoutError,
            Self::Backend { .. } => ErrorType::BackendError,
            Self::Validation { .. } => ErrorType::ValidationError,
            Self::Unknown { .. } => ErrorType::UnknownError,
        }
    }

    /// Short, non-technical message safe to show an end user.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Timeout { .. } => TIMEOUT_USER_MESSAGE,
            Self::Network { .. } => NETWORK_USER_MESSAGE,
            Self::Backend { user_message, .. } => user_message,
            Self::Validation { .. } => VALIDATION_USER_MESSAGE,
            Self::Unknown { .. } => UNKNOWN_USER_MESSAGE,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::Backend { .. } | Self::Unknown { .. } => ErrorSeverity::Error,
            Self::Validation { .. } => ErrorSeverity::Info,
        }
    }

    /// Backend error code, when the store supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Transient-failure classifier used by the retry policy.
    ///
    /// Network and timeout kinds always qualify. Backend and unknown failures
    /// qualify only when their message mentions a transport problem.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Backend { message, .. } | Self::Unknown { message } => {
                message_looks_transient(message)
            }
            Self::Validation { .. } => false,
        }
    }
}

/// Case-insensitive match against [`RETRYABLE_MESSAGE_MARKERS`].
pub fn message_looks_transient(message: &str) -> bool {
    let lower = message.to_lowercase();
    RETRYABLE_MESSAGE_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_and_timeout_are_always_retryable() {
        assert!(PipelineFailure::network("socket closed").is_retryable());
        assert!(PipelineFailure::timeout(Duration::from_millis(5)).is_retryable());
    }

    #[test]
    fn backend_retryability_follows_message_markers() {
        assert!(!PipelineFailure::backend("duplicate key value", Some("23505".into())).is_retryable());
        assert!(PipelineFailure::backend("TypeError: Failed to fetch", None).is_retryable());
        assert!(PipelineFailure::unknown("connect ECONNREFUSED 127.0.0.1").is_retryable());
        assert!(PipelineFailure::unknown("Gateway Timeout").is_retryable());
        assert!(!PipelineFailure::unknown("boom").is_retryable());
    }

    #[test]
    fn validation_is_never_retryable() {
        assert!(!PipelineFailure::validation("email", "network@example.com is taken").is_retryable());
    }

    #[test]
    fn user_messages_are_fixed_per_kind() {
        assert_eq!(
            PipelineFailure::timeout(Duration::from_secs(10)).user_message(),
            TIMEOUT_USER_MESSAGE
        );
        assert_eq!(PipelineFailure::network("x").user_message(), NETWORK_USER_MESSAGE);
        assert_eq!(PipelineFailure::backend("x", None).user_message(), BACKEND_USER_MESSAGE);
        assert_eq!(PipelineFailure::unknown("x").user_message(), UNKNOWN_USER_MESSAGE);
    }

    #[test]
    fn severity_orders_from_info_to_critical() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn error_type_serializes_as_stable_label() {
        let json = serde_json::to_string(&ErrorType::BackendError).unwrap();
        assert_eq!(json, "\"BACKEND_ERROR\"");
        assert_eq!(PipelineFailure::unknown("x").kind().as_str(), "UNKNOWN_ERROR");
    }
}
