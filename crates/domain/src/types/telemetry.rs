//! Error telemetry records
//!
//! An [`AppError`] describes a failure at the point it was observed. When it is
//! handed to the telemetry buffer it becomes an [`ErrorRecord`]: the caller's
//! context is merged into its details and a snapshot of the running
//! environment is attached. [`ErrorLogRow`] is the persisted row shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::constants::UNKNOWN_USER_MESSAGE;
use crate::errors::{ErrorSeverity, ErrorType, PipelineFailure};

/// Structured description of a failure, created at the failure site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppError {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub severity: ErrorSeverity,
    pub message: String,
    pub user_message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub stack: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AppError {
    pub fn new<M, U>(error_type: ErrorType, severity: ErrorSeverity, message: M, user_message: U) -> Self
    where
        M: Into<String>,
        U: Into<String>,
    {
        Self {
            error_type,
            severity,
            message: message.into(),
            user_message: user_message.into(),
            code: None,
            details: Map::new(),
            stack: None,
            timestamp: Utc::now(),
        }
    }

    /// Uncategorized error built from a bare message.
    pub fn from_message<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorType::UnknownError, ErrorSeverity::Error, message, UNKNOWN_USER_MESSAGE)
    }

    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_detail<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_stack<S: Into<String>>(mut self, stack: S) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl From<&PipelineFailure> for AppError {
    fn from(failure: &PipelineFailure) -> Self {
        // Category lives in error_type; message keeps the store's text.
        let message = match failure {
            PipelineFailure::Network { message }
            | PipelineFailure::Backend { message, .. }
            | PipelineFailure::Unknown { message } => message.clone(),
            PipelineFailure::Timeout { .. } | PipelineFailure::Validation { .. } => {
                failure.to_string()
            }
        };
        let mut error =
            AppError::new(failure.kind(), failure.severity(), message, failure.user_message());

        match failure {
            PipelineFailure::Timeout { after } => {
                let timeout_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);
                error = error.with_detail("timeout_ms", Value::from(timeout_ms));
            }
            PipelineFailure::Backend { code: Some(code), .. } => {
                error = error.with_code(code.clone());
            }
            PipelineFailure::Validation { field, .. } => {
                error = error.with_detail("field", Value::from(field.clone()));
            }
            _ => {}
        }

        error
    }
}

impl From<PipelineFailure> for AppError {
    fn from(failure: PipelineFailure) -> Self {
        AppError::from(&failure)
    }
}

/// Snapshot of the process that observed a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub user_agent: String,
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    pub os: String,
    pub arch: String,
}

impl EnvironmentSnapshot {
    /// Capture the current process environment.
    pub fn capture(page_url: Option<String>) -> Self {
        let host = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .ok()
            .filter(|value| !value.is_empty());

        Self {
            user_agent: format!(
                "leadpipe/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            page_url,
            host,
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// Buffered telemetry entry awaiting a batch write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub severity: ErrorSeverity,
    pub message: String,
    pub user_message: String,
    pub code: Option<String>,
    pub details: Map<String, Value>,
    pub stack: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub environment: EnvironmentSnapshot,
}

impl ErrorRecord {
    /// Build a record, merging `context` over the error's own details.
    pub fn new(error: AppError, context: Map<String, Value>, environment: EnvironmentSnapshot) -> Self {
        let mut details = error.details;
        details.extend(context);

        Self {
            id: Uuid::now_v7(),
            error_type: error.error_type,
            severity: error.severity,
            message: error.message,
            user_message: error.user_message,
            code: error.code,
            details,
            stack: error.stack,
            timestamp: error.timestamp,
            environment,
        }
    }

    pub fn to_row(&self) -> ErrorLogRow<'_> {
        ErrorLogRow {
            error_type: self.error_type,
            severity: self.severity,
            message: &self.message,
            user_message: &self.user_message,
            code: self.code.as_deref(),
            details: &self.details,
            user_agent: &self.environment.user_agent,
            url: self.environment.page_url.as_deref(),
            stack: self.stack.as_deref(),
            timestamp: self.timestamp,
        }
    }
}

/// Row shape of the `error_logs` table.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorLogRow<'a> {
    pub error_type: ErrorType,
    pub severity: ErrorSeverity,
    pub message: &'a str,
    pub user_message: &'a str,
    pub code: Option<&'a str>,
    pub details: &'a Map<String, Value>,
    pub user_agent: &'a str,
    pub url: Option<&'a str>,
    pub stack: Option<&'a str>,
    pub timestamp: DateTime<Utc>,
}
