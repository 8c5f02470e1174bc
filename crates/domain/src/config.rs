//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_FLUSH_TIMEOUT_MS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_BUFFERED_ERRORS, DEFAULT_RETRY_DELAY_MS, DEFAULT_SHUTDOWN_TIMEOUT_MS,
    DEFAULT_TIMEOUT_MS, ERROR_LOGS_TABLE, LEADS_TABLE,
};
use crate::errors::{LeadpipeError, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Build a configuration with default tuning for the given store.
    pub fn new<U: Into<String>, K: Into<String>>(url: U, anon_key: K) -> Self {
        Self {
            store: StoreConfig::new(url, anon_key),
            pipeline: PipelineConfig::default(),
            telemetry: TelemetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Reject configurations the pipeline cannot run with.
    ///
    /// # Errors
    /// Returns `LeadpipeError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.store.url.trim().is_empty() {
            return Err(LeadpipeError::Config("store.url must not be empty".into()));
        }
        Url::parse(&self.store.url).map_err(|err| {
            LeadpipeError::Config(format!("store.url is not a valid URL: {err}"))
        })?;
        if self.store.anon_key.trim().is_empty() {
            return Err(LeadpipeError::Config("store.anon_key must not be empty".into()));
        }
        if self.pipeline.max_attempts == 0 {
            return Err(LeadpipeError::Config("pipeline.max_attempts must be at least 1".into()));
        }
        if self.telemetry.max_buffered == 0 {
            return Err(LeadpipeError::Config("telemetry.max_buffered must be at least 1".into()));
        }
        Ok(())
    }
}

/// Remote store connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    #[serde(default, skip_serializing)]
    pub anon_key: String,
    #[serde(default = "default_leads_table")]
    pub leads_table: String,
    #[serde(default = "default_error_logs_table")]
    pub error_logs_table: String,
}

impl StoreConfig {
    pub fn new<U: Into<String>, K: Into<String>>(url: U, anon_key: K) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            leads_table: default_leads_table(),
            error_logs_table: default_error_logs_table(),
        }
    }
}

fn default_leads_table() -> String {
    LEADS_TABLE.to_string()
}

fn default_error_logs_table() -> String {
    ERROR_LOGS_TABLE.to_string()
}

/// Delay growth between retry attempts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Constant `retry_delay_ms` between attempts
    #[default]
    Fixed,
    /// `retry_delay_ms * 2^(attempt - 1)`
    Exponential,
}

/// Resilient query tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub backoff: BackoffKind,
}

impl PipelineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            backoff: BackoffKind::Fixed,
        }
    }
}

/// Error telemetry buffer tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Buffer length that forces an immediate flush
    pub max_buffered: usize,
    /// Delay before a scheduled flush fires
    pub flush_interval_ms: u64,
    /// Upper bound for a single batch write
    pub flush_timeout_ms: u64,
    /// Upper bound for the final flush on shutdown
    pub shutdown_timeout_ms: u64,
    /// Page the pipeline serves, attached to every record
    pub page_url: Option<String>,
}

impl TelemetryConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            max_buffered: DEFAULT_MAX_BUFFERED_ERRORS,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            flush_timeout_ms: DEFAULT_FLUSH_TIMEOUT_MS,
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
            page_url: None,
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `leadpipe_core=debug`
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string(), json: false }
    }
}
