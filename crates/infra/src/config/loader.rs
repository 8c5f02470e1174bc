//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment, if one exists
//! 2. Attempts to load from environment variables
//! 3. If the endpoint or key is missing, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON and TOML)
//! 5. Validates the result; a missing endpoint or key is fatal
//!
//! ## Environment Variables
//! - `LEADPIPE_STORE_URL`: Remote store base URL (required)
//! - `LEADPIPE_STORE_ANON_KEY`: Public API key (required)
//! - `LEADPIPE_TIMEOUT_MS`: Per-attempt deadline
//! - `LEADPIPE_MAX_ATTEMPTS`: Attempts per call, first one included
//! - `LEADPIPE_RETRY_DELAY_MS`: Delay between attempts
//! - `LEADPIPE_TELEMETRY_MAX_BUFFERED`: Buffer length forcing a flush
//! - `LEADPIPE_TELEMETRY_FLUSH_INTERVAL_MS`: Scheduled flush delay
//! - `LEADPIPE_LOG`: Tracing filter directive
//! - `LEADPIPE_LOG_JSON`: JSON log output (true/false)
//! - `LEADPIPE_PAGE_URL`: Page URL attached to telemetry records
//!
//! ## File Locations
//! The loader searches `leadpipe.toml`, `leadpipe.json`, `config.toml` and
//! `config.json` in the current working directory and then in up to two
//! parent directories.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use leadpipe_domain::{Config, LeadpipeError, Result};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] = ["leadpipe.toml", "leadpipe.json", "config.toml", "config.json"];
const PARENT_PROBE_DEPTH: usize = 2;

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `LeadpipeError::Config` if:
/// - Neither the environment nor a config file yields endpoint and key
/// - A present value cannot be parsed
/// - The resulting configuration fails validation
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "Ignoring unreadable .env file"),
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `LeadpipeError::Config` if the endpoint or key is missing, or an
/// optional variable holds an unparsable value.
pub fn load_from_env() -> Result<Config> {
    let url = env_var("LEADPIPE_STORE_URL")?;
    let anon_key = env_var("LEADPIPE_STORE_ANON_KEY")?;

    let mut config = Config::new(url, anon_key);
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations. The anon key may be
/// left out of the file and supplied through `LEADPIPE_STORE_ANON_KEY`;
/// optional environment variables override file values.
///
/// # Errors
/// Returns `LeadpipeError::Config` if the file is missing, malformed, or in
/// an unsupported format.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LeadpipeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => discover_config_paths().ok_or_else(|| {
            LeadpipeError::Config(
                "LEADPIPE_STORE_URL/LEADPIPE_STORE_ANON_KEY are not set and no config file was found"
                    .to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LeadpipeError::Config(format!("Failed to read config file: {}", e)))?;

    let mut config = parse_config(&contents, &config_path)?;
    if config.store.anon_key.trim().is_empty() {
        if let Ok(key) = std::env::var("LEADPIPE_STORE_ANON_KEY") {
            config.store.anon_key = key;
        }
    }
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LeadpipeError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(LeadpipeError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations starting from the working directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn discover_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    discover_config_paths_from(&cwd)
}

fn discover_config_paths_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(PARENT_PROBE_DEPTH + 1)
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(timeout_ms) = env_parse("LEADPIPE_TIMEOUT_MS")? {
        config.pipeline.timeout_ms = timeout_ms;
    }
    if let Some(max_attempts) = env_parse("LEADPIPE_MAX_ATTEMPTS")? {
        config.pipeline.max_attempts = max_attempts;
    }
    if let Some(retry_delay_ms) = env_parse("LEADPIPE_RETRY_DELAY_MS")? {
        config.pipeline.retry_delay_ms = retry_delay_ms;
    }
    if let Some(max_buffered) = env_parse("LEADPIPE_TELEMETRY_MAX_BUFFERED")? {
        config.telemetry.max_buffered = max_buffered;
    }
    if let Some(interval_ms) = env_parse("LEADPIPE_TELEMETRY_FLUSH_INTERVAL_MS")? {
        config.telemetry.flush_interval_ms = interval_ms;
    }
    if let Ok(page_url) = std::env::var("LEADPIPE_PAGE_URL") {
        config.telemetry.page_url = Some(page_url);
    }
    if let Ok(filter) = std::env::var("LEADPIPE_LOG") {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool("LEADPIPE_LOG_JSON", config.logging.json);
    Ok(())
}

/// Get required environment variable
///
/// # Errors
/// Returns `LeadpipeError::Config` if the variable is not set or blank.
fn env_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(LeadpipeError::Config(format!("Missing required environment variable: {}", key))),
    }
}

/// Parse an optional environment variable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| LeadpipeError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
