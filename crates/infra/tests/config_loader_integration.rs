//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::path::PathBuf;

use leadpipe_domain::{BackoffKind, LeadpipeError};
use leadpipe_infra::config;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write config file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(
        &dir,
        "leadpipe.json",
        r#"{
            "store": {
                "url": "https://abc.supabase.co",
                "anon_key": "json-key",
                "leads_table": "contact_leads"
            },
            "pipeline": { "timeout_ms": 5000, "max_attempts": 2 },
            "telemetry": { "max_buffered": 10, "page_url": "https://example.com/contact" },
            "logging": { "filter": "debug", "json": true }
        }"#,
    );

    let config = config::load_from_file(Some(path)).expect("Failed to load config from JSON file");

    assert_eq!(config.store.url, "https://abc.supabase.co");
    assert_eq!(config.store.anon_key, "json-key");
    assert_eq!(config.store.leads_table, "contact_leads");
    assert_eq!(config.store.error_logs_table, "error_logs");
    assert_eq!(config.pipeline.timeout_ms, 5000);
    assert_eq!(config.pipeline.max_attempts, 2);
    assert_eq!(config.pipeline.retry_delay_ms, 1000);
    assert_eq!(config.pipeline.backoff, BackoffKind::Fixed);
    assert_eq!(config.telemetry.max_buffered, 10);
    assert_eq!(config.telemetry.flush_interval_ms, 10_000);
    assert_eq!(config.telemetry.page_url.as_deref(), Some("https://example.com/contact"));
    assert_eq!(config.logging.filter, "debug");
    assert!(config.logging.json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(
        &dir,
        "config.toml",
        r#"
[store]
url = "http://localhost:54321"
anon_key = "toml-key"

[pipeline]
retry_delay_ms = 200
backoff = "exponential"

[telemetry]
flush_interval_ms = 500
"#,
    );

    let config = config::load_from_file(Some(path)).expect("Failed to load config from TOML file");

    assert_eq!(config.store.url, "http://localhost:54321");
    assert_eq!(config.pipeline.retry_delay_ms, 200);
    assert_eq!(config.pipeline.backoff, BackoffKind::Exponential);
    assert_eq!(config.pipeline.max_attempts, 3);
    assert_eq!(config.telemetry.flush_interval_ms, 500);
    assert_eq!(config.telemetry.max_buffered, 50);
}

#[test]
fn test_missing_store_section_is_a_config_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(&dir, "leadpipe.toml", "[pipeline]\nmax_attempts = 2\n");

    let err = config::load_from_file(Some(path)).unwrap_err();
    assert!(matches!(err, LeadpipeError::Config(_)), "got {err:?}");
}

#[test]
fn test_invalid_json_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(&dir, "leadpipe.json", r#"{ "store": "#);

    let err = config::load_from_file(Some(path)).unwrap_err();
    assert!(matches!(err, LeadpipeError::Config(msg) if msg.contains("JSON")));
}

#[test]
fn test_nonexistent_file_is_rejected() {
    let err = config::load_from_file(Some(PathBuf::from("/nonexistent/leadpipe.toml"))).unwrap_err();
    assert!(matches!(err, LeadpipeError::Config(msg) if msg.contains("not found")));
}

#[test]
fn test_file_without_key_fails_validation() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(&dir, "leadpipe.toml", "[store]\nurl = \"https://abc.supabase.co\"\n");

    // This binary never sets LEADPIPE_STORE_ANON_KEY.
    let config = config::load_from_file(Some(path)).expect("file parses");
    assert!(matches!(config.validate(), Err(LeadpipeError::Config(msg)) if msg.contains("anon_key")));
}
