//! Shared helpers for api integration tests

#![allow(dead_code)]

use leadpipe_domain::{Config, Lead, SubmissionType};
use serde_json::Value;
use wiremock::MockServer;

/// Configuration pointing at `base_url` with short delays and deadlines.
pub fn fast_config(base_url: &str) -> Config {
    let mut config = Config::new(base_url, "anon-key");
    config.pipeline.timeout_ms = 2_000;
    config.pipeline.retry_delay_ms = 10;
    config.telemetry.flush_timeout_ms = 2_000;
    config
}

pub fn lead(name: &str) -> Lead {
    Lead {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        company: "Acme".to_string(),
        business_type: "Logistics".to_string(),
        phone: "+1 555 0100".to_string(),
        message: "Tell me more".to_string(),
        submission_type: SubmissionType::Strategy,
    }
}

/// JSON bodies the server received on `path`, in arrival order.
pub async fn bodies_for(server: &MockServer, path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == path)
        .filter_map(|request| request.body_json::<Value>().ok())
        .collect()
}

/// Base URL of a local port nothing listens on.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
