//! Integration tests for the REST store adapter
//!
//! Runs the adapter against a wiremock server to pin down the request shape
//! and how each kind of answer maps onto the store port.

use std::time::Duration;

use leadpipe_core::RemoteStore;
use leadpipe_domain::{PipelineFailure, StoreConfig, StoreError};
use leadpipe_infra::RestStore;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer, timeout: Duration) -> RestStore {
    RestStore::new(&StoreConfig::new(server.uri(), "anon-key"), timeout).expect("rest store")
}

#[tokio::test]
async fn test_insert_sends_postgrest_request() {
    let server = MockServer::start().await;
    let row = json!({"name": "Ada", "submission_type": "strategy"});

    Mock::given(method("POST"))
        .and(path("/rest/v1/leads"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .and(header("content-type", "application/json"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!([row.clone()])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row.clone()])))
        .expect(1)
        .mount(&server)
        .await;

    let response = store_for(&server, Duration::from_secs(5))
        .insert("leads", vec![row.clone()])
        .await
        .expect("transport ok");

    assert_eq!(response.error, None);
    assert_eq!(response.data, Some(json!([row])));
}

#[tokio::test]
async fn test_empty_success_body_has_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/error_logs"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let response = store_for(&server, Duration::from_secs(5))
        .insert("error_logs", vec![json!({"message": "x"})])
        .await
        .expect("transport ok");

    assert_eq!(response.data, None);
    assert_eq!(response.error, None);
}

#[tokio::test]
async fn test_rejection_body_becomes_store_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "duplicate key value violates unique constraint \"leads_email_key\"",
            "code": "23505",
            "details": "Key (email)=(ada@example.com) already exists.",
            "hint": null
        })))
        .mount(&server)
        .await;

    let response = store_for(&server, Duration::from_secs(5))
        .insert("leads", vec![json!({})])
        .await
        .expect("transport ok");

    let error = response.error.expect("store error");
    assert_eq!(error.code.as_deref(), Some("23505"));
    assert!(error.message.starts_with("duplicate key"));
    assert_eq!(error.details.as_deref(), Some("Key (email)=(ada@example.com) already exists."));
    assert_eq!(response.data, None);
}

#[tokio::test]
async fn test_unparsable_rejection_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let response = store_for(&server, Duration::from_secs(5))
        .insert("leads", vec![json!({})])
        .await
        .expect("transport ok");

    assert_eq!(response.error, Some(StoreError::new("HTTP 503")));
}

#[tokio::test]
async fn test_slow_store_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let failure = store_for(&server, Duration::from_millis(50))
        .insert("leads", vec![json!({})])
        .await
        .unwrap_err();

    assert_eq!(failure, PipelineFailure::timeout(Duration::from_millis(50)));
}

#[tokio::test]
async fn test_garbled_success_body_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_string("{not json"))
        .mount(&server)
        .await;

    let failure = store_for(&server, Duration::from_secs(5))
        .insert("leads", vec![json!({})])
        .await
        .unwrap_err();

    assert!(matches!(failure, PipelineFailure::Unknown { .. }), "got {failure:?}");
    assert!(!failure.is_retryable());
}
