//! PostgREST-style REST adapter for the remote store port

use std::time::Duration;

use async_trait::async_trait;
use leadpipe_core::RemoteStore;
use leadpipe_domain::{LeadpipeError, PipelineFailure, StoreConfig, StoreError, StoreResponse};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::transport_failure;
use crate::http::HttpClient;

const REST_PATH: &str = "rest/v1";

/// Inserts rows with `POST {url}/rest/v1/{table}`.
#[derive(Debug, Clone)]
pub struct RestStore {
    http: HttpClient,
    base_url: Url,
    anon_key: String,
}

impl RestStore {
    /// Build an adapter with its own HTTP client bounded by `timeout`.
    ///
    /// # Errors
    /// Returns `LeadpipeError::Config` for a malformed URL or blank key.
    pub fn new(config: &StoreConfig, timeout: Duration) -> Result<Self, LeadpipeError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Self::with_client(http, config)
    }

    /// Build an adapter around an existing client.
    pub fn with_client(http: HttpClient, config: &StoreConfig) -> Result<Self, LeadpipeError> {
        let trimmed = config.url.trim().trim_end_matches('/');
        // A trailing slash keeps `Url::join` from replacing the last segment.
        let base_url = Url::parse(&format!("{trimmed}/{REST_PATH}/")).map_err(|err| {
            LeadpipeError::Config(format!("store.url is not a valid URL: {err}"))
        })?;

        if config.anon_key.trim().is_empty() {
            return Err(LeadpipeError::Config("store.anon_key must not be empty".into()));
        }

        Ok(Self { http, base_url, anon_key: config.anon_key.clone() })
    }

    /// Endpoint for `table`.
    pub fn table_url(&self, table: &str) -> Result<Url, PipelineFailure> {
        self.base_url
            .join(table)
            .map_err(|err| PipelineFailure::unknown(format!("invalid table name {table:?}: {err}")))
    }

    async fn read_success(&self, response: Response) -> Result<Option<Value>, PipelineFailure> {
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_failure(&err, self.http.timeout()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|err| PipelineFailure::unknown(format!("failed to decode store response: {err}")))
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert(
        &self,
        table: &str,
        rows: Vec<Value>,
    ) -> Result<StoreResponse<Value>, PipelineFailure> {
        let url = self.table_url(table)?;
        let request = self
            .http
            .request(Method::POST, url)
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(&rows);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| transport_failure(&err, self.http.timeout()))?;

        let status = response.status();
        if status.is_success() {
            let data = self.read_success(response).await?;
            debug!(%status, "insert accepted");
            return Ok(StoreResponse::ok(data));
        }

        let error = store_error_from(status, response.text().await.ok());
        warn!(%status, code = ?error.code, message = %error.message, "insert rejected");
        Ok(StoreResponse::err(error))
    }
}

/// Read the PostgREST error body, falling back to the bare status.
fn store_error_from(status: StatusCode, body: Option<String>) -> StoreError {
    body.as_deref()
        .and_then(|text| serde_json::from_str::<StoreError>(text).ok())
        .unwrap_or_else(|| StoreError::new(format!("HTTP {}", status.as_u16())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> StoreConfig {
        StoreConfig::new(url, "anon")
    }

    #[test]
    fn table_url_appends_rest_path() {
        let store = RestStore::new(&config("https://abc.supabase.co/"), Duration::from_secs(1))
            .expect("store");
        assert_eq!(
            store.table_url("leads").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/leads"
        );
    }

    #[test]
    fn table_url_keeps_base_path() {
        let store = RestStore::new(&config("http://localhost:54321/proxy"), Duration::from_secs(1))
            .expect("store");
        assert_eq!(
            store.table_url("error_logs").unwrap().as_str(),
            "http://localhost:54321/proxy/rest/v1/error_logs"
        );
    }

    #[test]
    fn rejects_malformed_url_and_blank_key() {
        assert!(matches!(
            RestStore::new(&config("not a url"), Duration::from_secs(1)),
            Err(LeadpipeError::Config(_))
        ));
        assert!(matches!(
            RestStore::new(&StoreConfig::new("https://abc.supabase.co", " "), Duration::from_secs(1)),
            Err(LeadpipeError::Config(_))
        ));
    }

    #[test]
    fn error_body_is_parsed_or_replaced_by_status() {
        let parsed = store_error_from(
            StatusCode::CONFLICT,
            Some(r#"{"message":"duplicate key","code":"23505","details":null,"hint":null}"#.into()),
        );
        assert_eq!(parsed, StoreError::new("duplicate key").with_code("23505"));

        let fallback = store_error_from(StatusCode::BAD_GATEWAY, Some("<html>".into()));
        assert_eq!(fallback, StoreError::new("HTTP 502"));
    }
}
