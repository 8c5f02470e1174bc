//! Remote store port
//!
//! The pipeline reaches the backend only through an insert-style call. Rows
//! are opaque JSON objects; the port never interprets a schema.

use async_trait::async_trait;
use leadpipe_domain::{PipelineFailure, StoreResponse};
use serde_json::Value;

/// Trait for writing rows into a remote table
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert `rows` into `table`.
    ///
    /// `Ok` with `error: Some(_)` means the store answered with a logical
    /// error. `Err` is reserved for transport-level failures (network,
    /// deadline, undecodable response).
    async fn insert(
        &self,
        table: &str,
        rows: Vec<Value>,
    ) -> Result<StoreResponse<Value>, PipelineFailure>;
}
