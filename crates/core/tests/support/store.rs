//! Mock remote store for testing
//!
//! Answers each insert from a script of canned replies and records every
//! call, enabling deterministic tests without a network.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leadpipe_core::RemoteStore;
use leadpipe_domain::{PipelineFailure, StoreError, StoreResponse};
use parking_lot::Mutex;
use serde_json::Value;

/// One canned reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Echo the inserted rows back as `data`
    Echo,
    /// Answer with a logical store error
    StoreError(StoreError),
    /// Fail at the transport level
    Failure(PipelineFailure),
    /// Never answer
    Hang,
    /// Sleep, then echo
    Delay(Duration),
}

/// Recorded insert call.
#[derive(Debug, Clone)]
pub struct InsertCall {
    pub table: String,
    pub rows: Vec<Value>,
}

/// In-memory mock for `RemoteStore`.
///
/// Replies are consumed in order; once the script runs out the fallback
/// reply is used for every further call.
#[derive(Clone)]
pub struct MockRemoteStore {
    script: Arc<Mutex<VecDeque<Reply>>>,
    fallback: Arc<Mutex<Reply>>,
    calls: Arc<Mutex<Vec<InsertCall>>>,
}

impl MockRemoteStore {
    /// Create a mock that answers every call with `fallback`.
    pub fn new(fallback: Reply) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(fallback)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience constructor for a store that always succeeds.
    pub fn echoing() -> Self {
        Self::new(Reply::Echo)
    }

    /// Queue replies ahead of the fallback.
    pub fn with_script<I: IntoIterator<Item = Reply>>(self, replies: I) -> Self {
        self.script.lock().extend(replies);
        self
    }

    /// Change the reply used once the script is exhausted.
    pub fn set_fallback(&self, reply: Reply) {
        *self.fallback.lock() = reply;
    }

    pub fn calls(&self) -> Vec<InsertCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Rows from every call, flattened in call order.
    pub fn rows(&self) -> Vec<Value> {
        self.calls.lock().iter().flat_map(|call| call.rows.clone()).collect()
    }

    fn next_reply(&self) -> Reply {
        self.script.lock().pop_front().unwrap_or_else(|| self.fallback.lock().clone())
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn insert(
        &self,
        table: &str,
        rows: Vec<Value>,
    ) -> Result<StoreResponse<Value>, PipelineFailure> {
        self.calls.lock().push(InsertCall { table: table.to_string(), rows: rows.clone() });

        match self.next_reply() {
            Reply::Echo => Ok(StoreResponse::ok(Some(Value::Array(rows)))),
            Reply::StoreError(error) => Ok(StoreResponse::err(error)),
            Reply::Failure(failure) => Err(failure),
            Reply::Hang => std::future::pending().await,
            Reply::Delay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(StoreResponse::ok(Some(Value::Array(rows))))
            }
        }
    }
}

/// Boxed insert call, as handed to the executor.
pub type InsertFuture =
    Pin<Box<dyn Future<Output = Result<StoreResponse<Value>, PipelineFailure>> + Send>>;

/// Operation that inserts `row` into `table` each time it is invoked.
pub fn insert_operation(
    store: &MockRemoteStore,
    table: &'static str,
    row: Value,
) -> impl FnMut() -> InsertFuture + Send + 'static {
    let store = store.clone();
    move || {
        let store = store.clone();
        let rows = vec![row.clone()];
        Box::pin(async move { store.insert(table, rows).await })
    }
}
