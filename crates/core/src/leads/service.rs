//! Lead submission service - core business logic

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use leadpipe_common::sync::Priority;
use leadpipe_domain::constants::CONTACT_FORM_NAME;
use leadpipe_domain::{AppError, Lead, PipelineFailure, ResilientResult, StoreResponse};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::query::ResilientExecutor;
use crate::store_ports::RemoteStore;
use crate::telemetry::TelemetryReporter;

type InsertCall = Pin<Box<dyn Future<Output = Result<StoreResponse<Value>, PipelineFailure>> + Send>>;

/// Persists contact-form submissions and reports failed ones.
#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn RemoteStore>,
    executor: ResilientExecutor,
    telemetry: TelemetryReporter,
    table: String,
}

impl LeadService {
    /// Create a new lead service writing into `table`.
    pub fn new<S: Into<String>>(
        store: Arc<dyn RemoteStore>,
        executor: ResilientExecutor,
        telemetry: TelemetryReporter,
        table: S,
    ) -> Self {
        Self { store, executor, telemetry, table: table.into() }
    }

    /// Insert `lead` as one row and report the failure, if any.
    #[instrument(skip(self, lead), fields(submission_type = %lead.submission_type))]
    pub async fn submit(&self, lead: &Lead) -> ResilientResult<Value> {
        let outcome = match self.insert_operation(lead) {
            Ok(operation) => {
                self.executor.execute_detailed(operation, self.executor.timeout()).await
            }
            Err(failure) => Err(failure),
        };
        settle(outcome, &self.telemetry, lead)
    }

    /// Like [`LeadService::submit`], but waits its turn in the request queue.
    ///
    /// The lead is queued before this returns.
    pub fn submit_queued(
        &self,
        lead: &Lead,
        priority: Priority,
    ) -> impl Future<Output = ResilientResult<Value>> + Send + 'static {
        let pending = self
            .insert_operation(lead)
            .map(|operation| self.executor.enqueue_detailed(operation, priority));
        let telemetry = self.telemetry.clone();
        let lead = lead.clone();

        async move {
            let outcome = match pending {
                Ok(ticket) => ticket.await,
                Err(failure) => Err(failure),
            };
            settle(outcome, &telemetry, &lead)
        }
    }

    fn insert_operation(
        &self,
        lead: &Lead,
    ) -> Result<impl FnMut() -> InsertCall + Send + 'static, PipelineFailure> {
        let row = serde_json::to_value(lead)
            .map_err(|err| PipelineFailure::unknown(format!("failed to encode lead: {err}")))?;
        let store = Arc::clone(&self.store);
        let table = self.table.clone();

        Ok(move || {
            let store = Arc::clone(&store);
            let table = table.clone();
            let rows = vec![row.clone()];
            Box::pin(async move { store.insert(&table, rows).await }) as InsertCall
        })
    }
}

fn settle(
    outcome: Result<Option<Value>, PipelineFailure>,
    telemetry: &TelemetryReporter,
    lead: &Lead,
) -> ResilientResult<Value> {
    match outcome {
        Ok(data) => {
            debug!("lead stored");
            ResilientResult::success(data)
        }
        Err(failure) => {
            let mut context = Map::new();
            context.insert("form".into(), Value::from(CONTACT_FORM_NAME));
            context.insert("type".into(), Value::from(lead.submission_type.as_str()));
            telemetry.record(AppError::from(&failure), context);
            ResilientResult::failure(failure.user_message())
        }
    }
}
