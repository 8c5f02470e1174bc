//! Telemetry actor with explicit lifecycle management.
//!
//! A single background task owns the [`ErrorBuffer`]. Call sites talk to it
//! through a cloneable [`TelemetryReporter`], so recording never blocks and
//! buffer mutation, flush scheduling and re-buffering stay single-writer on a
//! multi-threaded runtime.
//!
//! Flush triggers:
//! - the buffer reaches `max_buffered` records (flushed before the next
//!   message is handled)
//! - `flush_interval` after the first record buffered since the last flush
//! - an explicit [`TelemetryReporter::flush`]
//! - shutdown, via [`TelemetryWorker::stop`] or once every handle is dropped

use std::sync::Arc;
use std::time::Duration;

use leadpipe_domain::{
    AppError, EnvironmentSnapshot, ErrorRecord, ErrorSeverity, StoreResponse, TelemetryConfig,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::buffer::ErrorBuffer;
use crate::store_ports::RemoteStore;

/// Extra time granted to the actor on top of its own shutdown budget
const JOIN_GRACE: Duration = Duration::from_millis(500);

/// Telemetry lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    #[error("Telemetry worker already running")]
    AlreadyRunning,

    #[error("Telemetry worker not running")]
    NotRunning,

    #[error("No Tokio runtime available to run the telemetry worker")]
    NoRuntime,

    #[error("Telemetry worker has stopped")]
    Closed,

    #[error("Telemetry worker task panicked")]
    Panicked,

    #[error("Telemetry worker did not stop within {0:?}")]
    JoinTimeout(Duration),
}

/// Result of a single flush attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was buffered
    Empty,
    /// The batch write succeeded
    Persisted(usize),
    /// The batch write failed; the records are back in the buffer
    Restored(usize),
}

enum TelemetryCommand {
    Record(Box<ErrorRecord>),
    Flush(oneshot::Sender<FlushOutcome>),
    Pending(oneshot::Sender<usize>),
}

/// Cloneable handle for reporting errors to the telemetry actor.
#[derive(Clone)]
pub struct TelemetryReporter {
    sender: mpsc::UnboundedSender<TelemetryCommand>,
    environment: Arc<EnvironmentSnapshot>,
}

impl TelemetryReporter {
    /// Buffer `error` for the next batch write. Fire-and-forget.
    ///
    /// `context` is merged over the error's own details. Records at
    /// [`ErrorSeverity::Error`] or above are also echoed to the log.
    pub fn record(&self, error: AppError, context: Map<String, Value>) {
        let record = ErrorRecord::new(error, context, self.environment.as_ref().clone());

        if record.severity >= ErrorSeverity::Error {
            let details = Value::Object(record.details.clone());
            error!(
                error_type = %record.error_type,
                severity = %record.severity,
                code = record.code.as_deref().unwrap_or_default(),
                details = %details,
                "{}",
                record.message
            );
        }

        if self.sender.send(TelemetryCommand::Record(Box::new(record))).is_err() {
            warn!("Telemetry worker stopped, dropping error record");
        }
    }

    /// Shorthand for [`TelemetryReporter::record`] without caller context.
    pub fn record_error(&self, error: AppError) {
        self.record(error, Map::new());
    }

    /// Flush now and wait for the outcome.
    pub async fn flush(&self) -> Result<FlushOutcome, TelemetryError> {
        let (ack, outcome) = oneshot::channel();
        self.sender.send(TelemetryCommand::Flush(ack)).map_err(|_| TelemetryError::Closed)?;
        outcome.await.map_err(|_| TelemetryError::Closed)
    }

    /// Number of buffered records, observed after every message sent before
    /// this call has been handled.
    pub async fn pending(&self) -> Result<usize, TelemetryError> {
        let (ack, count) = oneshot::channel();
        self.sender.send(TelemetryCommand::Pending(ack)).map_err(|_| TelemetryError::Closed)?;
        count.await.map_err(|_| TelemetryError::Closed)
    }

    /// True once the actor has stopped accepting records.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for TelemetryReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryReporter").field("closed", &self.is_closed()).finish()
    }
}

struct TelemetryActor {
    store: Arc<dyn RemoteStore>,
    table: String,
    buffer: ErrorBuffer,
    flush_interval: Duration,
    flush_timeout: Duration,
    flush_at: Option<Instant>,
}

impl TelemetryActor {
    async fn run(
        mut self,
        mut receiver: mpsc::UnboundedReceiver<TelemetryCommand>,
        cancel: CancellationToken,
        shutdown_timeout: Duration,
    ) {
        loop {
            let deadline = self.flush_at.unwrap_or_else(Instant::now);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Telemetry actor cancelled");
                    break;
                }
                command = receiver.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => {
                        debug!("All telemetry handles dropped");
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline), if self.flush_at.is_some() => {
                    self.flush().await;
                }
            }
        }

        // Records sent before shutdown still make the final batch.
        receiver.close();
        while let Some(command) = receiver.recv().await {
            self.handle(command).await;
        }

        let remaining = self.buffer.len();
        match tokio::time::timeout(shutdown_timeout, self.flush()).await {
            Ok(FlushOutcome::Restored(count)) => {
                warn!(count, "Final telemetry flush failed, records lost");
            }
            Ok(_) => {}
            Err(_) => {
                warn!(
                    count = remaining,
                    timeout_ms = shutdown_timeout.as_millis() as u64,
                    "Final telemetry flush timed out"
                );
            }
        }
    }

    async fn handle(&mut self, command: TelemetryCommand) {
        match command {
            TelemetryCommand::Record(record) => {
                if self.buffer.push(*record) {
                    self.flush().await;
                } else if self.flush_at.is_none() {
                    self.flush_at = Some(Instant::now() + self.flush_interval);
                }
            }
            TelemetryCommand::Flush(ack) => {
                let outcome = self.flush().await;
                let _ = ack.send(outcome);
            }
            TelemetryCommand::Pending(ack) => {
                let _ = ack.send(self.buffer.len());
            }
        }
    }

    /// Write every buffered record in one batch. Never retries; a failed
    /// write restores the batch and waits for the next trigger.
    #[instrument(skip(self), fields(table = %self.table))]
    async fn flush(&mut self) -> FlushOutcome {
        self.flush_at = None;

        let records = self.buffer.take_all();
        if records.is_empty() {
            return FlushOutcome::Empty;
        }
        let count = records.len();

        let rows: Result<Vec<Value>, _> =
            records.iter().map(|record| serde_json::to_value(record.to_row())).collect();
        let rows = match rows {
            Ok(rows) => rows,
            Err(err) => {
                warn!(count, error = %err, "Failed to encode error records");
                self.buffer.restore_front(records);
                return FlushOutcome::Restored(count);
            }
        };

        let failure = match tokio::time::timeout(
            self.flush_timeout,
            self.store.insert(&self.table, rows),
        )
        .await
        {
            Ok(Ok(StoreResponse { error: None, .. })) => None,
            Ok(Ok(StoreResponse { error: Some(error), .. })) => Some(error.to_string()),
            Ok(Err(failure)) => Some(failure.to_string()),
            Err(_) => Some(format!("flush timed out after {}ms", self.flush_timeout.as_millis())),
        };

        match failure {
            None => {
                debug!(count, "Flushed error records");
                FlushOutcome::Persisted(count)
            }
            Some(reason) => {
                warn!(count, error = %reason, "Failed to flush error records, keeping them buffered");
                self.buffer.restore_front(records);
                FlushOutcome::Restored(count)
            }
        }
    }
}

/// Owns the telemetry actor task.
pub struct TelemetryWorker {
    store: Arc<dyn RemoteStore>,
    table: String,
    config: TelemetryConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
    reporter: Option<TelemetryReporter>,
}

impl TelemetryWorker {
    /// Create a worker that writes batches into `table`.
    pub fn new<S: Into<String>>(
        store: Arc<dyn RemoteStore>,
        table: S,
        config: TelemetryConfig,
    ) -> Self {
        Self {
            store,
            table: table.into(),
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
            reporter: None,
        }
    }

    /// Spawn the actor on the current Tokio runtime and return a handle.
    pub fn start(&mut self) -> Result<TelemetryReporter, TelemetryError> {
        if self.is_running() {
            return Err(TelemetryError::AlreadyRunning);
        }
        let runtime = Handle::try_current().map_err(|_| TelemetryError::NoRuntime)?;

        info!(table = %self.table, "Starting telemetry worker");

        self.cancellation = CancellationToken::new();
        let (sender, receiver) = mpsc::unbounded_channel();

        let actor = TelemetryActor {
            store: Arc::clone(&self.store),
            table: self.table.clone(),
            buffer: ErrorBuffer::new(self.config.max_buffered),
            flush_interval: self.config.flush_interval(),
            flush_timeout: self.config.flush_timeout(),
            flush_at: None,
        };
        let cancel = self.cancellation.clone();
        let shutdown_timeout = self.config.shutdown_timeout();

        self.task_handle = Some(runtime.spawn(actor.run(receiver, cancel, shutdown_timeout)));

        let reporter = TelemetryReporter {
            sender,
            environment: Arc::new(EnvironmentSnapshot::capture(self.config.page_url.clone())),
        };
        self.reporter = Some(reporter.clone());

        Ok(reporter)
    }

    /// Stop the actor after a final flush bounded by `shutdown_timeout`.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), TelemetryError> {
        let Some(handle) = self.task_handle.take() else {
            return Err(TelemetryError::NotRunning);
        };

        info!("Stopping telemetry worker");
        self.cancellation.cancel();
        self.reporter = None;

        let join_timeout = self.config.shutdown_timeout() + JOIN_GRACE;
        match tokio::time::timeout(join_timeout, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Telemetry worker task panicked: {}", e);
                return Err(TelemetryError::Panicked);
            }
            Err(_) => {
                warn!("Telemetry worker did not complete within timeout");
                return Err(TelemetryError::JoinTimeout(join_timeout));
            }
        }

        info!("Telemetry worker stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// True between a successful `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Handle to the running actor, if any.
    pub fn reporter(&self) -> Option<TelemetryReporter> {
        self.reporter.clone()
    }
}

impl Drop for TelemetryWorker {
    fn drop(&mut self) {
        // The actor still attempts its final flush if the runtime lets it.
        self.cancellation.cancel();
    }
}
