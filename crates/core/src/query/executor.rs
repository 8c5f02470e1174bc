//! Resilient query executor
//!
//! Every remote call runs through the same stack: each attempt gets its own
//! deadline, failed attempts are classified by [`TransientFailurePolicy`], and
//! the terminal outcome is folded into a [`ResilientResult`]. Nothing escapes
//! as a panic or an `Err`; callers only ever see data or a user message.

use std::future::Future;
use std::time::Duration;

use leadpipe_common::resilience::{
    with_timeout, RetryConfig, RetryError, RetryExecutor, TimeoutError,
};
use leadpipe_common::sync::{Priority, RequestQueue};
use leadpipe_domain::{
    BackoffKind, LeadpipeError, PipelineConfig, PipelineFailure, ResilientResult, StoreResponse,
};
use tracing::{debug, instrument, warn};

use super::classifier::{backend_failure, timeout_failure, TransientFailurePolicy};

/// Cap for exponential delays
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Runs remote calls with timeout, retry and failure normalization.
///
/// Cloning is cheap; clones share the same request queue.
#[derive(Debug, Clone)]
pub struct ResilientExecutor {
    retry: RetryExecutor<TransientFailurePolicy>,
    timeout: Duration,
    queue: RequestQueue,
}

impl ResilientExecutor {
    /// Build an executor from pipeline tuning.
    ///
    /// # Errors
    /// Returns `LeadpipeError::Config` if the retry settings are unusable.
    pub fn new(config: &PipelineConfig) -> Result<Self, LeadpipeError> {
        Self::with_queue(config, RequestQueue::new())
    }

    /// Build an executor that drains through an existing queue.
    pub fn with_queue(config: &PipelineConfig, queue: RequestQueue) -> Result<Self, LeadpipeError> {
        let builder = RetryConfig::builder().max_attempts(config.max_attempts);
        let builder = match config.backoff {
            BackoffKind::Fixed => builder.fixed_backoff(config.retry_delay()),
            BackoffKind::Exponential => {
                builder.exponential_backoff(config.retry_delay(), 2.0, MAX_RETRY_DELAY)
            }
        };
        let retry_config = builder.build().map_err(|err| LeadpipeError::Config(err.to_string()))?;

        Ok(Self {
            retry: RetryExecutor::new(retry_config, TransientFailurePolicy),
            timeout: config.timeout(),
            queue,
        })
    }

    /// Default per-attempt deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Queue that serializes [`ResilientExecutor::enqueue`] calls.
    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// Run a read with the default deadline.
    pub async fn query<T, F, Fut>(&self, operation: F) -> ResilientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StoreResponse<T>, PipelineFailure>> + Send + 'static,
        T: Send + 'static,
    {
        self.query_with_timeout(operation, self.timeout).await
    }

    /// Run a read with an explicit per-attempt deadline.
    pub async fn query_with_timeout<T, F, Fut>(
        &self,
        operation: F,
        timeout: Duration,
    ) -> ResilientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StoreResponse<T>, PipelineFailure>> + Send + 'static,
        T: Send + 'static,
    {
        into_resilient(self.execute_detailed(operation, timeout).await)
    }

    /// Run a write. Behaves exactly like [`ResilientExecutor::query`].
    pub async fn mutation<T, F, Fut>(&self, operation: F) -> ResilientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StoreResponse<T>, PipelineFailure>> + Send + 'static,
        T: Send + 'static,
    {
        self.query_with_timeout(operation, self.timeout).await
    }

    /// Run a write with an explicit per-attempt deadline.
    pub async fn mutation_with_timeout<T, F, Fut>(
        &self,
        operation: F,
        timeout: Duration,
    ) -> ResilientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StoreResponse<T>, PipelineFailure>> + Send + 'static,
        T: Send + 'static,
    {
        self.query_with_timeout(operation, timeout).await
    }

    /// Run `operation` and return the terminal failure instead of a user
    /// message, for callers that report it.
    #[instrument(skip(self, operation), fields(timeout_ms = timeout.as_millis() as u64))]
    pub async fn execute_detailed<T, F, Fut>(
        &self,
        mut operation: F,
        timeout: Duration,
    ) -> Result<Option<T>, PipelineFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StoreResponse<T>, PipelineFailure>> + Send + 'static,
        T: Send + 'static,
    {
        let outcome = self
            .retry
            .execute_with_outcome(|| {
                let call = operation();
                async move {
                    match with_timeout(call, timeout).await {
                        Err(TimeoutError::Elapsed(elapsed)) => Err(timeout_failure(elapsed)),
                        Err(TimeoutError::Panicked { message }) => Err(PipelineFailure::unknown(
                            format!("store call panicked: {message}"),
                        )),
                        Ok(Err(failure)) => Err(failure),
                        Ok(Ok(StoreResponse { error: Some(error), .. })) => {
                            Err(backend_failure(error))
                        }
                        Ok(Ok(StoreResponse { data, error: None })) => Ok(data),
                    }
                }
            })
            .await;

        let attempts = outcome.attempts;
        match outcome.into_result() {
            Ok(data) => {
                debug!(attempts, "resilient call succeeded");
                Ok(data)
            }
            Err(err) => {
                let failure = terminal_failure(err);
                warn!(
                    attempts,
                    error_type = %failure.kind(),
                    code = failure.code().unwrap_or_default(),
                    error = %failure,
                    "resilient call failed"
                );
                Err(failure)
            }
        }
    }

    /// Queue `operation` behind every pending request.
    ///
    /// The request is placed in the queue before this returns; the returned
    /// future only waits for its turn and its result.
    pub fn enqueue<T, F, Fut>(
        &self,
        operation: F,
        priority: Priority,
    ) -> impl Future<Output = ResilientResult<T>> + Send + 'static
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<StoreResponse<T>, PipelineFailure>> + Send + 'static,
        T: Send + 'static,
    {
        let pending = self.enqueue_detailed(operation, priority);
        async move { into_resilient(pending.await) }
    }

    /// [`ResilientExecutor::enqueue`] returning the terminal failure.
    pub fn enqueue_detailed<T, F, Fut>(
        &self,
        operation: F,
        priority: Priority,
    ) -> impl Future<Output = Result<Option<T>, PipelineFailure>> + Send + 'static
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<StoreResponse<T>, PipelineFailure>> + Send + 'static,
        T: Send + 'static,
    {
        let executor = self.clone();
        let timeout = self.timeout;
        let ticket = self
            .queue
            .enqueue(async move { executor.execute_detailed(operation, timeout).await }, priority);

        async move {
            match ticket.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(error = %err, "queued request did not complete");
                    Err(PipelineFailure::unknown(err.to_string()))
                }
            }
        }
    }
}

fn terminal_failure(err: RetryError<PipelineFailure>) -> PipelineFailure {
    match err {
        RetryError::AttemptsExhausted { last_error, .. }
        | RetryError::NonRetryable { last_error, .. } => last_error,
    }
}

fn into_resilient<T>(result: Result<Option<T>, PipelineFailure>) -> ResilientResult<T> {
    match result {
        Ok(data) => ResilientResult::success(data),
        Err(failure) => ResilientResult::failure(failure.user_message()),
    }
}
