//! Deadline wrapper for asynchronous operations
//!
//! [`with_timeout`] races an operation against a timer. The operation is
//! spawned onto the runtime first, so losing the race detaches it instead of
//! cancelling it: a remote write that already left the process may still land
//! after the caller has given up.

use std::any::Any;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// The deadline fired before the operation settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Query timeout after {}ms", .after.as_millis())]
pub struct Elapsed {
    after: Duration,
}

impl Elapsed {
    /// Record that the deadline `after` was exceeded.
    pub fn new(after: Duration) -> Self {
        Self { after }
    }

    /// The deadline that was exceeded.
    pub fn after(&self) -> Duration {
        self.after
    }
}

/// Why [`with_timeout`] produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeoutError {
    /// The deadline fired first
    #[error(transparent)]
    Elapsed(#[from] Elapsed),

    /// The operation panicked; the panic does not reach the caller
    #[error("Operation panicked: {message}")]
    Panicked { message: String },
}

impl TimeoutError {
    /// The exceeded deadline, if this is a timeout.
    pub fn elapsed(&self) -> Option<Elapsed> {
        match self {
            Self::Elapsed(elapsed) => Some(*elapsed),
            Self::Panicked { .. } => None,
        }
    }
}

/// Run `operation` with a deadline of `after`.
///
/// Returns the operation's output if it settles first, otherwise
/// [`TimeoutError::Elapsed`]. A zero deadline fails before the operation is
/// started. Once started, the operation keeps running in the background
/// after the deadline and its late result is discarded.
///
/// Must be called from within a Tokio runtime. A panic inside the operation
/// is reported as [`TimeoutError::Panicked`].
pub async fn with_timeout<F, T>(operation: F, after: Duration) -> Result<T, TimeoutError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    if after.is_zero() {
        debug!("zero deadline, operation not started");
        return Err(Elapsed::new(after).into());
    }

    let handle = tokio::spawn(operation);

    match tokio::time::timeout(after, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_error)) => match join_error.try_into_panic() {
            Ok(payload) => {
                let message = panic_message(payload.as_ref());
                debug!(%message, "operation panicked");
                Err(TimeoutError::Panicked { message })
            }
            // Only reachable if the runtime is shutting down underneath us.
            Err(_) => Err(Elapsed::new(after).into()),
        },
        Err(_) => {
            debug!(timeout_ms = after.as_millis() as u64, "operation exceeded deadline, detaching");
            Err(Elapsed::new(after).into())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
