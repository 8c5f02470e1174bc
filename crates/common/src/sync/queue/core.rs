use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::errors::{QueueError, QueueResult};
use super::metrics::{QueueMetrics, QueueMetricsSnapshot};
use super::types::{JobOutcome, Priority};

type Job = BoxFuture<'static, JobOutcome>;

struct QueueState {
    pending: VecDeque<Job>,
    draining: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    metrics: QueueMetrics,
}

/// Serialized request queue
///
/// Operations run strictly one at a time in list order. `Normal` requests
/// are appended, `High` requests are inserted at the front. A drain task is
/// spawned on the current Tokio runtime when the first request arrives and
/// exits once the list is empty.
///
/// ## Ordering
///
/// Insertion happens synchronously inside [`RequestQueue::enqueue`], so the
/// relative order of requests is fixed by the order of `enqueue` calls, not
/// by when their tickets are first polled. A request that is already running
/// is never preempted.
///
/// ## Failure isolation
///
/// An operation's output (including an `Err`) is handed back through its
/// ticket untouched. A panicking operation resolves its ticket with
/// [`QueueError::Panicked`] and the drain moves on to the next request.
#[derive(Clone)]
pub struct RequestQueue {
    shared: Arc<Shared>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState { pending: VecDeque::new(), draining: false }),
                metrics: QueueMetrics::new(),
            }),
        }
    }

    /// Add `operation` to the queue and return a ticket for its output.
    ///
    /// Dropping the ticket does not remove the request; it still runs in
    /// turn and its output is discarded.
    pub fn enqueue<F, T>(&self, operation: F, priority: Priority) -> QueueTicket<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();

        let job: Job = Box::pin(async move {
            let (outcome, result) = match AssertUnwindSafe(operation).catch_unwind().await {
                Ok(value) => (JobOutcome::Completed, Ok(value)),
                Err(_) => (JobOutcome::Panicked, Err(QueueError::Panicked)),
            };
            // The caller may have dropped its ticket.
            let _ = sender.send(result);
            outcome
        });

        let start_drain = {
            let mut state = self.shared.state.lock();
            match priority {
                Priority::High => state.pending.push_front(job),
                Priority::Normal => state.pending.push_back(job),
            }
            self.shared.metrics.record_enqueue(priority, state.pending.len());

            if state.draining {
                false
            } else {
                state.draining = true;
                true
            }
        };

        debug!(%priority, "request enqueued");

        if start_drain {
            self.spawn_drain();
        }

        QueueTicket { receiver }
    }

    fn spawn_drain(&self) {
        match Handle::try_current() {
            Ok(handle) => {
                self.shared.metrics.record_drain_started();
                handle.spawn(drain(self.shared.clone()));
            }
            Err(_) => {
                let dropped = {
                    let mut state = self.shared.state.lock();
                    state.draining = false;
                    std::mem::take(&mut state.pending)
                };
                self.shared.metrics.record_abandoned(dropped.len());
                warn!(dropped = dropped.len(), "no Tokio runtime available, abandoning queued requests");
            }
        }
    }

    /// Number of requests waiting to start.
    pub fn len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a drain task currently owns the queue.
    pub fn is_draining(&self) -> bool {
        self.shared.state.lock().draining
    }

    pub fn metrics(&self) -> QueueMetricsSnapshot {
        self.shared.metrics.snapshot()
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("RequestQueue")
            .field("pending", &state.pending.len())
            .field("draining", &state.draining)
            .finish()
    }
}

/// Releases the draining flag if the drain task is dropped mid-run, so the
/// next enqueue can start a fresh drain.
struct DrainGuard {
    shared: Arc<Shared>,
    finished: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.shared.state.lock().draining = false;
        }
    }
}

async fn drain(shared: Arc<Shared>) {
    let mut guard = DrainGuard { shared, finished: false };

    loop {
        let job = {
            let mut state = guard.shared.state.lock();
            match state.pending.pop_front() {
                Some(job) => {
                    guard.shared.metrics.record_start(state.pending.len());
                    job
                }
                None => {
                    state.draining = false;
                    guard.finished = true;
                    break;
                }
            }
        };

        match job.await {
            JobOutcome::Completed => guard.shared.metrics.record_completion(),
            JobOutcome::Panicked => {
                guard.shared.metrics.record_panic();
                warn!("queued request panicked, continuing with next request");
            }
        }
    }

    debug!("request queue drained");
}

/// Handle to the eventual output of a queued request.
#[derive(Debug)]
#[must_use = "dropping a ticket discards the request's output"]
pub struct QueueTicket<T> {
    receiver: oneshot::Receiver<QueueResult<T>>,
}

impl<T> Future for QueueTicket<T> {
    type Output = QueueResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| match received {
            Ok(result) => result,
            Err(_) => Err(QueueError::Abandoned),
        })
    }
}
