use thiserror::Error;

/// Request queue errors
///
/// The queue never inspects an operation's own output, so these only describe
/// what happened to the job around it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The job was dropped before it ran, e.g. because no runtime was
    /// available to drain it or the runtime shut down.
    #[error("Queued request was dropped before completion")]
    Abandoned,

    /// The operation panicked while the queue was running it.
    #[error("Queued request panicked while running")]
    Panicked,
}

/// Queue operation result type
pub type QueueResult<T> = Result<T, QueueError>;
