//! Transient-failure classification for the resilient executor

use leadpipe_common::resilience::{Elapsed, RetryDecision, RetryPolicy};
use leadpipe_domain::{PipelineFailure, StoreError};

/// Retries network and timeout failures, plus backend or unknown failures
/// whose message mentions a transport problem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientFailurePolicy;

impl RetryPolicy<PipelineFailure> for TransientFailurePolicy {
    fn should_retry(&self, error: &PipelineFailure, _attempt: u32) -> RetryDecision {
        if error.is_retryable() {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

/// Wrap a logical store error as a backend failure.
pub fn backend_failure(error: StoreError) -> PipelineFailure {
    PipelineFailure::backend(error.message, error.code)
}

/// Timeout failure carrying the exceeded deadline.
pub fn timeout_failure(elapsed: Elapsed) -> PipelineFailure {
    PipelineFailure::timeout(elapsed.after())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn classifier_boundary() {
        let policy = TransientFailurePolicy;
        let cases = [
            (PipelineFailure::network("connection reset"), RetryDecision::Retry),
            (PipelineFailure::timeout(Duration::from_secs(10)), RetryDecision::Retry),
            (PipelineFailure::backend("Failed to fetch", None), RetryDecision::Retry),
            (PipelineFailure::backend("duplicate key", Some("23505".into())), RetryDecision::Stop),
            (PipelineFailure::unknown("NetworkError when attempting to fetch"), RetryDecision::Retry),
            (PipelineFailure::unknown("boom"), RetryDecision::Stop),
            (PipelineFailure::validation("email", "invalid"), RetryDecision::Stop),
        ];

        for (failure, expected) in cases {
            assert_eq!(policy.should_retry(&failure, 0), expected, "{failure}");
        }
    }

    #[test]
    fn backend_failure_keeps_code_and_fixed_user_message() {
        let failure = backend_failure(StoreError::new("duplicate key").with_code("23505"));
        assert_eq!(failure.code(), Some("23505"));
        assert_eq!(failure.user_message(), "Unable to complete the request. Please try again.");
    }

    #[test]
    fn timeout_failure_keeps_deadline() {
        let failure = timeout_failure(Elapsed::new(Duration::from_millis(250)));
        assert_eq!(failure, PipelineFailure::timeout(Duration::from_millis(250)));
    }
}
