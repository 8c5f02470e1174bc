use std::time::Duration;

use leadpipe_domain::LeadpipeError;
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// `command` is a logical identifier such as `"leads::submit_lead"` and must
/// not carry user data.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, "command_execution_failure");
    }
}

/// Convert a `LeadpipeError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &LeadpipeError) -> &'static str {
    match error {
        LeadpipeError::Config(_) => "config",
        LeadpipeError::Network(_) => "network",
        LeadpipeError::Serialization(_) => "serialization",
        LeadpipeError::InvalidInput(_) => "invalid_input",
        LeadpipeError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(error_label(&LeadpipeError::Config("x".into())), "config");
        assert_eq!(error_label(&LeadpipeError::Internal("x".into())), "internal");
    }
}
