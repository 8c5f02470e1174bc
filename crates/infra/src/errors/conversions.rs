//! Conversions from external infrastructure errors into domain errors.

use std::time::Duration;

use leadpipe_domain::{LeadpipeError, PipelineFailure};
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LeadpipeError);

impl From<InfraError> for LeadpipeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LeadpipeError> for InfraError {
    fn from(value: LeadpipeError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLeadpipeError {
    fn into_leadpipe(self) -> LeadpipeError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LeadpipeError */
/* -------------------------------------------------------------------------- */

impl IntoLeadpipeError for HttpError {
    fn into_leadpipe(self) -> LeadpipeError {
        if self.is_builder() {
            return LeadpipeError::Config(format!("invalid HTTP client setup: {self}"));
        }

        if self.is_timeout() {
            return LeadpipeError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return LeadpipeError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                400..=499 => LeadpipeError::InvalidInput(message),
                _ => LeadpipeError::Network(message),
            };
        }

        if self.is_decode() {
            return LeadpipeError::Serialization(self.to_string());
        }

        LeadpipeError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_leadpipe())
    }
}

/* -------------------------------------------------------------------------- */
/* toml / serde_json → LeadpipeError */
/* -------------------------------------------------------------------------- */

impl IntoLeadpipeError for TomlError {
    fn into_leadpipe(self) -> LeadpipeError {
        LeadpipeError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_leadpipe())
    }
}

impl IntoLeadpipeError for JsonError {
    fn into_leadpipe(self) -> LeadpipeError {
        if self.is_io() {
            LeadpipeError::Internal(format!("JSON I/O failure: {self}"))
        } else {
            LeadpipeError::Serialization(format!("Invalid JSON: {self}"))
        }
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_leadpipe())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PipelineFailure */
/* -------------------------------------------------------------------------- */

/// Classify a transport error raised while talking to the remote store.
///
/// `deadline` is the client timeout, reported when the request timed out.
pub(crate) fn transport_failure(err: &HttpError, deadline: Duration) -> PipelineFailure {
    if err.is_timeout() {
        return PipelineFailure::timeout(deadline);
    }
    if err.is_connect() || err.is_request() {
        return PipelineFailure::network(err.to_string());
    }
    if err.is_decode() || err.is_body() {
        return PipelineFailure::unknown(format!("failed to read store response: {err}"));
    }
    PipelineFailure::unknown(err.to_string())
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
