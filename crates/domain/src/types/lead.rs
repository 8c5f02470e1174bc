//! Lead submissions captured by the contact form

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which call-to-action produced the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    Strategy,
    Pilot,
}

impl SubmissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strategy => "strategy",
            Self::Pilot => "pilot",
        }
    }
}

impl fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lead row as inserted into the `leads` table.
///
/// Field values are expected to be normalized by the caller; the pipeline
/// does not validate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub company: String,
    pub business_type: String,
    pub phone: String,
    #[serde(default)]
    pub message: String,
    pub submission_type: SubmissionType,
}
