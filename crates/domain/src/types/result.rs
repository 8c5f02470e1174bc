//! Result shapes exchanged with callers and with the remote store

use std::fmt;

use serde::{Deserialize, Serialize};

/// Uniform outcome of every resilient pipeline call.
///
/// When `error` is present `data` is absent. A successful call may still carry
/// no data (an insert that returns no rows), so `data` alone does not signal
/// success; use [`ResilientResult::is_success`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResilientResult<T> {
    data: Option<T>,
    error: Option<String>,
}

impl<T> ResilientResult<T> {
    pub fn success(data: Option<T>) -> Self {
        Self { data, error: None }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self { data: None, error: Some(message.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Convert into a standard `Result`, the error side being the user message.
    pub fn into_result(self) -> Result<Option<T>, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self.data),
        }
    }

    pub fn map<U, F>(self, f: F) -> ResilientResult<U>
    where
        F: FnOnce(T) -> U,
    {
        ResilientResult { data: self.data.map(f), error: self.error }
    }
}

/// Logical error reported by the remote store.
///
/// Field names follow the PostgREST error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl StoreError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into(), code: None, details: None, hint: None }
    }

    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// `{ data, error }` pair answered by the remote store's insert call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse<T> {
    pub data: Option<T>,
    pub error: Option<StoreError>,
}

impl<T> StoreResponse<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self { data, error: None }
    }

    pub fn err(error: StoreError) -> Self {
        Self { data: None, error: Some(error) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_never_carries_data() {
        let result: ResilientResult<u32> = ResilientResult::failure("nope");
        assert!(!result.is_success());
        assert_eq!(result.data(), None);
        assert_eq!(result.error(), Some("nope"));
        assert_eq!(result.into_result(), Err("nope".to_string()));
    }

    #[test]
    fn success_may_have_no_data() {
        let result: ResilientResult<u32> = ResilientResult::success(None);
        assert!(result.is_success());
        assert_eq!(result.into_result(), Ok(None));
    }

    #[test]
    fn serializes_as_data_error_pair() {
        let result = ResilientResult::success(Some(7));
        assert_eq!(serde_json::to_value(&result).unwrap(), serde_json::json!({"data": 7, "error": null}));
    }

    #[test]
    fn store_error_parses_postgrest_body() {
        let body = r#"{"code":"23505","details":"Key (email)=(a@b.c) already exists.","hint":null,"message":"duplicate key value violates unique constraint"}"#;
        let error: StoreError = serde_json::from_str(body).unwrap();
        assert_eq!(error.code.as_deref(), Some("23505"));
        assert!(error.message.starts_with("duplicate key"));
        assert_eq!(error.hint, None);
    }
}
