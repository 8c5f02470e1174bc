//! HTTP client used by the REST adapters

mod client;

pub use client::{HttpClient, HttpClientBuilder, USER_AGENT};
