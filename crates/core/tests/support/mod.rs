//! Shared test helpers for `leadpipe-core` integration tests.
//!
//! These helpers provide a scriptable in-memory store so that executor,
//! telemetry and lead tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod store;
