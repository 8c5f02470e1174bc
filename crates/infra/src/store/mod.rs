//! Remote store adapters

mod rest;

pub use rest::RestStore;
