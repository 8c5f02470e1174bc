//! Lead capture

pub mod service;

pub use service::LeadService;
