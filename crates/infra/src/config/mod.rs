//! Configuration loading and management
//!
//! This module provides utilities for loading application configuration
//! from environment variables, a `.env` file and config files.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, discover_config_paths};
