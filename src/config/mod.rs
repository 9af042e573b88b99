//! Layered configuration for crutool.
//!
//! This module provides the two-tier configuration store:
//! - Packaged defaults read from an INI file next to the executable
//! - A per-user INI file that shadows the defaults and is the only tier written
//! - Reversible escaping of stored values
//! - Named-placeholder templates kept in the config itself

mod constants;
mod environment;
mod error;
mod escape;
mod ini;
mod paths;
mod store;
mod template;

// Re-export the main types for convenience
pub use error::{ConfigError, TemplateError};
pub use paths::ConfigPaths;
pub use store::ConfigStore;

#[cfg(test)]
mod tests;
