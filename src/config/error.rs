use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the layered config store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key is absent from both tiers.
    #[error("Missing configuration value [{section}] {key}")]
    Missing { section: String, key: String },

    /// Reading or writing a config file failed.
    #[error("Config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid INI text.
    #[error("Failed parsing {} at line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A section or key name that cannot be written back as INI.
    #[error("Invalid config name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl ConfigError {
    pub(super) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template placeholder '{{{0}}}' has no value")]
    MissingKey(String),

    #[error("Unmatched brace at position {position} in template")]
    UnmatchedBrace { position: usize },

    #[error("Unsupported template placeholder '{0}'")]
    Unsupported(String),
}
