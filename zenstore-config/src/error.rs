//! Errors raised while loading a configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced by the [`crate::loader`] functions.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration from {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The document is not valid JSON or contains unknown keys.
    #[error("failed to parse zenstore configuration from {origin}: {source}")]
    Parse {
        /// File path, or `<string>` for in-memory documents.
        origin: String,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// An environment variable expected to hold a boolean held something else.
    #[error("invalid value for {variable}: expected a boolean, got `{value}`")]
    InvalidBoolean {
        /// Variable that was read.
        variable: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A group path has an empty segment.
    #[error("invalid group path `{group}`: segments cannot be empty")]
    InvalidGroupPath {
        /// Rejected path.
        group: String,
    },
}
