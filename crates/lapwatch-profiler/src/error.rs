//! Error types for the profiler.

use thiserror::Error;

use crate::record::TimerId;

/// Lookup failures reported by profiler operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfilerError {
    /// No timer was ever created with this id.
    #[error("Timer not found: {0}")]
    TimerNotFound(TimerId),

    /// No timer was ever created under this type.
    #[error("Timer type not found: {0:?}")]
    TypeNotFound(String),
}

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, ProfilerError>;

/// Configuration loading failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Name of the environment variable.
        var: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}
