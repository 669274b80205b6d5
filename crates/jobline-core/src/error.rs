//! Error types for the jobline-core library.

use thiserror::Error;

/// Main error type for the jobline library.
#[derive(Error, Debug)]
pub enum JoblineError {
    /// Configuration could not be loaded or compiled.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dataset reconciliation error.
    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading or compiling configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configured boilerplate pattern is not a valid regex.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A vocabulary that the extraction chains depend on is empty.
    #[error("{0} must not be empty")]
    EmptyVocabulary(&'static str),

    /// A numeric setting is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// A dotted key names no setting.
    #[error("unknown configuration key {0}")]
    UnknownKey(String),
}

/// Errors related to dataset merging and resampling.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Oversampling ratio must lie strictly between 0 and 1.
    #[error("target ratio must be in (0, 1), got {0}")]
    InvalidRatio(f64),
}

/// Result type for the jobline library.
pub type Result<T> = std::result::Result<T, JoblineError>;
