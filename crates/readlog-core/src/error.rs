//! Core error types for readlog-core.
//!
//! One thiserror hierarchy per failure domain, rolled up into
//! [`CoreError`] for callers that don't care which layer failed.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for readlog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session store or key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Timer state errors
    #[error("Timer state error: {0}")]
    State(#[from] StateError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the session store and the durable key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    /// Malformed base URL or endpoint path
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Local database failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Errors around the timer's own state.
#[derive(Error, Debug)]
pub enum StateError {
    /// Persisted blob exists but does not decode into a valid timer state
    #[error("Persisted timer state failed to decode: {0}")]
    Corrupt(String),

    /// `submit` called before the minimum elapsed time was reached
    #[error("Session too short to submit: {elapsed_secs}s elapsed, {min_secs}s required")]
    SubmitBelowMinimum { elapsed_secs: i64, min_secs: i64 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not name a known configuration field
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value does not parse for the named key
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home directory could not be determined
    #[error("Could not locate the user home directory")]
    NoHomeDir,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
