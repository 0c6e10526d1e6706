//! Core error types for standup-core.
//!
//! Construction problems are fatal (`InvalidConfiguration`); persistence
//! problems are surfaced as [`StoreError`] and, inside the engine, are
//! downgraded to warnings so the timing state never depends on the store.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for standup-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Persistence-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`KvStore`](crate::storage::KvStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be read
    #[error("Failed to read '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// The backend refused or failed a write
    #[error("Failed to write '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// The stored value exists but is not a list of timestamps
    #[error("Corrupt value for '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Database could not be opened
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
