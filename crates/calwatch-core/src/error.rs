//! Core error types for calwatch-core.
//!
//! A single `WatchError` covers every stage of a notification run so
//! the orchestrator can catch once at its boundary and report the
//! failure to the alert channel.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for calwatch-core.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Store-related errors (checkpoints, snapshots, properties)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Calendar fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport-level HTTP errors that escape the muted dispatch path
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Store-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Calendar fetch errors.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The stored sync token was rejected by the provider
    #[error("Sync token expired for calendar '{calendar_id}'")]
    TokenExpired { calendar_id: String },

    /// The provider returned an error payload
    #[error("Calendar API error: {0}")]
    Api(String),

    /// The response body did not have the expected shape
    #[error("Malformed calendar response: {0}")]
    Malformed(String),

    /// No access token available for the provider
    #[error("Not authenticated with the calendar provider")]
    NotAuthenticated,
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
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for WatchError {
    fn from(err: rusqlite::Error) -> Self {
        WatchError::Store(err.into())
    }
}

/// Result type alias for WatchError
pub type Result<T, E = WatchError> = std::result::Result<T, E>;
