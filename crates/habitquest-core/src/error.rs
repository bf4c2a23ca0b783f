//! Core error types for habitquest-core.
//!
//! This module defines the error hierarchy using thiserror. The engine
//! distinguishes malformed caller input, corrupted snapshot state and
//! informational catalog mismatches; configuration and file errors only
//! come from the explicit loading helpers.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitquest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed caller input (timestamp, week key, activity record, catalog entry)
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The state snapshot violates an engine invariant
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The event selected for a week differs from the one already recorded.
    /// Informational only: the recorded entry always wins.
    #[error("Catalog mismatch for week {week}: recorded '{recorded}', selected '{selected}'")]
    CatalogMismatch {
        week: String,
        recorded: String,
        selected: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors (custom catalogs)
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl CoreError {
    /// Whether the caller must abort the current operation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CoreError::CatalogMismatch { .. })
    }

    pub(crate) fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::InvalidInput(ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        })
    }
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not determine or create the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Timestamp outside the representable calendar range
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// Week key that is empty or not of the form `YYYY-Www`
    #[error("Malformed week key '{0}', expected YYYY-Www")]
    MalformedWeekKey(String),

    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Duplicate identifier inside a catalog
    #[error("Duplicate id '{id}' in {collection}")]
    DuplicateId { collection: String, id: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
