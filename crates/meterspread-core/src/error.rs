//! Core error types for meterspread-core.
//!
//! This module defines the error hierarchy using thiserror. The public
//! `distribute` entry point maps every `DistributionError` to an empty result;
//! `try_distribute` surfaces the variant.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for meterspread-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Distribution request could not be computed
    #[error("Distribution error: {0}")]
    Distribution(#[from] DistributionError),

    /// Adaptive weight memory errors
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

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

/// Reasons a distribution request produces no result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    /// Bucket count was zero
    #[error("Invalid number of divisions: {bucket_count} (must be greater than zero)")]
    InvalidDivisions { bucket_count: usize },

    /// End reading is below the start reading
    #[error("Invalid range: end value ({end}) must not be lower than start value ({start})")]
    InvalidRange { start: f64, end: f64 },

    /// Precision beyond what the engine quantizes reliably
    #[error("Invalid precision: {precision} (maximum is {max})")]
    InvalidPrecision { precision: u32, max: u32 },

    /// Non-finite readings or a total too large to count in steps
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    /// Every raw weight was zero; recovered internally with a uniform split
    #[error("All bucket weights were zero")]
    DegenerateWeights,

    /// The overshoot correction hit its iteration cap before settling
    #[error("Reconciliation stopped after {iterations} iterations with {remaining_steps} steps unsettled")]
    ReconciliationExhausted {
        iterations: usize,
        remaining_steps: i64,
    },
}

/// Adaptive weight memory errors.
#[derive(Error, Debug)]
pub enum MemoryError {
    /// Backing store failed
    #[error("Store failure: {0}")]
    Store(#[from] DatabaseError),

    /// Stored record could not be decoded
    #[error("Corrupt memory record under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Record could not be encoded
    #[error("Failed to encode memory record: {0}")]
    Encode(#[source] serde_json::Error),

    /// Hour outside 0..=23
    #[error("Hour {0} is outside 0..=23")]
    InvalidHour(u8),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),

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

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
