//! Core error types for questmaster-core.
//!
//! Every failure is recoverable: the session keeps running and the caller
//! decides whether to surface the error or ignore it.

use std::path::PathBuf;
use thiserror::Error;

use crate::quiz::QuizError;

/// Core error type for questmaster-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or invalid user input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Operation referenced an unknown task or achievement
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// Snapshot read/write failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Malformed export bundle
    #[error("Import error: {0}")]
    ImportFormat(#[from] ImportFormatError),

    /// Quiz operation invoked in the wrong state
    #[error("Quiz error: {0}")]
    Quiz(#[from] QuizError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Companion backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was blank
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// An account with this email already exists
    #[error("User already exists: {0}")]
    DuplicateAccount(String),

    /// Email/password pair did not match
    #[error("Invalid email or password")]
    InvalidCredentials,
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Lookup of an unknown task id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("task not found: {id}")]
pub struct NotFoundError {
    pub id: String,
}

impl NotFoundError {
    pub fn task(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Persistence-specific errors.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read or write against the store failed
    #[error("Store query failed: {0}")]
    QueryFailed(String),

    /// A record could not be encoded
    #[error("Failed to encode record '{key}': {message}")]
    Encode { key: String, message: String },

    /// Could not resolve the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        PersistenceError::QueryFailed(err.to_string())
    }
}

/// Malformed import bundle. Nothing is applied when this is returned.
#[derive(Error, Debug)]
pub enum ImportFormatError {
    /// Not valid JSON at all
    #[error("Invalid backup file: {0}")]
    Syntax(#[source] serde_json::Error),

    /// Top level is not an object
    #[error("Invalid backup file: expected a JSON object")]
    NotAnObject,

    /// A present record has the wrong shape
    #[error("Invalid backup file: field '{field}' is malformed: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Two tasks share an id
    #[error("Invalid backup file: task id '{0}' appears more than once")]
    DuplicateTaskId(String),
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
}

/// Companion backend errors.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Base URL could not be parsed or joined
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with an error status
    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
