//! Error types for project configuration operations.
//!
//! Rule parse failures are not errors; they are reported through
//! [`crate::TransformErrors`]. These variants cover store access and
//! invalid project metadata.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for project configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Section that failed validation.
        section: String,
        /// Field that failed validation.
        field: String,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Database kind value was not recognised.
    #[error("invalid database kind")]
    InvalidDatabaseKind {
        /// Database kind payload provided by the caller.
        value: String,
    },
    /// No project with the requested identifier exists in the store.
    #[error("project not found")]
    ProjectNotFound {
        /// Requested project identifier.
        id: String,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// JSON encoding or decoding of a stored document failed.
    #[error("json document operation failed")]
    Json {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source serde error.
        source: serde_json::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
