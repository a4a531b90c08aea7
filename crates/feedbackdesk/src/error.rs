//! Error types for feedbackdesk.
//!
//! This module defines all error types used throughout the feedbackdesk crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for feedbackdesk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Backend Errors ===
    /// The HTTP request to the hosted backend failed before a response arrived.
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The hosted backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the backend.
        message: String,
    },

    /// The backend endpoint or access key is missing from the configuration.
    #[error("backend is not configured (missing url or anon_key)")]
    BackendUnconfigured,

    /// The backend returned a row that does not map onto a record.
    #[error("malformed row from backend: {0}")]
    MalformedRow(String),

    // === Local Storage Errors ===
    /// Failed to open or create the local database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A local database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    // === Record Errors ===
    /// A submitted record failed validation.
    #[error("invalid submission: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// An unknown priority value was encountered.
    #[error("unknown priority '{0}' (expected low, medium or high)")]
    UnknownPriority(String),

    // === Access Errors ===
    /// A mutating operation was attempted in read-only mode.
    #[error("operation requires admin mode")]
    NotPermitted,

    /// The elevation flag could not be persisted.
    #[error("failed to persist session state at {path}: {source}")]
    SessionPersist {
        /// Path of the session state file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Export Errors ===
    /// There were no records to export.
    #[error("nothing to export")]
    NothingToExport,

    /// Writing the spreadsheet failed.
    #[error("spreadsheet export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for feedbackdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new backend error from a status code and response body.
    #[must_use]
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Create a new malformed row error.
    #[must_use]
    pub fn malformed_row(message: impl Into<String>) -> Self {
        Self::MalformedRow(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error comes from a missing backend configuration.
    #[must_use]
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, Self::BackendUnconfigured)
    }

    /// Check if this error is an access gate refusal.
    #[must_use]
    pub fn is_not_permitted(&self) -> bool {
        matches!(self, Self::NotPermitted)
    }

    /// Check if this error is a submission validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
