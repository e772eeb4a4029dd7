//! Error types for the persistence crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for loading, saving and session operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The graph rejected an edit or a reconstruction
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] conceptdag_graph::Error),

    /// I/O error while reading or writing module files
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(conceptdag::persist::io),
        help("Check file permissions and ensure the storage directory exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "create")
        operation: String,
    },

    /// Stored data could not be encoded or decoded
    #[error("Serialization error: {message}")]
    #[diagnostic(code(conceptdag::persist::serialization))]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },

    /// Configuration file is missing required structure or malformed
    #[error("Configuration error: {message}")]
    #[diagnostic(code(conceptdag::persist::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, Error>;
