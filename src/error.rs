//! Error types for loading, reading and writing people schema annotations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors in externally supplied annotation data.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("column {index} is a string: a list of column groups is expected, not a list of field names")]
    FlatColumns { index: usize },

    #[error("invalid annotation at {path}: expected {expected}, got {actual}")]
    InvalidType {
        path: String,
        expected: &'static str,
        actual: String,
    },
}

/// Errors while loading or saving model documents.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot write model: {message}")]
    WriteError { message: String },

    // Parse errors (exit code 2)
    #[error("invalid XML: {source}")]
    InvalidXml {
        #[source]
        source: xmltree::ParseError,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    InvalidAnnotations(#[from] AnnotationError),
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. }
            | LoadError::ReadError { .. }
            | LoadError::WriteError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}
