//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Requested document does not exist in the source
    #[error("Document not found: {entity} for '{app}'")]
    NotFound { app: String, entity: String },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Parser error from redirector-parser
    #[error("Parser error: {0}")]
    Parser(String),

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Source could not be reached
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<redirector_parser::ParseError> for RepositoryError {
    fn from(err: redirector_parser::ParseError) -> Self {
        RepositoryError::Parser(err.to_string())
    }
}

impl RepositoryError {
    pub(crate) fn not_found(app: &str, entity: impl std::fmt::Display) -> Self {
        RepositoryError::NotFound {
            app: app.to_string(),
            entity: entity.to_string(),
        }
    }
}
