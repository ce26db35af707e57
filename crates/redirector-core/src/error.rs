//! Error types for Redirector Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid stack path: {0}")]
    InvalidStackPath(String),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
