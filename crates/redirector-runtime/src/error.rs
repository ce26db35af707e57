//! Runtime error types

use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Model pieces that cannot be combined into a redirector
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
