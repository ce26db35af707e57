//! SDK error types

use crate::pipeline::ValidationReport;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parser error
    #[error("Parser error: {0}")]
    ParseError(#[from] redirector_parser::ParseError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] redirector_runtime::RuntimeError),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(#[from] redirector_repository::RepositoryError),

    /// A model piece needed to build an engine is missing
    #[error("Model incomplete: missing {0}")]
    ModelIncomplete(&'static str),

    /// A pipeline chain stopped at a failing task
    #[error("Chain '{chain}' failed: {report}")]
    ChainFailed {
        chain: &'static str,
        report: ValidationReport,
    },

    /// No engine has been published yet
    #[error("Engine not initialized")]
    NotInitialized,
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

impl SdkError {
    /// Report carried by a failed chain, if any
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            SdkError::ChainFailed { report, .. } => Some(report),
            _ => None,
        }
    }
}
