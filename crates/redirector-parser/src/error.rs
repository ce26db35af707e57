//! Parser error types

use redirector_core::CoreError;
use thiserror::Error;

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Structurally invalid expression (wrong child count, misplaced node)
    #[error("Invalid expression '{tag}': {message}")]
    InvalidExpression { tag: String, message: String },

    /// Rule without a return value after climbing nested rules
    #[error("Rule '{0}' has no return value")]
    MissingReturn(String),

    /// Rule returning the wrong kind of value for its rule set
    #[error("Rule '{rule}' must return {expected}")]
    UnexpectedReturn { rule: String, expected: String },

    /// Reference to a namespaced list that does not exist
    #[error("Unknown namespaced list: {0}")]
    UnknownNamespacedList(String),

    /// Invalid distribution
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// Core model error
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
