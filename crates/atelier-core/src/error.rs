//! Error types for atelier-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in atelier-core
#[derive(Debug, Error)]
pub enum Error {
    /// Column key does not match the allowed pattern
    #[error("Invalid column key: {0}")]
    InvalidColumnKey(String),

    /// Two columns share the same key
    #[error("Duplicate column key: {0}")]
    DuplicateColumnKey(String),

    /// Column lookup by key failed
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A formula column was declared without an expression
    #[error("Formula column '{0}' has no expression")]
    MissingFormula(String),

    /// A non-formula column carries an expression
    #[error("Column '{0}' is not a formula column but has an expression")]
    UnexpectedFormula(String),

    /// Invalid value type for operation
    #[error("Invalid value type: expected {expected}, got {actual}")]
    InvalidValueType {
        expected: &'static str,
        actual: &'static str,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
