//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during expression parsing or evaluation
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Expression parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Expression evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,
}
