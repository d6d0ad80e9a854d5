//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Structural errors raised while parsing a formula
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormulaError {
    /// Nothing left to parse once the leading `=` and whitespace are removed
    #[error("Empty formula")]
    Empty,

    /// A `(` without its `)`, or a `)` without its `(`
    #[error("Unmatched parentheses")]
    UnmatchedParentheses { position: usize },

    /// A binary operator without two operands to combine
    #[error("Operator '{operator}' at position {position} is missing an operand")]
    MissingOperand { operator: String, position: usize },

    /// A call below the function's declared minimum arity
    #[error("Function {function} requires at least {min} arguments, got {actual}")]
    TooFewArguments {
        function: String,
        min: usize,
        actual: usize,
    },

    /// A call above the function's declared maximum arity
    #[error("Function {function} accepts at most {max} arguments, got {actual}")]
    TooManyArguments {
        function: String,
        max: usize,
        actual: usize,
    },

    /// Two operands inside a call with no operator or separator between them
    #[error("Missing operator or ',' between arguments of {function}")]
    MissingOperator { function: String },

    /// The token stream did not reduce to a single expression
    #[error("Invalid formula structure: expected a single expression, found {operands}")]
    InvalidStructure { operands: usize },
}
