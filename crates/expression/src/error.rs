//! Error types for expression parsing and evaluation

use thiserror::Error;

/// Expression evaluation and parsing errors
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ExpressionError {
    /// Syntax error while tokenizing an expression
    #[error("Expression syntax error: {message}")]
    SyntaxError { message: String },

    /// Error while parsing tokens into an AST
    #[error("Expression parse error: {message}")]
    ParseError { message: String },

    /// Error while evaluating a parsed AST
    #[error("Expression evaluation error: {message}")]
    EvalError { message: String },

    /// A value did not have the expected type
    #[error("Type error: expected {expected}, found {actual}")]
    TypeError { expected: String, actual: String },

    /// A `$variable` reference could not be resolved
    #[error("Variable '{name}' not found")]
    VariableNotFound { name: String },

    /// A builtin function name is not registered
    #[error("Function '{name}' not found")]
    FunctionNotFound { name: String },

    /// A builtin function received a bad argument
    #[error("Invalid argument for {function}: {message}")]
    InvalidArgument { function: String, message: String },

    /// Division or modulo by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Regex pattern compilation or matching failure
    #[error("Regex error: {message}")]
    RegexError { message: String },

    /// Array index access out of range
    #[error("Index out of bounds: index {index} is out of range for array of length {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    /// JSON (de)serialization error surfaced through conversion builtins
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExpressionError {
    /// Error code for categorization by callers (logging, metrics).
    pub fn code(&self) -> &'static str {
        match self {
            Self::SyntaxError { .. } => "EXPR:SYNTAX",
            Self::ParseError { .. } => "EXPR:PARSE",
            Self::EvalError { .. } => "EXPR:EVAL",
            Self::TypeError { .. } => "EXPR:TYPE",
            Self::VariableNotFound { .. } => "EXPR:VAR_NOT_FOUND",
            Self::FunctionNotFound { .. } => "EXPR:FUNC_NOT_FOUND",
            Self::InvalidArgument { .. } => "EXPR:INVALID_ARG",
            Self::DivisionByZero => "EXPR:DIV_ZERO",
            Self::RegexError { .. } => "EXPR:REGEX",
            Self::IndexOutOfBounds { .. } => "EXPR:INDEX_OOB",
            Self::Json(_) => "EXPR:JSON",
        }
    }

    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::SyntaxError {
            message: message.into(),
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn eval_error(message: impl Into<String>) -> Self {
        Self::EvalError {
            message: message.into(),
        }
    }

    pub fn type_error(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeError {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound { name: name.into() }
    }

    pub fn function_not_found(name: impl Into<String>) -> Self {
        Self::FunctionNotFound { name: name.into() }
    }

    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }

    pub fn division_by_zero() -> Self {
        Self::DivisionByZero
    }

    pub fn regex_error(message: impl Into<String>) -> Self {
        Self::RegexError {
            message: message.into(),
        }
    }

    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Extension trait for creating expression errors using `expression_*` method
/// names, so call sites read the same whether they're constructing a
/// syntax error, a type error, or an eval error.
pub trait ExpressionErrorExt {
    fn expression_syntax_error(message: impl Into<String>) -> Self;
    fn expression_parse_error(message: impl Into<String>) -> Self;
    fn expression_eval_error(message: impl Into<String>) -> Self;
    fn expression_type_error(expected: impl Into<String>, found: impl Into<String>) -> Self;
    fn expression_variable_not_found(name: impl Into<String>) -> Self;
    fn expression_function_not_found(name: impl Into<String>) -> Self;
    fn expression_invalid_argument(
        function: impl Into<String>,
        message: impl Into<String>,
    ) -> Self;
    fn expression_division_by_zero() -> Self;
    fn expression_regex_error(message: impl Into<String>) -> Self;
    fn expression_index_out_of_bounds(index: usize, len: usize) -> Self;
}

impl ExpressionErrorExt for ExpressionError {
    fn expression_syntax_error(message: impl Into<String>) -> Self {
        Self::syntax_error(message)
    }

    fn expression_parse_error(message: impl Into<String>) -> Self {
        Self::parse_error(message)
    }

    fn expression_eval_error(message: impl Into<String>) -> Self {
        Self::eval_error(message)
    }

    fn expression_type_error(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::type_error(expected, found)
    }

    fn expression_variable_not_found(name: impl Into<String>) -> Self {
        Self::variable_not_found(name)
    }

    fn expression_function_not_found(name: impl Into<String>) -> Self {
        Self::function_not_found(name)
    }

    fn expression_invalid_argument(
        function: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::invalid_argument(function, message)
    }

    fn expression_division_by_zero() -> Self {
        Self::division_by_zero()
    }

    fn expression_regex_error(message: impl Into<String>) -> Self {
        Self::regex_error(message)
    }

    fn expression_index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::index_out_of_bounds(index, len)
    }
}
