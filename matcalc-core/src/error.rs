//! Structured errors
//!
//! `MatrixError` is what the parser and the operations return. `CalcError`
//! is the structured form that travels inside `Value::Error` and over the
//! wire: a machine-readable code, a message, an optional suggestion, and
//! the input field the failure came from.

use crate::Shape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const EMPTY_INPUT: &str = "EMPTY_INPUT";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const RAGGED_ROW: &str = "RAGGED_ROW";
    pub const DIMENSION_MISMATCH: &str = "DIMENSION_MISMATCH";
    pub const NOT_SQUARE: &str = "NOT_SQUARE";
    pub const SINGULAR: &str = "SINGULAR";
    pub const INVALID_SCALAR: &str = "INVALID_SCALAR";
    pub const OVERFLOW: &str = "OVERFLOW";
    pub const UNKNOWN_OPERATION: &str = "UNKNOWN_OPERATION";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Error type for parsing and matrix operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("no numeric rows found")]
    EmptyInput,

    #[error("line {line}: '{token}' is not a number")]
    InvalidToken { line: usize, token: String },

    #[error("line {line}: expected {expected} values, found {actual}")]
    RaggedRow { line: usize, expected: usize, actual: usize },

    #[error("{op}: incompatible dimensions {left} and {right}")]
    DimensionMismatch { op: &'static str, left: Shape, right: Shape },

    #[error("{op}: requires a square matrix, got {shape}")]
    NotSquare { op: &'static str, shape: Shape },

    #[error("{op}: matrix is singular")]
    Singular { op: &'static str },

    #[error("'{0}' is not a valid scalar")]
    InvalidScalar(String),

    #[error("{op}: result is too large to represent")]
    Overflow { op: &'static str },
}

/// Entry field a value was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    A,
    B,
    Scalar,
}

impl InputSource {
    /// Human label, as shown next to the entry field
    pub fn label(&self) -> &'static str {
        match self {
            InputSource::A => "matrix A",
            InputSource::B => "matrix B",
            InputSource::Scalar => "scalar",
        }
    }
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Entry field the offending value came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<InputSource>,

    /// Operation being computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// 1-based line in the input text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// Offending token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Structured calculator error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

impl CalcError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set the input field and prefix the message with its label
    pub fn in_input(mut self, input: InputSource) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        if ctx.input.is_none() {
            self.message = format!("{}: {}", input.label(), self.message);
        }
        ctx.input = Some(input);
        self
    }

    /// Builder: set operation context
    pub fn in_operation(mut self, operation: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.operation = Some(operation.into());
        self
    }

    /// Input field the error is attributed to, if any
    pub fn input(&self) -> Option<InputSource> {
        self.context.as_ref().and_then(|c| c.input)
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    // ========== Common Error Constructors ==========

    pub fn unknown_operation(name: &str) -> Self {
        Self::new(codes::UNKNOWN_OPERATION, format!("Unknown operation: {}", name))
            .with_suggestion("Use list_operations to see available operations")
    }

    pub fn arg_count(op: &str, expected: usize, got: usize) -> Self {
        Self::new(codes::ARG_COUNT,
            format!("{}() expects {} arguments, got {}", op, expected, got))
            .with_suggestion(format!("Use help('{}') for usage", op))
    }

    pub fn arg_type(op: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::new(codes::ARG_TYPE,
            format!("{}() argument '{}': expected {}, got {}", op, arg, expected, got))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
    }
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for CalcError {}

impl From<MatrixError> for CalcError {
    fn from(err: MatrixError) -> Self {
        let message = err.to_string();
        match err {
            MatrixError::EmptyInput => Self::new(codes::EMPTY_INPUT, message)
                .with_suggestion("Enter one row per line, values separated by spaces"),
            MatrixError::InvalidToken { line, token } => {
                let mut e = Self::new(codes::INVALID_TOKEN, message)
                    .with_suggestion("Use plain decimal numbers such as 3, -1.5 or 2e3");
                e.context = Some(ErrorContext {
                    line: Some(line),
                    token: Some(token),
                    ..ErrorContext::default()
                });
                e
            }
            MatrixError::RaggedRow { line, .. } => {
                let mut e = Self::new(codes::RAGGED_ROW, message)
                    .with_suggestion("Every row must have the same number of values");
                e.context = Some(ErrorContext {
                    line: Some(line),
                    ..ErrorContext::default()
                });
                e
            }
            MatrixError::DimensionMismatch { op, .. } => Self::new(codes::DIMENSION_MISMATCH, message)
                .with_suggestion(match op {
                    "multiply" | "divide" => "Columns of A must equal rows of B",
                    _ => "Both matrices must have the same number of rows and columns",
                })
                .in_operation(op),
            MatrixError::NotSquare { op, .. } => Self::new(codes::NOT_SQUARE, message)
                .with_suggestion("Use a matrix with as many rows as columns")
                .in_operation(op),
            MatrixError::Singular { op } => Self::new(codes::SINGULAR, message)
                .with_suggestion("The matrix has no inverse; its determinant is zero")
                .in_operation(op),
            MatrixError::Overflow { op } => Self::new(codes::OVERFLOW, message)
                .with_suggestion("Scale the inputs down; results must stay within f64 range")
                .in_operation(op),
            MatrixError::InvalidScalar(_) => Self::new(codes::INVALID_SCALAR, message)
                .with_suggestion("Enter a single real number")
                .in_input(InputSource::Scalar),
        }
    }
}
