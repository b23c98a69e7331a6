//! matcalc Core - Fundamental types
//!
//! This crate provides the core types used throughout matcalc:
//! - `Matrix`: immutable dense real matrix
//! - `Value`: operation results (matrix, scalar or error)
//! - `MatrixError` / `CalcError`: typed and structured errors
//! - `parse_matrix` / `parse_scalar`: strict text input parsing

mod matrix;
mod parse;
mod value;
mod error;

pub use matrix::{Matrix, Shape};
pub use parse::{parse_matrix, parse_scalar};
pub use value::Value;
pub use error::{MatrixError, CalcError, ErrorContext, InputSource, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Matrix, Shape, Value, MatrixError, CalcError, InputSource};
    pub use crate::error::codes;
}
