//! Helper functions for matrix operations

use matcalc_core::{Matrix, MatrixError, Value, CalcError};

/// Extract a Matrix from a Value. An error value propagates unchanged.
pub fn extract_matrix<'a>(value: &'a Value, op: &str, arg: &str) -> Result<&'a Matrix, CalcError> {
    match value {
        Value::Matrix(m) => Ok(m),
        Value::Error(e) => Err(e.clone()),
        _ => Err(CalcError::arg_type(op, arg, "Matrix", value.type_name())),
    }
}

/// Extract a scalar from a Value. An error value propagates unchanged.
pub fn extract_scalar(value: &Value, op: &str, arg: &str) -> Result<f64, CalcError> {
    match value {
        Value::Scalar(s) => Ok(*s),
        Value::Error(e) => Err(e.clone()),
        _ => Err(CalcError::arg_type(op, arg, "Scalar", value.type_name())),
    }
}

/// Exact argument count. Every operation takes precisely the arguments it declares.
pub fn check_arg_count(args: &[Value], op: &str, expected: usize) -> Result<(), CalcError> {
    if args.len() != expected {
        return Err(CalcError::arg_count(op, expected, args.len()));
    }
    Ok(())
}

/// Reject a result that left f64 range
pub fn check_finite(m: Matrix, op: &'static str) -> Result<Matrix, MatrixError> {
    if !m.is_finite() {
        return Err(MatrixError::Overflow { op });
    }
    Ok(m)
}

/// Check that two matrices have compatible dimensions for multiplication
pub fn check_matmul_dims(a: &Matrix, b: &Matrix, op: &'static str) -> Result<(), MatrixError> {
    if a.cols() != b.rows() {
        return Err(MatrixError::DimensionMismatch { op, left: a.shape(), right: b.shape() });
    }
    Ok(())
}

/// Check that two matrices have the same dimensions
pub fn check_same_dims(a: &Matrix, b: &Matrix, op: &'static str) -> Result<(), MatrixError> {
    if a.shape() != b.shape() {
        return Err(MatrixError::DimensionMismatch { op, left: a.shape(), right: b.shape() });
    }
    Ok(())
}

/// Check that a matrix is square
pub fn check_square(m: &Matrix, op: &'static str) -> Result<(), MatrixError> {
    if !m.is_square() {
        return Err(MatrixError::NotSquare { op, shape: m.shape() });
    }
    Ok(())
}
