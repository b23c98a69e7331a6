//! Matrix operations: arithmetic, inverse, transpose
//!
//! The plain functions are the library surface; each `*Fn` struct wraps
//! one of them as an operation plugin.

use matcalc_plugin::prelude::*;
use crate::helpers::*;

// ============ pure operations ============

/// A + B
pub fn add(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    check_same_dims(a, b, "add")?;
    check_finite(Matrix::from_dmatrix(a.as_dmatrix() + b.as_dmatrix())?, "add")
}

/// A − B
pub fn subtract(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    check_same_dims(a, b, "subtract")?;
    check_finite(Matrix::from_dmatrix(a.as_dmatrix() - b.as_dmatrix())?, "subtract")
}

/// A · B
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    matmul(a, b, "multiply")
}

/// A · B⁻¹. Only B is required to be square and invertible.
pub fn divide(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    let inv_b = invert(b, "divide")?;
    matmul(a, &inv_b, "divide")
}

/// A⁻¹
pub fn inverse(a: &Matrix) -> Result<Matrix, MatrixError> {
    invert(a, "inverse")
}

/// Aᵀ
pub fn transpose(a: &Matrix) -> Matrix {
    a.transpose()
}

/// s · A
pub fn scalar_multiply(a: &Matrix, scalar: f64) -> Result<Matrix, MatrixError> {
    if !scalar.is_finite() {
        return Err(MatrixError::InvalidScalar(scalar.to_string()));
    }
    check_finite(Matrix::from_dmatrix(a.as_dmatrix() * scalar)?, "scalar_multiply")
}

fn matmul(a: &Matrix, b: &Matrix, op: &'static str) -> Result<Matrix, MatrixError> {
    check_matmul_dims(a, b, op)?;
    check_finite(Matrix::from_dmatrix(a.as_dmatrix() * b.as_dmatrix())?, op)
}

// LU-based; near-singular input can still come back with huge entries.
fn invert(m: &Matrix, op: &'static str) -> Result<Matrix, MatrixError> {
    check_square(m, op)?;
    let inv = m.as_dmatrix()
        .clone()
        .try_inverse()
        .ok_or(MatrixError::Singular { op })?;
    let inv = Matrix::from_dmatrix(inv)?;
    if !inv.is_finite() {
        return Err(MatrixError::Singular { op });
    }
    Ok(inv)
}

// ============ plugin plumbing ============

fn binary_args<'a>(args: &'a [Value], op: &str) -> Result<(&'a Matrix, &'a Matrix), CalcError> {
    check_arg_count(args, op, 2)?;
    let a = extract_matrix(&args[0], op, "a")?;
    let b = extract_matrix(&args[1], op, "b")?;
    Ok((a, b))
}

fn unary_arg<'a>(args: &'a [Value], op: &str) -> Result<&'a Matrix, CalcError> {
    check_arg_count(args, op, 1)?;
    extract_matrix(&args[0], op, "a")
}

static AB_ARGS: [ArgMeta; 2] = [
    ArgMeta::new("a", "Matrix", "Matrix A"),
    ArgMeta::new("b", "Matrix", "Matrix B"),
];

static A_ARGS: [ArgMeta; 1] = [
    ArgMeta::new("a", "Matrix", "Matrix A"),
];

// ============ add ============

pub struct AddFn;

static ADD_EXAMPLES: [&str; 1] = ["add([[1,2],[3,4]], [[5,6],[7,8]]) → [[6,8],[10,12]]"];
static ADD_RELATED: [&str; 2] = ["subtract", "scalar_multiply"];

impl OperationPlugin for AddFn {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "add", label: "A + B", description: "Element-wise matrix addition", usage: "add(a, b)",
            args: &AB_ARGS, returns: "Matrix", examples: &ADD_EXAMPLES,
            category: "matrix/ops", related: &ADD_RELATED,
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        let (a, b) = match binary_args(args, "add") { Ok(ab) => ab, Err(e) => return Value::Error(e) };
        add(a, b).into()
    }
}

// ============ subtract ============

pub struct SubtractFn;

static SUBTRACT_EXAMPLES: [&str; 1] = ["subtract([[5,6],[7,8]], [[1,2],[3,4]]) → [[4,4],[4,4]]"];
static SUBTRACT_RELATED: [&str; 2] = ["add", "scalar_multiply"];

impl OperationPlugin for SubtractFn {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "subtract", label: "A - B", description: "Element-wise matrix subtraction", usage: "subtract(a, b)",
            args: &AB_ARGS, returns: "Matrix", examples: &SUBTRACT_EXAMPLES,
            category: "matrix/ops", related: &SUBTRACT_RELATED,
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        let (a, b) = match binary_args(args, "subtract") { Ok(ab) => ab, Err(e) => return Value::Error(e) };
        subtract(a, b).into()
    }
}

// ============ multiply ============

pub struct MultiplyFn;

static MULTIPLY_EXAMPLES: [&str; 1] = ["multiply([[1,2],[3,4]], [[5,6],[7,8]]) → [[19,22],[43,50]]"];
static MULTIPLY_RELATED: [&str; 2] = ["divide", "transpose"];

impl OperationPlugin for MultiplyFn {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "multiply", label: "A × B", description: "Matrix product", usage: "multiply(a, b)",
            args: &AB_ARGS, returns: "Matrix", examples: &MULTIPLY_EXAMPLES,
            category: "matrix/ops", related: &MULTIPLY_RELATED,
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        let (a, b) = match binary_args(args, "multiply") { Ok(ab) => ab, Err(e) => return Value::Error(e) };
        multiply(a, b).into()
    }
}

// ============ divide ============

pub struct DivideFn;

static DIVIDE_EXAMPLES: [&str; 1] = ["divide(a, b) → a × b⁻¹"];
static DIVIDE_RELATED: [&str; 2] = ["multiply", "inverse"];

impl OperationPlugin for DivideFn {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "divide", label: "A ÷ B", description: "Right division: A multiplied by the inverse of B", usage: "divide(a, b)",
            args: &AB_ARGS, returns: "Matrix", examples: &DIVIDE_EXAMPLES,
            category: "matrix/inverse", related: &DIVIDE_RELATED,
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        let (a, b) = match binary_args(args, "divide") { Ok(ab) => ab, Err(e) => return Value::Error(e) };
        divide(a, b).into()
    }
}

// ============ inverse ============

pub struct InverseFn;

static INVERSE_EXAMPLES: [&str; 1] = ["inverse([[4,7],[2,6]]) → [[0.6,-0.7],[-0.2,0.4]]"];
static INVERSE_RELATED: [&str; 2] = ["determinant", "divide"];

impl OperationPlugin for InverseFn {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "inverse", label: "inv(A)", description: "Matrix inverse", usage: "inverse(a)",
            args: &A_ARGS, returns: "Matrix", examples: &INVERSE_EXAMPLES,
            category: "matrix/inverse", related: &INVERSE_RELATED,
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        let a = match unary_arg(args, "inverse") { Ok(m) => m, Err(e) => return Value::Error(e) };
        inverse(a).into()
    }
}

// ============ transpose ============

pub struct TransposeFn;

static TRANSPOSE_EXAMPLES: [&str; 1] = ["transpose([[1,2],[3,4]]) → [[1,3],[2,4]]"];
static TRANSPOSE_RELATED: [&str; 2] = ["multiply", "inverse"];

impl OperationPlugin for TransposeFn {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "transpose", label: "Aᵀ", description: "Matrix transpose", usage: "transpose(a)",
            args: &A_ARGS, returns: "Matrix", examples: &TRANSPOSE_EXAMPLES,
            category: "matrix/ops", related: &TRANSPOSE_RELATED,
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        let a = match unary_arg(args, "transpose") { Ok(m) => m, Err(e) => return Value::Error(e) };
        transpose(a).into()
    }
}

// ============ scalar_multiply ============

pub struct ScalarMultiplyFn;

static SCALAR_MULTIPLY_ARGS: [ArgMeta; 2] = [
    ArgMeta::new("a", "Matrix", "Matrix A"),
    ArgMeta::new("scalar", "Scalar", "Real factor"),
];

static SCALAR_MULTIPLY_EXAMPLES: [&str; 1] = ["scalar_multiply([[1,2],[3,4]], 2) → [[2,4],[6,8]]"];
static SCALAR_MULTIPLY_RELATED: [&str; 2] = ["add", "multiply"];

impl OperationPlugin for ScalarMultiplyFn {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "scalar_multiply", label: "Scalar × A", description: "Multiply every element by a scalar", usage: "scalar_multiply(a, scalar)",
            args: &SCALAR_MULTIPLY_ARGS, returns: "Matrix", examples: &SCALAR_MULTIPLY_EXAMPLES,
            category: "matrix/ops", related: &SCALAR_MULTIPLY_RELATED,
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        if let Err(e) = check_arg_count(args, "scalar_multiply", 2) { return Value::Error(e); }

        let a = match extract_matrix(&args[0], "scalar_multiply", "a") { Ok(m) => m, Err(e) => return Value::Error(e) };
        let s = match extract_scalar(&args[1], "scalar_multiply", "scalar") { Ok(s) => s, Err(e) => return Value::Error(e) };

        scalar_multiply(a, s).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcalc_core::{codes, parse_matrix, Shape};
    use nalgebra::DMatrix;
    use proptest::prelude::*;

    fn m(text: &str) -> Matrix {
        parse_matrix(text).unwrap()
    }

    fn identity(n: usize) -> Matrix {
        Matrix::from_dmatrix(DMatrix::identity(n, n)).unwrap()
    }

    #[test]
    fn test_scenario_2x2() {
        let a = m("1 2\n3 4");
        let b = m("5 6\n7 8");
        assert_eq!(add(&a, &b).unwrap(), m("6 8\n10 12"));
        assert_eq!(subtract(&b, &a).unwrap(), m("4 4\n4 4"));
        assert_eq!(multiply(&a, &b).unwrap(), m("19 22\n43 50"));
        assert_eq!(transpose(&a), m("1 3\n2 4"));
        assert_eq!(scalar_multiply(&a, 2.0).unwrap(), m("2 4\n6 8"));
    }

    #[test]
    fn test_inputs_unchanged() {
        let a = m("1 2\n3 4");
        let before = a.clone();
        let _ = add(&a, &a);
        let _ = inverse(&a);
        let _ = scalar_multiply(&a, 3.0);
        assert_eq!(a, before);
    }

    #[test]
    fn test_add_dimension_mismatch() {
        let err = add(&m("1 2"), &m("1\n2")).unwrap_err();
        assert_eq!(err, MatrixError::DimensionMismatch { op: "add", left: Shape::new(1, 2), right: Shape::new(2, 1) });
        assert!(subtract(&m("1 2"), &m("1 2 3")).is_err());
    }

    #[test]
    fn test_multiply_rectangular() {
        let a = m("1 2 3");
        let b = m("1\n2\n3");
        assert_eq!(multiply(&a, &b).unwrap(), m("14"));
        assert_eq!(multiply(&b, &a).unwrap().shape(), Shape::new(3, 3));
        assert!(matches!(multiply(&a, &a), Err(MatrixError::DimensionMismatch { op: "multiply", .. })));
    }

    #[test]
    fn test_inverse() {
        let a = m("4 7\n2 6");
        let inv = inverse(&a).unwrap();
        assert!(inv.approx_eq(&m("0.6 -0.7\n-0.2 0.4"), 1e-12));
    }

    #[test]
    fn test_inverse_errors() {
        assert_eq!(inverse(&m("1 2 3\n4 5 6")), Err(MatrixError::NotSquare { op: "inverse", shape: Shape::new(2, 3) }));
        assert_eq!(inverse(&m("1 2\n2 4")), Err(MatrixError::Singular { op: "inverse" }));
        assert_eq!(inverse(&m("0")), Err(MatrixError::Singular { op: "inverse" }));
    }

    #[test]
    fn test_divide_checks_only_b() {
        // A need not be square
        let a = m("1 2\n3 4\n5 6");
        let b = m("2 0\n0 4");
        assert_eq!(divide(&a, &b).unwrap(), m("0.5 0.5\n1.5 1\n2.5 1.5"));

        assert_eq!(divide(&a, &m("1 2 3")), Err(MatrixError::NotSquare { op: "divide", shape: Shape::new(1, 3) }));
        assert_eq!(divide(&a, &m("1 1\n1 1")), Err(MatrixError::Singular { op: "divide" }));
        assert!(matches!(divide(&m("1 2 3"), &b), Err(MatrixError::DimensionMismatch { op: "divide", .. })));
    }

    #[test]
    fn test_divide_is_right_multiplication() {
        let a = m("1 2\n3 4");
        let b = m("0 1\n1 0");
        // b is its own inverse; a·b swaps columns, b·a would swap rows
        assert_eq!(divide(&a, &b).unwrap(), m("2 1\n4 3"));
    }

    #[test]
    fn test_scalar_multiply_rejects_non_finite() {
        let a = m("1 2");
        assert!(matches!(scalar_multiply(&a, f64::NAN), Err(MatrixError::InvalidScalar(_))));
        assert!(matches!(scalar_multiply(&a, f64::INFINITY), Err(MatrixError::InvalidScalar(_))));
        assert_eq!(scalar_multiply(&a, 0.0).unwrap(), m("0 0"));
    }

    #[test]
    fn test_plugin_call() {
        let a = Value::Matrix(m("1 2\n3 4"));
        let b = Value::Matrix(m("5 6\n7 8"));
        assert_eq!(MultiplyFn.call(&[a.clone(), b.clone()]), Value::Matrix(m("19 22\n43 50")));
        assert_eq!(TransposeFn.call(&[a.clone()]), Value::Matrix(m("1 3\n2 4")));
        assert_eq!(ScalarMultiplyFn.call(&[a, Value::Scalar(2.0)]), Value::Matrix(m("2 4\n6 8")));
    }

    #[test]
    fn test_plugin_errors() {
        let a = Value::Matrix(m("1 2"));
        let v = AddFn.call(&[a.clone()]);
        assert_eq!(v.as_error().unwrap().code, codes::ARG_COUNT);

        let v = AddFn.call(&[a.clone(), Value::Scalar(1.0)]);
        assert_eq!(v.as_error().unwrap().code, codes::ARG_TYPE);

        let v = InverseFn.call(&[a.clone()]);
        assert_eq!(v.as_error().unwrap().code, codes::NOT_SQUARE);

        let v = DivideFn.call(&[a, Value::Matrix(m("1 2\n2 4"))]);
        assert_eq!(v.as_error().unwrap().code, codes::SINGULAR);

        let v = InverseFn.call(&[]);
        assert_eq!(v.as_error().unwrap().code, codes::ARG_COUNT);
    }

    #[test]
    fn test_plugins_reject_extra_arguments() {
        let a = Value::Matrix(m("1 2\n3 4"));
        let s = Value::Scalar(2.0);
        let too_many = [a.clone(), a.clone(), a.clone()];
        for v in [
            AddFn.call(&too_many),
            SubtractFn.call(&too_many),
            MultiplyFn.call(&too_many),
            DivideFn.call(&too_many),
            InverseFn.call(&too_many[..2]),
            TransposeFn.call(&too_many[..2]),
            ScalarMultiplyFn.call(&[a.clone(), s.clone(), s]),
        ] {
            assert_eq!(v.as_error().unwrap().code, codes::ARG_COUNT);
        }
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = m("1e200");
        assert_eq!(multiply(&huge, &huge), Err(MatrixError::Overflow { op: "multiply" }));
        assert_eq!(add(&m("1.7e308"), &m("1.7e308")), Err(MatrixError::Overflow { op: "add" }));
        assert_eq!(subtract(&m("-1.7e308"), &m("1.7e308")), Err(MatrixError::Overflow { op: "subtract" }));
        assert_eq!(scalar_multiply(&huge, 1e200), Err(MatrixError::Overflow { op: "scalar_multiply" }));
        assert_eq!(divide(&huge, &m("1e-200")), Err(MatrixError::Overflow { op: "divide" }));

        let v = MultiplyFn.call(&[Value::Matrix(huge.clone()), Value::Matrix(huge)]);
        assert_eq!(v.as_error().unwrap().code, codes::OVERFLOW);
    }

    fn square(n: usize) -> impl Strategy<Value = Matrix> {
        prop::collection::vec(-10.0f64..10.0, n * n).prop_map(move |v| {
            Matrix::from_dmatrix(DMatrix::from_row_slice(n, n, &v)).unwrap()
        })
    }

    fn rect(r: usize, c: usize) -> impl Strategy<Value = Matrix> {
        prop::collection::vec(-10.0f64..10.0, r * c).prop_map(move |v| {
            Matrix::from_dmatrix(DMatrix::from_row_slice(r, c, &v)).unwrap()
        })
    }

    fn compatible_pair() -> impl Strategy<Value = (Matrix, Matrix)> {
        (1usize..5, 1usize..5, 1usize..5).prop_flat_map(|(r, k, c)| (rect(r, k), rect(k, c)))
    }

    proptest! {
        #[test]
        fn prop_inverse_gives_identity(a in (1usize..5).prop_flat_map(square)) {
            // Well-conditioned only: skip near-singular draws
            let det = a.as_dmatrix().determinant();
            prop_assume!(det.abs() > 1.0);
            let inv = inverse(&a).unwrap();
            let product = multiply(&a, &inv).unwrap();
            prop_assert!(product.approx_eq(&identity(a.rows()), 1e-6));
        }

        #[test]
        fn prop_transpose_of_product((a, b) in compatible_pair()) {
            let lhs = transpose(&multiply(&a, &b).unwrap());
            let rhs = multiply(&transpose(&b), &transpose(&a)).unwrap();
            prop_assert!(lhs.approx_eq(&rhs, 1e-9));
        }

        #[test]
        fn prop_divide_is_multiply_by_inverse(
            (a, b) in (1usize..4, 1usize..4).prop_flat_map(|(r, n)| (rect(r, n), square(n)))
        ) {
            match inverse(&b) {
                Ok(inv) => prop_assert_eq!(divide(&a, &b).unwrap(), multiply(&a, &inv).unwrap()),
                Err(_) => prop_assert!(divide(&a, &b).is_err()),
            }
        }
    }
}
