//! Matrix properties

use matcalc_plugin::prelude::*;
use crate::helpers::*;

/// det(A). A singular matrix gives a (near-)zero value, not an error.
pub fn determinant(a: &Matrix) -> Result<f64, MatrixError> {
    check_square(a, "determinant")?;
    let det = a.as_dmatrix().determinant();
    if !det.is_finite() {
        return Err(MatrixError::Overflow { op: "determinant" });
    }
    Ok(det)
}

// ============ determinant ============

pub struct DeterminantFn;

static DET_ARGS: [ArgMeta; 1] = [ArgMeta::new("a", "Matrix", "Square matrix")];
static DET_EXAMPLES: [&str; 2] = [
    "determinant([[1,2],[3,4]]) → -2",
    "determinant([[2,0,0],[0,2,0],[0,0,2]]) → 8",
];
static DET_RELATED: [&str; 2] = ["inverse", "divide"];

impl OperationPlugin for DeterminantFn {
    fn meta(&self) -> OperationMeta {
        OperationMeta {
            name: "determinant",
            label: "det(A)",
            description: "Determinant of a square matrix",
            usage: "determinant(a)",
            args: &DET_ARGS,
            returns: "Scalar",
            examples: &DET_EXAMPLES,
            category: "matrix/props",
            related: &DET_RELATED,
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        if let Err(e) = check_arg_count(args, "determinant", 1) {
            return Value::Error(e);
        }

        let a = match extract_matrix(&args[0], "determinant", "a") {
            Ok(m) => m,
            Err(e) => return Value::Error(e),
        };

        determinant(a).into()
    }
}
