//! matcalc Matrix - linear algebra operations
//!
//! Provides the calculator's operation set over validated matrices:
//! - Arithmetic (add, subtract, multiply, scalar_multiply)
//! - Inverse operations (inverse, divide as A × B⁻¹)
//! - Transformations (transpose)
//! - Properties (determinant)
//!
//! Every function is pure and returns a new matrix; numeric work is
//! delegated to nalgebra in f64.

mod helpers;
mod ops;
mod props;

pub use ops::{add, subtract, multiply, divide, inverse, transpose, scalar_multiply};
pub use ops::{AddFn, SubtractFn, MultiplyFn, DivideFn, InverseFn, TransposeFn, ScalarMultiplyFn};
pub use props::{determinant, DeterminantFn};

use matcalc_plugin::OperationRegistry;

/// Load matrix operations into registry
pub fn load_matrix_library(registry: OperationRegistry) -> OperationRegistry {
    registry
        // Arithmetic (4 operations)
        .with_operation(AddFn)
        .with_operation(SubtractFn)
        .with_operation(MultiplyFn)
        .with_operation(ScalarMultiplyFn)

        // Inverse (2 operations)
        .with_operation(InverseFn)
        .with_operation(DivideFn)

        // Transform (1 operation)
        .with_operation(TransposeFn)

        // Properties (1 operation)
        .with_operation(DeterminantFn)
}

/// Registry with every calculator operation
pub fn standard_registry() -> OperationRegistry {
    load_matrix_library(OperationRegistry::new())
}
