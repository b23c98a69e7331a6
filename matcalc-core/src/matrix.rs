//! Dense real matrix

use std::fmt;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use crate::MatrixError;

/// Row and column count of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.rows, self.cols)
    }
}

/// Immutable rectangular grid of `f64`, at least 1×1.
///
/// Serializes as a row-major nested list; deserializing goes through the
/// same validation as [`Matrix::from_rows`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    data: DMatrix<f64>,
}

impl Matrix {
    /// Build from row-major nested rows. Rows must be non-empty and of equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let first = match rows.first() {
            Some(r) if !r.is_empty() => r.len(),
            _ => return Err(MatrixError::EmptyInput),
        };

        for (i, row) in rows.iter().enumerate() {
            if row.len() != first {
                return Err(MatrixError::RaggedRow { line: i + 1, expected: first, actual: row.len() });
            }
        }

        let n = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Ok(Self { data: DMatrix::from_row_slice(n, first, &flat) })
    }

    /// Wrap an nalgebra matrix. A zero dimension is `EmptyInput`.
    pub fn from_dmatrix(data: DMatrix<f64>) -> Result<Self, MatrixError> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(MatrixError::EmptyInput);
        }
        Ok(Self { data })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.rows(), self.cols())
    }

    pub fn is_square(&self) -> bool {
        self.shape().is_square()
    }

    /// Element at (row, col), `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    /// Borrow the backing nalgebra matrix
    pub fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Row-major copy of the values
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data
            .row_iter()
            .map(|r| r.iter().copied().collect())
            .collect()
    }

    /// Iterate values row by row
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let cols = self.cols();
        (0..self.rows()).flat_map(move |i| (0..cols).map(move |j| self.data[(i, j)]))
    }

    /// Smallest and largest value
    pub fn min_max(&self) -> (f64, f64) {
        (self.data.min(), self.data.max())
    }

    /// Element-wise comparison within an absolute tolerance
    pub fn approx_eq(&self, other: &Matrix, tol: f64) -> bool {
        self.shape() == other.shape()
            && self.data.iter().zip(other.data.iter()).all(|(a, b)| (a - b).abs() <= tol)
    }

    /// Aᵀ; the shape stays non-empty so this cannot fail
    pub fn transpose(&self) -> Matrix {
        Self { data: self.data.transpose() }
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Matrix::from_rows(rows)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.to_rows()
    }
}

/// Row-major text grid: one row per line, values separated by a space.
/// `parse_matrix` reads this back to an equal matrix.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.row_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, val) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", val)?;
            }
        }
        Ok(())
    }
}
