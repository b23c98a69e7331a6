//! Text input parsing
//!
//! A matrix is typed as newline-separated rows with values separated by
//! runs of whitespace:
//!
//! ```text
//! 1   2
//! 3.5 -4
//! ```
//!
//! Parsing is strict: a non-numeric token or a row of the wrong length is
//! an error naming the offending line, never padded or truncated.

use crate::{Matrix, MatrixError};

/// Parse free-form text into a rectangular matrix.
///
/// Blank lines are skipped. Line numbers in errors are 1-based and count
/// every line of `text`, blank ones included, so they match what the user
/// sees in the entry field.
pub fn parse_matrix(text: &str) -> Result<Matrix, MatrixError> {
    if text.trim().is_empty() {
        return Err(MatrixError::EmptyInput);
    }

    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut expected: Option<usize> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let row = tokens
            .iter()
            .map(|t| parse_token(t, line_no))
            .collect::<Result<Vec<f64>, MatrixError>>()?;

        match expected {
            None => expected = Some(row.len()),
            Some(n) if n != row.len() => {
                return Err(MatrixError::RaggedRow { line: line_no, expected: n, actual: row.len() });
            }
            Some(_) => {}
        }

        rows.push(row);
    }

    Matrix::from_rows(rows)
}

/// Parse the scalar entry field. Must be a single finite real number.
pub fn parse_scalar(text: &str) -> Result<f64, MatrixError> {
    let s = text.trim();
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(MatrixError::InvalidScalar(s.to_string())),
    }
}

fn parse_token(token: &str, line: usize) -> Result<f64, MatrixError> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(MatrixError::InvalidToken { line, token: token.to_string() }),
    }
}
