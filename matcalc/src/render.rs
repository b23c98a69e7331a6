//! Text renderer
//!
//! Renders operation results as plain text. Matrices come out as
//! right-aligned, whitespace-separated columns, which `parse_matrix`
//! reads back.

use matcalc_core::{Matrix, Value};

/// Display format for numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberFormat {
    /// Shortest text that reads back to the same f64 (default)
    #[default]
    Shortest,
    /// Fixed decimal places
    Decimal(u32),
    /// Scientific notation with this many fractional digits
    Scientific(u32),
}

impl NumberFormat {
    pub fn format(&self, value: f64) -> String {
        // No "-0" in output
        let value = if value == 0.0 { 0.0 } else { value };
        let s = match *self {
            NumberFormat::Shortest => value.to_string(),
            NumberFormat::Decimal(places) => format!("{:.*}", places as usize, value),
            NumberFormat::Scientific(digits) => format!("{:.*e}", digits as usize, value),
        };
        match s.strip_prefix('-') {
            Some(rest) if rest.parse::<f64>().map_or(false, |v| v == 0.0) => rest.to_string(),
            _ => s,
        }
    }
}

/// Result renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    format: NumberFormat,
}

impl Renderer {
    pub fn new(format: NumberFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> NumberFormat {
        self.format
    }

    pub fn render(&self, value: &Value) -> String {
        match value {
            Value::Matrix(m) => self.render_matrix(m),
            Value::Scalar(s) => self.format.format(*s),
            Value::Error(e) => format!("Error: {}", e.message),
        }
    }

    /// One row per line, columns right-aligned
    pub fn render_matrix(&self, m: &Matrix) -> String {
        let cells: Vec<Vec<String>> = m.to_rows()
            .iter()
            .map(|row| row.iter().map(|v| self.format.format(*v)).collect())
            .collect();

        let mut widths = vec![0usize; m.cols()];
        for row in &cells {
            for (j, cell) in row.iter().enumerate() {
                widths[j] = widths[j].max(cell.chars().count());
            }
        }

        cells
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&widths)
                    .map(|(cell, w)| format!("{:>w$}", cell, w = *w))
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcalc_core::{parse_matrix, CalcError, MatrixError};

    #[test]
    fn test_render_matrix_aligned() {
        let m = parse_matrix("1 -20\n300 4.5").unwrap();
        let text = Renderer::default().render(&Value::Matrix(m));
        assert_eq!(text, "  1  -20\n300  4.5");
    }

    #[test]
    fn test_render_roundtrips_through_parser() {
        let m = parse_matrix("0.1 -2\n3e-7 12345.678").unwrap();
        let text = Renderer::default().render_matrix(&m);
        assert_eq!(parse_matrix(&text).unwrap(), m);
    }

    #[test]
    fn test_render_scalar() {
        assert_eq!(Renderer::default().render(&Value::Scalar(-2.0)), "-2");
        assert_eq!(Renderer::new(NumberFormat::Decimal(3)).render(&Value::Scalar(-2.0)), "-2.000");
    }

    #[test]
    fn test_render_error() {
        let e = CalcError::from(MatrixError::EmptyInput);
        assert_eq!(Renderer::default().render(&Value::Error(e)), "Error: no numeric rows found");
    }

    #[test]
    fn test_number_formats() {
        assert_eq!(NumberFormat::Shortest.format(0.5), "0.5");
        assert_eq!(NumberFormat::Decimal(2).format(1.0 / 3.0), "0.33");
        assert_eq!(NumberFormat::Scientific(2).format(1500.0), "1.50e3");
    }

    #[test]
    fn test_no_negative_zero() {
        assert_eq!(NumberFormat::Shortest.format(-0.0), "0");
        assert_eq!(NumberFormat::Decimal(2).format(-0.001), "0.00");
    }
}
