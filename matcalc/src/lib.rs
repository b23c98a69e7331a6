//! matcalc - Matrix calculator engine
//!
//! Ties the pieces together: entry-field text is parsed, the requested
//! operation is dispatched through the registry, and the result is
//! rendered as text. Errors come back as values naming the entry field to
//! flag, so a front end never needs to inspect the parser.

mod eval;
mod render;
mod heatmap;

pub use eval::{Inputs, Calculation, bind_args, source_for};
pub use render::{Renderer, NumberFormat};
pub use heatmap::{Heatmap, HeatmapStyle, viridis, normalise};

use matcalc_core::{CalcError, InputSource, Value};
use matcalc_plugin::{OperationMeta, OperationRegistry};
use std::sync::Arc;
use tracing::{debug, warn};

/// Main calculator engine
pub struct Calculator {
    registry: Arc<OperationRegistry>,
    renderer: Renderer,
    heatmap_style: HeatmapStyle,
}

impl Calculator {
    pub fn new(registry: OperationRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            renderer: Renderer::default(),
            heatmap_style: HeatmapStyle::default(),
        }
    }

    pub fn with_standard_library() -> Self {
        Self::new(matcalc_matrix::standard_registry())
    }

    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.renderer = Renderer::new(format);
        self
    }

    pub fn with_heatmap_style(mut self, style: HeatmapStyle) -> Self {
        self.heatmap_style = style;
        self
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn heatmap_style(&self) -> HeatmapStyle {
        self.heatmap_style
    }

    /// Parse the fields `op` needs, run it, render the result
    pub fn calculate(&self, op: &str, inputs: &Inputs) -> Calculation {
        debug!(operation = op, "calculating");

        let value = match self.registry.get_operation(op) {
            None => Value::Error(self.registry.unknown_operation(op)),
            Some(plugin) => match bind_args(&plugin.meta(), inputs) {
                Ok(args) => plugin.call(&args),
                Err(e) => Value::Error(e),
            },
        };

        match &value {
            Value::Error(e) => warn!(operation = op, code = %e.code, input = ?e.input(), "calculation failed: {}", e.message),
            other => debug!(operation = op, result = other.type_name(), "calculation done"),
        }

        Calculation {
            operation: op.to_string(),
            text: self.renderer.render(&value),
            value,
        }
    }

    /// Heatmap of matrix A
    pub fn visualize(&self, inputs: &Inputs, title: &str) -> Result<String, CalcError> {
        self.visualize_with(inputs, title, self.heatmap_style)
    }

    pub fn visualize_with(&self, inputs: &Inputs, title: &str, style: HeatmapStyle) -> Result<String, CalcError> {
        let value = inputs.read(InputSource::A)?;
        match value.as_matrix() {
            Some(m) => {
                debug!(rows = m.rows(), cols = m.cols(), %style, "rendering heatmap");
                Heatmap::new(style, self.renderer.format()).render(m, title)
            }
            None => Err(CalcError::internal("matrix field did not produce a matrix")),
        }
    }

    pub fn help(&self, name: &str) -> Result<OperationMeta, CalcError> {
        self.registry.help(name)
    }

    pub fn list_operations(&self, category: Option<&str>) -> Vec<OperationMeta> {
        self.registry.list_operations(category)
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::with_standard_library()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcalc_core::{codes, parse_matrix};

    fn scenario() -> Inputs {
        Inputs::new().with_a("1 2\n3 4").with_b("5 6\n7 8").with_scalar("2")
    }

    #[test]
    fn test_add() {
        let calc = Calculator::default();
        let result = calc.calculate("add", &scenario());
        assert!(!result.is_error());
        assert_eq!(result.value.as_matrix(), Some(&parse_matrix("6 8\n10 12").unwrap()));
        assert_eq!(result.text, " 6   8\n10  12");
    }

    #[test]
    fn test_multiply() {
        let result = Calculator::default().calculate("multiply", &scenario());
        assert_eq!(result.value.as_matrix(), Some(&parse_matrix("19 22\n43 50").unwrap()));
    }

    #[test]
    fn test_determinant_is_scalar() {
        let result = Calculator::default().calculate("determinant", &scenario());
        let det = result.value.as_scalar().unwrap();
        assert!((det + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_transpose() {
        let result = Calculator::default().calculate("transpose", &scenario());
        assert_eq!(result.value.as_matrix(), Some(&parse_matrix("1 3\n2 4").unwrap()));
    }

    #[test]
    fn test_scalar_multiply() {
        let result = Calculator::default().calculate("scalar_multiply", &scenario());
        assert_eq!(result.value.as_matrix(), Some(&parse_matrix("2 4\n6 8").unwrap()));
    }

    #[test]
    fn test_invalid_scalar_flags_scalar_field() {
        let inputs = scenario().with_scalar("abc");
        let result = Calculator::default().calculate("scalar_multiply", &inputs);
        assert_eq!(result.error().unwrap().code, codes::INVALID_SCALAR);
        assert_eq!(result.input(), Some(InputSource::Scalar));
        assert!(result.text.starts_with("Error: scalar:"));
    }

    #[test]
    fn test_parse_error_flags_field() {
        let inputs = scenario().with_b("1 2\n3 4 5");
        let result = Calculator::default().calculate("subtract", &inputs);
        assert_eq!(result.error().unwrap().code, codes::RAGGED_ROW);
        assert_eq!(result.input(), Some(InputSource::B));
    }

    #[test]
    fn test_operation_error_has_no_field() {
        let inputs = scenario().with_b("1 2\n2 4");
        let result = Calculator::default().calculate("divide", &inputs);
        assert_eq!(result.error().unwrap().code, codes::SINGULAR);
        assert_eq!(result.input(), None);
    }

    #[test]
    fn test_unknown_operation() {
        let result = Calculator::default().calculate("dvide", &scenario());
        let err = result.error().unwrap();
        assert_eq!(err.code, codes::UNKNOWN_OPERATION);
        assert!(err.suggestion.as_deref().unwrap_or("").contains("divide"));
    }

    #[test]
    fn test_number_format_applies() {
        let calc = Calculator::default().with_number_format(NumberFormat::Decimal(1));
        let result = calc.calculate("inverse", &Inputs::new().with_a("4 7\n2 6"));
        assert_eq!(result.text, " 0.6  -0.7\n-0.2   0.4");
    }

    #[test]
    fn test_visualize() {
        let calc = Calculator::default();
        let out = calc.visualize(&scenario(), "Matrix A").unwrap();
        assert!(out.starts_with("Matrix A\n"));

        let err = calc.visualize(&Inputs::new(), "Matrix A").unwrap_err();
        assert_eq!(err.input(), Some(InputSource::A));

        let svg = calc.visualize_with(&scenario(), "Matrix A", HeatmapStyle::Svg).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_overflow_reported_as_error() {
        let inputs = Inputs::new().with_a("1e200").with_b("1e200");
        let result = Calculator::default().calculate("multiply", &inputs);
        assert_eq!(result.error().unwrap().code, codes::OVERFLOW);
        assert_eq!(result.input(), None);
        assert!(!result.text.contains("inf"));
    }
}
