//! Calculation inputs and results
//!
//! Binds an operation's declared arguments to the entry fields, parsing
//! each field fresh for every calculation.

use matcalc_core::{parse_matrix, parse_scalar, CalcError, InputSource, Value};
use matcalc_plugin::OperationMeta;
use serde::{Deserialize, Serialize};

/// Raw text of the calculator's entry fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub b: String,
    #[serde(default)]
    pub scalar: String,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_a(mut self, text: impl Into<String>) -> Self {
        self.a = text.into();
        self
    }

    pub fn with_b(mut self, text: impl Into<String>) -> Self {
        self.b = text.into();
        self
    }

    pub fn with_scalar(mut self, text: impl Into<String>) -> Self {
        self.scalar = text.into();
        self
    }

    pub fn text(&self, source: InputSource) -> &str {
        match source {
            InputSource::A => &self.a,
            InputSource::B => &self.b,
            InputSource::Scalar => &self.scalar,
        }
    }

    /// Parse one field. Errors are attributed to that field.
    pub fn read(&self, source: InputSource) -> Result<Value, CalcError> {
        let text = self.text(source);
        let parsed = match source {
            InputSource::A | InputSource::B => parse_matrix(text).map(Value::Matrix),
            InputSource::Scalar => parse_scalar(text).map(Value::Scalar),
        };
        parsed.map_err(|e| CalcError::from(e).in_input(source))
    }
}

/// Result of one calculation
#[derive(Debug, Clone, Serialize)]
pub struct Calculation {
    /// Operation name as requested
    pub operation: String,
    /// Matrix, scalar or error
    pub value: Value,
    /// Rendered result
    pub text: String,
}

impl Calculation {
    pub fn is_error(&self) -> bool {
        self.value.is_error()
    }

    pub fn error(&self) -> Option<&CalcError> {
        self.value.as_error()
    }

    /// Entry field to flag, when the failure came from one
    pub fn input(&self) -> Option<InputSource> {
        self.error().and_then(|e| e.input())
    }
}

/// Entry field feeding an argument, by argument name
pub fn source_for(arg: &str) -> Option<InputSource> {
    match arg {
        "a" => Some(InputSource::A),
        "b" => Some(InputSource::B),
        "scalar" => Some(InputSource::Scalar),
        _ => None,
    }
}

/// Read the arguments an operation declares, in order. Stops at the first
/// field that fails to parse.
pub fn bind_args(meta: &OperationMeta, inputs: &Inputs) -> Result<Vec<Value>, CalcError> {
    meta.args
        .iter()
        .map(|arg| {
            let source = source_for(arg.name).ok_or_else(|| {
                CalcError::internal(format!("{}: argument '{}' has no entry field", meta.name, arg.name))
            })?;
            inputs.read(source)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcalc_core::codes;
    use matcalc_matrix::standard_registry;

    #[test]
    fn test_read_fields() {
        let inputs = Inputs::new().with_a("1 2\n3 4").with_scalar(" 2 ");
        assert_eq!(inputs.read(InputSource::A).unwrap().as_matrix().unwrap().rows(), 2);
        assert_eq!(inputs.read(InputSource::Scalar).unwrap().as_scalar(), Some(2.0));
    }

    #[test]
    fn test_read_error_names_field() {
        let inputs = Inputs::new().with_b("1 x");
        let err = inputs.read(InputSource::B).unwrap_err();
        assert_eq!(err.code, codes::INVALID_TOKEN);
        assert_eq!(err.input(), Some(InputSource::B));
        assert_eq!(err.message, "matrix B: line 1: 'x' is not a number");
    }

    #[test]
    fn test_bind_args_only_reads_declared_fields() {
        let registry = standard_registry();
        let meta = registry.help("transpose").unwrap();
        // B is garbage but transpose never reads it
        let inputs = Inputs::new().with_a("1 2").with_b("???");
        let args = bind_args(&meta, &inputs).unwrap();
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_bind_args_stops_at_first_failure() {
        let registry = standard_registry();
        let meta = registry.help("add").unwrap();
        let inputs = Inputs::new().with_a("").with_b("1 x");
        let err = bind_args(&meta, &inputs).unwrap_err();
        assert_eq!(err.input(), Some(InputSource::A));
        assert_eq!(err.code, codes::EMPTY_INPUT);
    }

    #[test]
    fn test_inputs_deserialize_with_missing_fields() {
        let inputs: Inputs = serde_json::from_str(r#"{"a": "1"}"#).unwrap();
        assert_eq!(inputs.a, "1");
        assert_eq!(inputs.b, "");
    }
}
