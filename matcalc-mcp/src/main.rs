//! matcalc MCP Server
//!
//! Line-delimited JSON-RPC 2.0 over stdio. Logs go to stderr.
//!
//! Tools:
//! - calculate: Run one operation on matrix A, matrix B and a scalar
//! - parse_matrix: Validate matrix text
//! - visualize: Heatmap of a matrix
//! - list_operations: List available operations
//! - help: Documentation for an operation

use matcalc::{Calculation, Calculator, HeatmapStyle, Inputs, NumberFormat};
use matcalc_core::{parse_matrix, CalcError, Value};
use matcalc_plugin::OperationMeta;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::env;
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const PROTOCOL_VERSION: &str = "2025-11-25";
const SERVER_NAME: &str = "matcalc";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server settings, read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Config {
    number_format: NumberFormat,
    heatmap_style: HeatmapStyle,
}

impl Config {
    fn from_env() -> Self {
        Self::from_vars(
            env::var("MATCALC_DECIMALS").ok().as_deref(),
            env::var("MATCALC_HEATMAP_STYLE").ok().as_deref(),
        )
    }

    fn from_vars(decimals: Option<&str>, style: Option<&str>) -> Self {
        let mut config = Config::default();

        if let Some(raw) = decimals {
            match raw.trim().parse::<u32>() {
                Ok(places) => config.number_format = NumberFormat::Decimal(places),
                Err(_) => warn!(value = raw, "MATCALC_DECIMALS is not a non-negative integer, using shortest format"),
            }
        }

        if let Some(raw) = style {
            match raw.parse::<HeatmapStyle>() {
                Ok(s) => config.heatmap_style = s,
                Err(_) => warn!(value = raw, "MATCALC_HEATMAP_STYLE must be 'plain', 'ansi' or 'svg', using plain"),
            }
        }

        config
    }

    fn calculator(&self) -> Calculator {
        Calculator::with_standard_library()
            .with_number_format(self.number_format)
            .with_heatmap_style(self.heatmap_style)
    }
}

// MCP Protocol types
#[derive(Debug, Deserialize)]
struct McpRequest {
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl McpError {
    fn parse_error(message: impl Into<String>) -> Self {
        Self { code: -32700, message: message.into(), data: None }
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self { code: -32600, message: message.into(), data: None }
    }

    fn method_not_found(method: &str) -> Self {
        Self { code: -32601, message: format!("Method not found: {}", method), data: None }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self { code: -32602, message: message.into(), data: None }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_env();
    let calculator = config.calculator();

    info!(version = SERVER_VERSION, protocol = PROTOCOL_VERSION, "matcalc MCP server started");
    debug!(?config, operations = calculator.registry().len(), "configuration loaded");

    let stdin = io::stdin();
    let reader = io::BufReader::new(stdin.lock());

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "error reading input");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(response) = handle_line(&calculator, line) else {
            continue;
        };

        if let Err(e) = write_response(&response) {
            warn!(error = %e, "error writing response");
            break;
        }
    }

    info!("client disconnected, shutting down");
}

/// Handle one line of input. Notifications (no id) produce no response.
fn handle_line(calculator: &Calculator, line: &str) -> Option<McpResponse> {
    debug!(bytes = line.len(), "received request");

    let raw: JsonValue = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "malformed request");
            return Some(error_response(None, McpError::parse_error(format!("Parse error: {}", e))));
        }
    };

    // Well-formed JSON that is not a request object
    let id = raw.get("id").cloned().filter(|v| !v.is_null());
    let request: McpRequest = match serde_json::from_value::<McpRequest>(raw) {
        Ok(r) if r.jsonrpc == "2.0" => r,
        Ok(r) => {
            warn!(version = %r.jsonrpc, "unsupported jsonrpc version");
            return Some(error_response(id, McpError::invalid_request("Invalid Request: jsonrpc must be \"2.0\"")));
        }
        Err(e) => {
            warn!(error = %e, "invalid request");
            return Some(error_response(id, McpError::invalid_request(format!("Invalid Request: {}", e))));
        }
    };

    let response = handle_request(calculator, &request);
    if request.id.is_none() {
        debug!(method = %request.method, "notification processed");
        return None;
    }
    Some(response)
}

fn error_response(id: Option<JsonValue>, error: McpError) -> McpResponse {
    McpResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(error),
    }
}

fn write_response(response: &McpResponse) -> io::Result<()> {
    let json = serde_json::to_string(response).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    stdout.flush()
}

fn handle_request(calculator: &Calculator, request: &McpRequest) -> McpResponse {
    debug!(method = %request.method, "processing");

    let result = match request.method.as_str() {
        // Lifecycle
        "initialize" => handle_initialize(&request.params),
        "initialized" | "notifications/initialized" => Ok(json!({})),
        "ping" => Ok(json!({})),

        // Tools
        "tools/list" => handle_tools_list(),
        "tools/call" => handle_tool_call(calculator, &request.params),

        _ => Err(McpError::method_not_found(&request.method)),
    };

    match result {
        Ok(r) => McpResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id.clone(),
            result: Some(r),
            error: None,
        },
        Err(e) => error_response(request.id.clone(), e),
    }
}

fn handle_initialize(params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let client_info = params.as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    // Echo the client's protocol version
    let client_protocol = params.as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str())
        .unwrap_or(PROTOCOL_VERSION);

    info!(client = client_info, protocol = client_protocol, "client connected");

    Ok(json!({
        "protocolVersion": client_protocol,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
            "description": "Matrix calculator"
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "instructions": "Matrices are plain text: one row per line, numbers separated by whitespace. Use 'calculate' with an operation name and the fields it needs (a, b, scalar). Use 'list_operations' to see what is available."
    }))
}

fn handle_tools_list() -> Result<JsonValue, McpError> {
    let matrix_text = "Matrix as text: one row per line, whitespace-separated numbers";

    Ok(json!({
        "tools": [
            {
                "name": "calculate",
                "description": "Run a matrix operation. Only the fields the operation uses are read.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "operation": {
                            "type": "string",
                            "description": "Operation name",
                            "enum": ["add", "subtract", "multiply", "divide", "determinant", "inverse", "transpose", "scalar_multiply"]
                        },
                        "a": { "type": "string", "description": matrix_text },
                        "b": { "type": "string", "description": matrix_text },
                        "scalar": { "type": "string", "description": "Real number, used by scalar_multiply" }
                    },
                    "required": ["operation"]
                }
            },
            {
                "name": "parse_matrix",
                "description": "Validate matrix text and return its shape and values.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "text": { "type": "string", "description": matrix_text }
                    },
                    "required": ["text"]
                }
            },
            {
                "name": "visualize",
                "description": "Render a matrix as a heatmap with a value legend. Style 'svg' returns an SVG image document.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "a": { "type": "string", "description": matrix_text },
                        "title": { "type": "string", "description": "Heading (default: Matrix A)" },
                        "style": {
                            "type": "string",
                            "description": "Output style (default from server config)",
                            "enum": ["plain", "ansi", "svg"]
                        }
                    },
                    "required": ["a"]
                }
            },
            {
                "name": "list_operations",
                "description": "List available operations, optionally by category.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Filter by category",
                            "enum": ["matrix/ops", "matrix/inverse", "matrix/props"]
                        }
                    }
                }
            },
            {
                "name": "help",
                "description": "Documentation for an operation, or general usage.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Operation name. Omit for general help." }
                    }
                }
            }
        ]
    }))
}

fn handle_tool_call(calculator: &Calculator, params: &Option<JsonValue>) -> Result<JsonValue, McpError> {
    let params = params.as_ref().ok_or_else(|| McpError::invalid_params("Missing params"))?;

    let name = params.get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    match name {
        "calculate" => tool_calculate(calculator, args),
        "parse_matrix" => tool_parse_matrix(args),
        "visualize" => tool_visualize(calculator, args),
        "list_operations" => tool_list_operations(calculator, args),
        "help" => tool_help(calculator, args),
        _ => Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
    }
}

/// Optional string argument; present but not a string is a protocol error
fn opt_str<'a>(args: &'a JsonValue, key: &str) -> Result<Option<&'a str>, McpError> {
    match args.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(_) => Err(McpError::invalid_params(format!("Argument '{}' must be a string", key))),
    }
}

fn req_str<'a>(args: &'a JsonValue, key: &str) -> Result<&'a str, McpError> {
    opt_str(args, key)?.ok_or_else(|| McpError::invalid_params(format!("Missing {} argument", key)))
}

fn tool_calculate(calculator: &Calculator, args: JsonValue) -> Result<JsonValue, McpError> {
    let operation = req_str(&args, "operation")?;
    let inputs = Inputs {
        a: opt_str(&args, "a")?.unwrap_or_default().to_string(),
        b: opt_str(&args, "b")?.unwrap_or_default().to_string(),
        scalar: opt_str(&args, "scalar")?.unwrap_or_default().to_string(),
    };

    let calc = calculator.calculate(operation, &inputs);
    Ok(calculation_to_json(&calc))
}

fn calculation_to_json(calc: &Calculation) -> JsonValue {
    match calc.error() {
        Some(e) => tool_error(e),
        None => json!({
            "content": [{ "type": "text", "text": calc.text }],
            "operation": calc.operation,
            "value": value_to_json(&calc.value),
            "isError": false
        }),
    }
}

fn tool_parse_matrix(args: JsonValue) -> Result<JsonValue, McpError> {
    let text = req_str(&args, "text")?;

    match parse_matrix(text) {
        Ok(m) => {
            let shape = m.shape();
            Ok(json!({
                "content": [{ "type": "text", "text": format!("Valid {} matrix", shape) }],
                "rows": shape.rows,
                "cols": shape.cols,
                "data": m.to_rows(),
                "isError": false
            }))
        }
        Err(e) => Ok(tool_error(&CalcError::from(e))),
    }
}

fn tool_visualize(calculator: &Calculator, args: JsonValue) -> Result<JsonValue, McpError> {
    let inputs = Inputs::new().with_a(req_str(&args, "a")?);
    let title = opt_str(&args, "title")?.unwrap_or("Matrix A");

    let result = match opt_str(&args, "style")? {
        None => calculator.visualize(&inputs, title).map(|text| (text, calculator.heatmap_style())),
        Some(raw) => {
            let style = raw.parse::<HeatmapStyle>()
                .map_err(|e| McpError::invalid_params(format!("{}. Use 'plain', 'ansi' or 'svg'", e.message)))?;
            calculator.visualize_with(&inputs, title, style).map(|text| (text, style))
        }
    };

    Ok(match result {
        Ok((text, HeatmapStyle::Svg)) => json!({
            "content": [{ "type": "text", "text": text }],
            "mimeType": "image/svg+xml",
            "style": "svg",
            "isError": false
        }),
        Ok((text, style)) => json!({
            "content": [{ "type": "text", "text": text }],
            "style": style.to_string(),
            "isError": false
        }),
        Err(e) => tool_error(&e),
    })
}

fn tool_list_operations(calculator: &Calculator, args: JsonValue) -> Result<JsonValue, McpError> {
    let category = opt_str(&args, "category")?;
    let operations = calculator.list_operations(category);

    let text = operations.iter()
        .map(|m| format!("{:<16} {:<10} {}", m.name, m.label, m.description))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "data": operations
    }))
}

fn tool_help(calculator: &Calculator, args: JsonValue) -> Result<JsonValue, McpError> {
    match opt_str(&args, "name")? {
        None => Ok(json!({
            "content": [{ "type": "text", "text": general_help(calculator) }]
        })),
        Some(name) => Ok(match calculator.help(name) {
            Ok(meta) => json!({
                "content": [{ "type": "text", "text": format_help(&meta) }],
                "data": meta
            }),
            Err(e) => tool_error(&e),
        }),
    }
}

fn general_help(calculator: &Calculator) -> String {
    let mut out = String::from("# matcalc\n\n");
    out.push_str("Enter matrices as text, one row per line, numbers separated by spaces or tabs.\n");
    out.push_str("Blank lines are ignored. Every row must have the same number of values.\n\n");
    out.push_str("## Operations\n\n");
    for meta in calculator.list_operations(None) {
        out.push_str(&format!("- `{}` ({}): {}\n", meta.usage, meta.label, meta.description));
    }
    out
}

fn format_help(meta: &OperationMeta) -> String {
    let mut out = format!("# {} ({})\n\n{}\n\n**Usage:** `{}`\n\n", meta.name, meta.label, meta.description, meta.usage);
    if !meta.args.is_empty() {
        out.push_str("**Arguments:**\n");
        for arg in meta.args {
            out.push_str(&format!("- `{}` ({}): {}\n", arg.name, arg.typ, arg.description));
        }
        out.push('\n');
    }
    out.push_str(&format!("**Returns:** {}\n", meta.returns));
    if !meta.examples.is_empty() {
        out.push_str("\n**Examples:**\n");
        for ex in meta.examples {
            out.push_str(&format!("- `{}`\n", ex));
        }
    }
    out
}

/// Operation failures are tool results, not protocol errors
fn tool_error(e: &CalcError) -> JsonValue {
    json!({
        "content": [{ "type": "text", "text": format!("Error: {}", e.message) }],
        "error": {
            "code": e.code,
            "message": e.message,
            "suggestion": e.suggestion,
            "input": e.input()
        },
        "isError": true
    })
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Matrix(m) => json!({
            "type": "matrix",
            "rows": m.rows(),
            "cols": m.cols(),
            "data": m.to_rows()
        }),
        Value::Scalar(s) => json!({ "type": "scalar", "value": s }),
        Value::Error(e) => json!({ "type": "error", "code": e.code, "message": e.message }),
    }
}
