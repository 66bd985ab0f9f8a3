//! JSON parsing and querying tool for `DashFlow` Rust.
//!
//! This crate provides tools for parsing JSON data and querying it using `JSONPath` expressions.
//!
//! # Features
//!
//! - Parse and validate JSON strings
//! - Query JSON data using `JSONPath` expressions
//! - Pretty-print JSON output
//! - Extract specific values from complex JSON structures
//!
//! # Example
//!
//! ```rust
//! use dashflow_json_tool::JsonTool;
//! use dashflow::core::tools::{Tool, ToolInput};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let tool = JsonTool::new();
//!
//! // Parse and pretty-print JSON
//! let input = json!({
//!     "query": r#"{"name":"Alice","age":30}"#
//! });
//! let result = tool._call(ToolInput::Structured(input)).await.unwrap();
//! assert!(result.contains("Alice"));
//!
//! // Query JSON with JSONPath
//! let input = json!({
//!     "json": r#"{"users":[{"name":"Alice","age":30},{"name":"Bob","age":25}]}"#,
//!     "path": "$.users[0].name"
//! });
//! let result = tool._call(ToolInput::Structured(input)).await.unwrap();
//! assert!(result.contains("Alice"));
//! # });
//! ```
//!
//! # See Also
//!
//! - [`Tool`] - The trait this implements
//! - [`dashflow-file-tool`](https://docs.rs/dashflow-file-tool) - File reading/writing tools (can work with JSON files)
//! - [`dashflow-webscrape`](https://docs.rs/dashflow-webscrape) - Web scraping tool (often returns JSON)
//! - [serde_json_path Documentation](https://docs.rs/serde_json_path/) - JSONPath implementation

use async_trait::async_trait;
use dashflow::core::tools::{Tool, ToolInput};
use dashflow::core::Error;
use serde_json::json;
use serde_json_path::JsonPath;

/// JSON parsing and querying tool.
///
/// This tool provides two main operations:
/// 1. **Parse**: Validate and pretty-print JSON strings
/// 2. **Query**: Extract values from JSON using `JSONPath` expressions
///
/// # Input Formats
///
/// ## Simple Parse (String Input)
/// ```json
/// "{\"name\":\"Alice\",\"age\":30}"
/// ```
///
/// ## Parse with Structured Input
/// ```json
/// {
///     "query": "{\"name\":\"Alice\",\"age\":30}"
/// }
/// ```
///
/// ## Query with `JSONPath`
/// ```json
/// {
///     "json": "{\"users\":[{\"name\":\"Alice\"}]}",
///     "path": "$.users[0].name"
/// }
/// ```
///
/// # `JSONPath` Syntax
///
/// - `$` - Root object
/// - `.field` - Access field
/// - `[n]` - Array index
/// - `[*]` - All array elements
/// - `..field` - Recursive descent
/// - `[?(@.field > value)]` - Filter expression
///
/// # Example
///
/// ```rust
/// use dashflow_json_tool::JsonTool;
/// use dashflow::core::tools::Tool;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let tool = JsonTool::new();
///
/// // Simple parse
/// let result = tool._call_str(r#"{"name":"Alice","age":30}"#.to_string()).await.unwrap();
/// println!("{}", result);
///
/// // JSONPath query
/// let input = json!({
///     "json": r#"{"users":[{"name":"Alice","age":30},{"name":"Bob","age":25}]}"#,
///     "path": "$.users[*].name"
/// });
/// let result = tool._call(dashflow::core::tools::ToolInput::Structured(input)).await.unwrap();
/// println!("{}", result);
/// # });
/// ```
#[derive(Clone, Debug, Default)]
pub struct JsonTool {}

impl JsonTool {
    /// Creates a new JSON tool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dashflow_json_tool::JsonTool;
    ///
    /// let tool = JsonTool::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Parse JSON string and return pretty-printed format.
    fn parse_json(&self, json_str: &str) -> Result<String, Error> {
        let value: serde_json::Value = serde_json::from_str(json_str)
            .map_err(|e| Error::tool_error(format!("Invalid JSON: {e}")))?;

        serde_json::to_string_pretty(&value)
            .map_err(|e| Error::tool_error(format!("Failed to format JSON: {e}")))
    }

    /// Query JSON using `JSONPath` expression.
    fn query_json(&self, json_str: &str, path: &str) -> Result<String, Error> {
        // Parse JSON
        let value: serde_json::Value = serde_json::from_str(json_str)
            .map_err(|e| Error::tool_error(format!("Invalid JSON: {e}")))?;

        // Parse JSONPath
        let json_path = JsonPath::parse(path)
            .map_err(|e| Error::tool_error(format!("Invalid JSONPath: {e}")))?;

        // Execute query
        let results = json_path.query(&value);
        let matches = results.all();

        if matches.is_empty() {
            return Ok("No matches found".to_string());
        }

        // Format results
        if matches.len() == 1 {
            serde_json::to_string_pretty(matches[0])
                .map_err(|e| Error::tool_error(format!("Failed to format result: {e}")))
        } else {
            let results_array: Vec<&serde_json::Value> = matches;
            serde_json::to_string_pretty(&results_array)
                .map_err(|e| Error::tool_error(format!("Failed to format results: {e}")))
        }
    }
}

#[async_trait]
impl Tool for JsonTool {
    fn name(&self) -> &'static str {
        "json_tool"
    }

    fn description(&self) -> &'static str {
        "Parse and query JSON data. \
         \
         Use this tool to: \
         1. Validate and pretty-print JSON strings \
         2. Extract values from JSON using JSONPath expressions \
         \
         Input formats: \
         - Simple string: Raw JSON to parse and format \
         - Structured with 'query': JSON to parse \
         - Structured with 'json' and 'path': Query JSON with JSONPath \
         \
         JSONPath examples: \
         - $.users[0].name - Get first user's name \
         - $.users[*].age - Get all user ages \
         - $..name - Get all 'name' fields recursively"
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "json": {
                    "type": "string",
                    "description": "JSON string to parse or query"
                },
                "path": {
                    "type": "string",
                    "description": "Optional JSONPath expression to query the JSON. Examples: '$.users[0].name', '$.users[*].age', '$..name'"
                },
                "query": {
                    "type": "string",
                    "description": "Alternative to 'json' - JSON string to parse"
                }
            },
            "oneOf": [
                {
                    "required": ["json", "path"],
                    "description": "Query JSON with JSONPath"
                },
                {
                    "required": ["json"],
                    "description": "Parse and format JSON"
                },
                {
                    "required": ["query"],
                    "description": "Parse and format JSON"
                }
            ]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        match input {
            ToolInput::String(json_str) => {
                // Simple parse mode
                self.parse_json(&json_str)
            }
            ToolInput::Structured(value) => {
                // Check for 'json' + 'path' (query mode)
                if let (Some(json_str), Some(path)) = (value.get("json"), value.get("path")) {
                    let json_str = json_str
                        .as_str()
                        .ok_or_else(|| Error::tool_error("'json' field must be a string"))?;
                    let path = path
                        .as_str()
                        .ok_or_else(|| Error::tool_error("'path' field must be a string"))?;
                    return self.query_json(json_str, path);
                }

                // Check for 'json' only (parse mode)
                if let Some(json_str) = value.get("json") {
                    let json_str = json_str
                        .as_str()
                        .ok_or_else(|| Error::tool_error("'json' field must be a string"))?;
                    return self.parse_json(json_str);
                }

                // Check for 'query' (parse mode)
                if let Some(query) = value.get("query") {
                    let json_str = query
                        .as_str()
                        .ok_or_else(|| Error::tool_error("'query' field must be a string"))?;
                    return self.parse_json(json_str);
                }

                Err(Error::tool_error(
                    "Invalid input: must provide 'json' or 'query' field",
                ))
            }
        }
    }
}
