//! `OpenAPI` tool for `DashFlow`
//!
//! This crate provides tools for interacting with REST APIs via OpenAPI/Swagger specifications.
//! It can parse `OpenAPI` v3.0.x specs and execute API operations dynamically.
//!
//! # Example
//!
//! ```rust,no_run
//! use dashflow_openapi::OpenAPITool;
//! use dashflow::core::tools::Tool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load OpenAPI spec from URL
//! let tool = OpenAPITool::from_url(
//!     "https://petstore3.swagger.io/api/v3/openapi.json",
//!     None, // No auth
//! ).await?;
//!
//! // Execute a GET operation
//! let result = tool._call_str(
//!     r#"{"operation_id": "getPetById", "parameters": {"petId": 1}}"#.to_string()
//! ).await?;
//!
//! println!("Result: {}", result);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use dashflow::core::tools::{Tool, ToolInput};
use dashflow::core::Error;
use openapiv3::{OpenAPI, Operation, Parameter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use url::Url;

/// Authentication configuration for `OpenAPI` requests
#[derive(Clone)]
pub enum Authentication {
    /// No authentication
    None,
    /// API Key authentication (header-based)
    ApiKey {
        /// Header name (e.g., "X-API-Key")
        header_name: String,
        /// API key value
        api_key: String,
    },
    /// Bearer token authentication
    Bearer {
        /// Bearer token
        token: String,
    },
    /// Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },
}

// Custom Debug to prevent secret exposure in logs
impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Authentication::None => write!(f, "Authentication::None"),
            Authentication::ApiKey { header_name, .. } => f
                .debug_struct("Authentication::ApiKey")
                .field("header_name", header_name)
                .field("api_key", &"[REDACTED]")
                .finish(),
            Authentication::Bearer { .. } => f
                .debug_struct("Authentication::Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
            Authentication::Basic { username, .. } => f
                .debug_struct("Authentication::Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

/// `OpenAPI` tool that executes API operations based on `OpenAPI` spec
pub struct OpenAPITool {
    /// `OpenAPI` specification
    spec: OpenAPI,
    /// Base URL for API requests
    base_url: String,
    /// HTTP client
    client: Client,
    /// Authentication configuration
    auth: Authentication,
}

/// Input for `OpenAPI` tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAPIInput {
    /// Operation ID from `OpenAPI` spec (e.g., "getPetById")
    pub operation_id: String,
    /// Parameters for the operation (path, query, header params)
    #[serde(default)]
    pub parameters: HashMap<String, JsonValue>,
    /// Request body (for POST/PUT/PATCH operations)
    #[serde(default)]
    pub body: Option<JsonValue>,
}

impl OpenAPITool {
    /// Create a new `OpenAPI` tool from a specification URL
    ///
    /// # Arguments
    ///
    /// * `spec_url` - URL to the `OpenAPI` specification (JSON or YAML)
    /// * `auth` - Optional authentication configuration
    pub async fn from_url(spec_url: &str, auth: Option<Authentication>) -> Result<Self, Error> {
        let client = Client::new();
        let response = client
            .get(spec_url)
            .send()
            .await
            .map_err(|e| Error::tool_error(format!("Failed to fetch OpenAPI spec: {e}")))?;

        let spec_text = response
            .text()
            .await
            .map_err(|e| Error::tool_error(format!("Failed to read OpenAPI spec: {e}")))?;

        Self::from_str(&spec_text, auth)
    }

    /// Create a new `OpenAPI` tool from a specification string (JSON or YAML)
    ///
    /// # Arguments
    ///
    /// * `spec_text` - `OpenAPI` specification as a string
    /// * `auth` - Optional authentication configuration
    pub fn from_str(spec_text: &str, auth: Option<Authentication>) -> Result<Self, Error> {
        // Try parsing as JSON first, then YAML
        let spec: OpenAPI = serde_json::from_str(spec_text)
            .or_else(|_| {
                serde_yml::from_str(spec_text)
                    .map_err(|e| Error::tool_error(format!("Failed to parse OpenAPI spec: {e}")))
            })
            .map_err(|e| Error::tool_error(format!("Failed to parse OpenAPI spec: {e}")))?;

        // Extract base URL from servers
        let base_url = spec
            .servers
            .first()
            .map_or_else(|| "http://localhost".to_string(), |s| s.url.clone());

        Ok(Self {
            spec,
            base_url,
            client: Client::new(),
            auth: auth.unwrap_or(Authentication::None),
        })
    }

    /// Find an operation by operation ID
    fn find_operation(&self, operation_id: &str) -> Result<(&str, &str, &Operation), Error> {
        for (path, path_item_ref) in &self.spec.paths.paths {
            // Dereference the ReferenceOr<PathItem>
            let path_item = match path_item_ref {
                openapiv3::ReferenceOr::Item(item) => item,
                openapiv3::ReferenceOr::Reference { .. } => continue, // Skip references
            };

            let operations = [
                ("GET", path_item.get.as_ref()),
                ("POST", path_item.post.as_ref()),
                ("PUT", path_item.put.as_ref()),
                ("DELETE", path_item.delete.as_ref()),
                ("PATCH", path_item.patch.as_ref()),
            ];

            for (method, op) in operations {
                if let Some(operation) = op {
                    if let Some(op_id) = &operation.operation_id {
                        if op_id == operation_id {
                            return Ok((path, method, operation));
                        }
                    }
                }
            }
        }

        Err(Error::tool_error(format!(
            "Operation '{operation_id}' not found in OpenAPI spec"
        )))
    }

    /// Execute an API operation
    async fn execute_operation(
        &self,
        operation_id: &str,
        parameters: &HashMap<String, JsonValue>,
        body: Option<&JsonValue>,
    ) -> Result<String, Error> {
        let (path_template, method, operation) = self.find_operation(operation_id)?;

        // Build URL with path parameters
        let mut url_path = path_template.to_string();
        let mut query_params: Vec<(String, String)> = Vec::new();

        // Process parameters
        for param_or_ref in &operation.parameters {
            // For simplicity, only handle direct Parameter objects (not $ref)
            if let openapiv3::ReferenceOr::Item(param) = param_or_ref {
                let param_data = match param {
                    Parameter::Query { parameter_data, .. } => Some(parameter_data),
                    Parameter::Path { parameter_data, .. } => Some(parameter_data),
                    Parameter::Header { parameter_data, .. } => Some(parameter_data),
                    Parameter::Cookie { parameter_data, .. } => Some(parameter_data),
                };

                if let Some(data) = param_data {
                    if let Some(value) = parameters.get(&data.name) {
                        let value_str = match value {
                            JsonValue::String(s) => s.clone(),
                            JsonValue::Number(n) => n.to_string(),
                            JsonValue::Bool(b) => b.to_string(),
                            _ => value.to_string(),
                        };

                        match param {
                            Parameter::Path { .. } => {
                                url_path =
                                    url_path.replace(&format!("{{{}}}", data.name), &value_str);
                            }
                            Parameter::Query { .. } => {
                                query_params.push((data.name.clone(), value_str));
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        // Build full URL
        let full_url = format!("{}{}", self.base_url, url_path);
        let mut url =
            Url::parse(&full_url).map_err(|e| Error::tool_error(format!("Invalid URL: {e}")))?;
        url.query_pairs_mut().extend_pairs(query_params);

        // Build request
        let mut request = match method {
            "GET" => self.client.get(url.as_str()),
            "POST" => self.client.post(url.as_str()),
            "PUT" => self.client.put(url.as_str()),
            "DELETE" => self.client.delete(url.as_str()),
            "PATCH" => self.client.patch(url.as_str()),
            _ => {
                return Err(Error::tool_error(format!(
                    "Unsupported HTTP method: {method}"
                )))
            }
        };

        // Add authentication
        request = match &self.auth {
            Authentication::None => request,
            Authentication::ApiKey {
                header_name,
                api_key,
            } => request.header(header_name.as_str(), api_key.as_str()),
            Authentication::Bearer { token } => request.bearer_auth(token),
            Authentication::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        };

        // Add body for POST/PUT/PATCH
        if let Some(body_value) = body {
            if matches!(method, "POST" | "PUT" | "PATCH") {
                request = request.json(body_value);
            }
        }

        // Execute request
        let response = request
            .send()
            .await
            .map_err(|e| Error::tool_error(format!("API request failed: {e}")))?;

        // Get response body
        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| Error::tool_error(format!("Failed to read response: {e}")))?;

        if status.is_success() {
            Ok(response_text)
        } else {
            Err(Error::tool_error(format!(
                "API request failed with status {status}: {response_text}"
            )))
        }
    }

    /// List all available operations in the `OpenAPI` spec
    #[must_use]
    pub fn list_operations(&self) -> Vec<String> {
        let mut operations = Vec::new();

        for (_path, path_item_ref) in &self.spec.paths.paths {
            // Dereference the ReferenceOr<PathItem>
            let path_item = match path_item_ref {
                openapiv3::ReferenceOr::Item(item) => item,
                openapiv3::ReferenceOr::Reference { .. } => continue,
            };

            let ops = [
                &path_item.get,
                &path_item.post,
                &path_item.put,
                &path_item.delete,
                &path_item.patch,
            ];

            for op in ops.iter().filter_map(|o| o.as_ref()) {
                if let Some(op_id) = &op.operation_id {
                    operations.push(op_id.clone());
                }
            }
        }

        operations
    }
}

#[async_trait]
impl Tool for OpenAPITool {
    fn name(&self) -> &'static str {
        "openapi_tool"
    }

    fn description(&self) -> &'static str {
        "Execute API operations based on OpenAPI specification. \
         Input should be JSON with 'operation_id', 'parameters', and optional 'body' fields. \
         Example: {\"operation_id\": \"getPetById\", \"parameters\": {\"petId\": 1}}"
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let input_json = match input {
            ToolInput::String(s) => s,
            ToolInput::Structured(v) => serde_json::to_string(&v)
                .map_err(|e| Error::tool_error(format!("Failed to serialize input: {e}")))?,
        };

        let parsed_input: OpenAPIInput = serde_json::from_str(&input_json)
            .map_err(|e| Error::tool_error(format!("Invalid input format: {e}")))?;

        self.execute_operation(
            &parsed_input.operation_id,
            &parsed_input.parameters,
            parsed_input.body.as_ref(),
        )
        .await
    }
}
