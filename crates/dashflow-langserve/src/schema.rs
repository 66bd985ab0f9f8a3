//! Request and response schemas for `LangServe` API

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Request for /invoke endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// The input to pass to the runnable
    pub input: Value,

    /// Optional configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RunnableConfig>,

    /// Additional keyword arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<Value>,
}

/// Response from /invoke endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// The output from the runnable
    pub output: Value,

    /// Metadata about the invocation
    pub metadata: InvokeMetadata,
}

/// Request for /batch endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// The inputs to pass to the runnable
    pub inputs: Vec<Value>,

    /// Optional configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RunnableConfig>,

    /// Optional per-input configurations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configs: Option<Vec<RunnableConfig>>,

    /// Additional keyword arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<Value>,
}

/// Response from /batch endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    /// The outputs from the runnable
    pub output: Vec<Value>,

    /// Metadata about the batch invocation
    pub metadata: BatchMetadata,
}

/// Request for /stream endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRequest {
    /// The input to pass to the runnable
    pub input: Value,

    /// Optional configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RunnableConfig>,

    /// Additional keyword arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<Value>,
}

/// Runnable configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnableConfig {
    /// Tags for this run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Metadata for this run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// Run name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,

    /// Maximum concurrency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Recursion limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursion_limit: Option<usize>,

    /// Configurable fields (extensible)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<Value>,
}

/// Metadata for a single invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeMetadata {
    /// Unique run ID
    pub run_id: Uuid,

    /// Feedback tokens (for tracing systems)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feedback_tokens: Vec<String>,
}

/// Metadata for a batch invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Run IDs for each input
    pub run_ids: Vec<Uuid>,
}

/// Schema endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    /// JSON schema
    pub schema: Value,
}

/// Server-sent event for streaming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Event type (data, metadata, error, end)
    pub event: String,

    /// Event data
    pub data: Value,
}

impl InvokeMetadata {
    /// Create new metadata with a generated run ID
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            feedback_tokens: Vec::new(),
        }
    }

    /// Create metadata with a specific run ID
    #[must_use]
    pub fn with_run_id(run_id: Uuid) -> Self {
        Self {
            run_id,
            feedback_tokens: Vec::new(),
        }
    }
}

impl Default for InvokeMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchMetadata {
    /// Create new batch metadata with the given number of runs
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            run_ids: (0..count).map(|_| Uuid::new_v4()).collect(),
        }
    }
}
