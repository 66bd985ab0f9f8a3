//! Voyage AI embeddings implementation.
//!
//! This module provides embeddings using Voyage AI's embedding models, including:
//! - voyage-3.5: Latest general-purpose model
//! - voyage-3-large: High-performance large model
//! - voyage-3.5-lite: Efficient lightweight model
//! - voyage-code-3: Optimized for code
//! - voyage-finance-2: Optimized for financial documents
//! - voyage-law-2: Optimized for legal documents
//!
//! # Example
//!
//! ```rust,ignore
//! use dashflow_voyage::VoyageEmbeddings;
//! use dashflow::{embed, embed_query};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = Arc::new(VoyageEmbeddings::new()
//!     .with_api_key(std::env::var("VOYAGE_API_KEY")?));
//!
//! // Embed a single query
//! let query_vector = embed_query(embedder.clone(), "What is the meaning of life?").await?;
//! assert!(!query_vector.is_empty());
//!
//! // Embed multiple documents
//! let docs = vec![
//!     "The quick brown fox".to_string(),
//!     "jumps over the lazy dog".to_string(),
//! ];
//! let doc_vectors = embed(embedder, &docs).await?;
//! assert_eq!(doc_vectors.len(), 2);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use dashflow::core::{
    config_loader::env_vars::{env_string, VOYAGE_API_KEY as VOYAGE_API_KEY_VAR},
    embeddings::Embeddings,
    rate_limiters::RateLimiter,
    retry::{with_retry, RetryPolicy},
    Error as DashFlowError,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::VOYAGE_API_BASE;

const DEFAULT_MODEL: &str = "voyage-3.5";

/// Input type for embeddings, which optimizes the embedding for specific use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// No specific optimization
    None,
    /// Optimized for search queries
    Query,
    /// Optimized for documents to be searched
    Document,
}

/// Voyage AI embedding model integration.
///
/// Supports the following models:
/// - `voyage-3.5`: Latest general-purpose model (1024 dimensions default)
/// - `voyage-3-large`: High-performance large model (1024 dimensions)
/// - `voyage-3.5-lite`: Efficient lightweight model (512 dimensions)
/// - `voyage-code-3`: Optimized for code (1024 dimensions)
/// - `voyage-finance-2`: Optimized for financial documents (1024 dimensions)
/// - `voyage-law-2`: Optimized for legal documents (1024 dimensions)
///
/// # Configuration
///
/// The API key can be set via:
/// - Constructor: `VoyageEmbeddings::new().with_api_key("...")`
/// - Environment: `VOYAGE_API_KEY`
///
/// # Input Types
///
/// Voyage AI embeddings support different input types that optimize the embedding
/// for specific use cases. Use `with_input_type()` to set the input type.
///
/// # Dimensions
///
/// You can configure the output dimensionality with `with_dimensions()` to
/// reduce embedding size while maintaining semantic information.
pub struct VoyageEmbeddings {
    /// API key for authentication
    api_key: Option<String>,
    /// Model name (e.g., "voyage-3.5")
    model: String,
    /// HTTP client
    client: Client,
    /// Input type for embedding optimization
    input_type: Option<InputType>,
    /// Optional: The number of dimensions for the output embeddings
    output_dimension: Option<u32>,
    /// Whether to truncate inputs exceeding context length
    truncation: bool,
    /// Maximum number of texts to embed in a single batch request
    batch_size: usize,
    /// Retry policy for API calls
    retry_policy: RetryPolicy,
    /// Optional rate limiter to control request rate
    rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl VoyageEmbeddings {
    /// Create a new Voyage AI embeddings instance with default settings.
    ///
    /// Defaults:
    /// - Model: `voyage-3.5`
    /// - Batch size: 128
    /// - Truncation: true
    /// - API key: from `VOYAGE_API_KEY` environment variable
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_key: env_string(VOYAGE_API_KEY_VAR),
            model: DEFAULT_MODEL.to_string(),
            client: Client::new(),
            input_type: None,
            output_dimension: None,
            truncation: true,
            batch_size: 128,
            retry_policy: RetryPolicy::exponential(3),
            rate_limiter: None,
        }
    }

    /// Set the API key explicitly.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dashflow_voyage::VoyageEmbeddings;
    /// let embedder = VoyageEmbeddings::new()
    ///     .with_api_key("your-api-key");
    /// ```
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model name.
    ///
    /// # Supported Models
    ///
    /// - `voyage-3.5`: Latest general-purpose model
    /// - `voyage-3-large`: High-performance large model
    /// - `voyage-3.5-lite`: Efficient lightweight model
    /// - `voyage-code-3`: Optimized for code
    /// - `voyage-finance-2`: Optimized for financial documents
    /// - `voyage-law-2`: Optimized for legal documents
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dashflow_voyage::VoyageEmbeddings;
    /// let embedder = VoyageEmbeddings::new()
    ///     .with_model("voyage-code-3");
    /// ```
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the input type for embedding optimization.
    ///
    /// - `None`: No specific optimization
    /// - `Query`: For search queries
    /// - `Document`: For documents to be searched
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dashflow_voyage::{VoyageEmbeddings, InputType};
    /// let embedder = VoyageEmbeddings::new()
    ///     .with_input_type(InputType::Query);
    /// ```
    #[must_use]
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = Some(input_type);
        self
    }

    /// Set the output dimensionality for embeddings.
    ///
    /// Allows you to reduce the embedding size while maintaining semantic
    /// information, useful for storage optimization.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dashflow_voyage::VoyageEmbeddings;
    /// let embedder = VoyageEmbeddings::new()
    ///     .with_dimensions(512);
    /// ```
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.output_dimension = Some(dimensions);
        self
    }

    /// Set whether to truncate inputs exceeding context length.
    ///
    /// Default is true. If false, inputs exceeding the model's context
    /// length will return an error.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dashflow_voyage::VoyageEmbeddings;
    /// let embedder = VoyageEmbeddings::new()
    ///     .with_truncation(false);
    /// ```
    #[must_use]
    pub fn with_truncation(mut self, truncation: bool) -> Self {
        self.truncation = truncation;
        self
    }

    /// Set the batch size for batch embedding requests.
    ///
    /// Voyage AI's API allows up to 1000 texts per request, but the default
    /// is 128 for better performance.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dashflow_voyage::VoyageEmbeddings;
    /// let embedder = VoyageEmbeddings::new()
    ///     .with_batch_size(256);
    /// ```
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.min(1000); // Voyage API limit
        self
    }

    /// Set the retry policy for API calls.
    ///
    /// Default is exponential backoff with 3 retries.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dashflow_voyage::VoyageEmbeddings;
    /// # use dashflow::core::retry::RetryPolicy;
    /// let embedder = VoyageEmbeddings::new()
    ///     .with_retry_policy(RetryPolicy::exponential(5));
    /// ```
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set a rate limiter to control request rate.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dashflow_voyage::VoyageEmbeddings;
    /// # use dashflow::core::rate_limiters::InMemoryRateLimiter;
    /// # use std::time::Duration;
    /// # use std::sync::Arc;
    /// let rate_limiter = InMemoryRateLimiter::new(
    ///     10.0,  // 10 requests per second
    ///     Duration::from_millis(100),
    ///     20.0,  // Max burst
    /// );
    ///
    /// let embedder = VoyageEmbeddings::new()
    ///     .with_rate_limiter(Arc::new(rate_limiter));
    /// ```
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Get the API key, returning an error if not configured.
    fn get_api_key(&self) -> Result<&str, DashFlowError> {
        self.api_key.as_deref().ok_or_else(|| {
            DashFlowError::Configuration(
                "VOYAGE_API_KEY not set. Set it via environment variable or with_api_key()"
                    .to_string(),
            )
        })
    }

    /// Embed texts using the Voyage AI API.
    async fn embed_texts(
        &self,
        texts: &[String],
        input_type: Option<InputType>,
    ) -> Result<Vec<Vec<f32>>, DashFlowError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let api_key = self.get_api_key()?;
        let url = format!("{VOYAGE_API_BASE}/embeddings");

        let request = EmbedRequest {
            input: texts.to_vec(),
            model: self.model.clone(),
            input_type: input_type.or(self.input_type),
            truncation: Some(self.truncation),
            output_dimension: self.output_dimension,
        };

        // Acquire rate limiter token if configured
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        let response = with_retry(&self.retry_policy, || async {
            self.client
                .post(&url)
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| DashFlowError::api(format!("Voyage API request failed: {e}")))?
                .error_for_status()
                .map_err(|e| DashFlowError::api(format!("Voyage API error: {e}")))
        })
        .await?;

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| DashFlowError::api(format!("Failed to parse Voyage response: {e}")))?;

        Ok(embed_response
            .data
            .into_iter()
            .map(|e| e.embedding)
            .collect())
    }
}

impl Default for VoyageEmbeddings {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embeddings for VoyageEmbeddings {
    async fn _embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DashFlowError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        // Process in batches
        for chunk in texts.chunks(self.batch_size) {
            let batch_embeddings = self.embed_texts(chunk, Some(InputType::Document)).await?;
            all_embeddings.extend(batch_embeddings);
        }

        Ok(all_embeddings)
    }

    async fn _embed_query(&self, text: &str) -> Result<Vec<f32>, DashFlowError> {
        let texts = vec![text.to_string()];
        let mut embeddings = self.embed_texts(&texts, Some(InputType::Query)).await?;

        embeddings
            .pop()
            .ok_or_else(|| DashFlowError::api("No embedding returned from Voyage AI"))
    }
}

// Request/Response types for Voyage API

#[derive(Debug, Serialize)]
struct EmbedRequest {
    input: Vec<String>,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_type: Option<InputType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    truncation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimension: Option<u32>,
}

/// Voyage API response struct. Fields marked dead_code are present in API response
/// and required for serde deserialization, but not currently used.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
    #[allow(dead_code)] // Deserialize: Token usage - reserved for cost tracking
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[allow(dead_code)] // Deserialize: Original input index - reserved for batch reordering
    index: usize,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[allow(dead_code)] // Deserialize: Total tokens billed - reserved for cost tracking
    total_tokens: u32,
}
