//! Nomic AI embeddings implementation.
//!
//! This module provides embeddings using Nomic's embedding API.
//! Nomic provides high-quality text embeddings with models:
//! - nomic-embed-text-v1: Original model (768 dimensions)
//! - nomic-embed-text-v1.5: Latest model (768 dimensions, default)
//!
//! # Example
//!
//! ```rust
//! use dashflow_nomic::embeddings::NomicEmbeddings;
//! use dashflow::core::embeddings::Embeddings;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = NomicEmbeddings::new()
//!     .with_model("nomic-embed-text-v1.5");
//!
//! // Embed a single query
//! let query_vector = embedder.embed_query("What is the meaning of life?").await?;
//! assert!(!query_vector.is_empty());
//!
//! // Embed multiple documents
//! let docs = vec![
//!     "The quick brown fox".to_string(),
//!     "jumps over the lazy dog".to_string(),
//! ];
//! let doc_vectors = embedder.embed_documents(&docs).await?;
//! assert_eq!(doc_vectors.len(), 2);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use dashflow::core::{
    config_loader::env_vars::{env_string, NOMIC_API_KEY},
    embeddings::Embeddings,
    rate_limiters::RateLimiter,
    retry::{with_retry, RetryPolicy},
    Error as DashFlowError,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default model for Nomic embeddings
const DEFAULT_MODEL: &str = "nomic-embed-text-v1.5";

/// Nomic API base URL
const NOMIC_API_BASE: &str = "https://api-atlas.nomic.ai";

/// Nomic embedding model integration.
///
/// Nomic provides high-quality text embeddings optimized for semantic search
/// and retrieval tasks. Supports different task types for optimal performance:
/// - `search_document`: For embedding documents in a corpus
/// - `search_query`: For embedding search queries
/// - `classification`: For classification tasks
/// - `clustering`: For clustering tasks
///
/// # Configuration
///
/// The API key can be set via:
/// - Constructor: `NomicEmbeddings::new().with_api_key("nk_...")`
/// - Environment: `NOMIC_API_KEY`
///
/// # Models
///
/// - `nomic-embed-text-v1.5` (default): 768 dimensions, latest model
/// - `nomic-embed-text-v1`: 768 dimensions, original model
///
/// # Task Types
///
/// Nomic embeddings support different task types:
/// - Documents use `search_document` task type
/// - Queries use `search_query` task type
/// - This improves retrieval quality compared to generic embeddings
pub struct NomicEmbeddings {
    /// HTTP client for API requests
    client: Client,
    /// Model name (e.g., "nomic-embed-text-v1.5")
    model: String,
    /// Nomic API key
    api_key: Option<String>,
    /// Embedding dimensionality (optional, for Matryoshka-capable models)
    dimensionality: Option<u32>,
    /// Retry policy for handling transient errors
    retry_policy: RetryPolicy,
    /// Optional rate limiter for controlling request rate
    rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl NomicEmbeddings {
    /// Try to create a new Nomic embeddings instance with default settings.
    ///
    /// Defaults:
    /// - Model: `nomic-embed-text-v1.5`
    /// - API key: from `NOMIC_API_KEY` environment variable
    ///
    /// # Errors
    ///
    /// Returns an error if `NOMIC_API_KEY` environment variable is not set.
    /// Use `with_api_key()` to set the key explicitly after creation.
    pub fn try_new() -> Result<Self, DashFlowError> {
        let api_key = env_string(NOMIC_API_KEY).ok_or_else(|| {
            DashFlowError::config(format!("{NOMIC_API_KEY} environment variable must be set"))
        })?;

        Ok(Self {
            client: Client::new(),
            model: DEFAULT_MODEL.to_string(),
            api_key: Some(api_key),
            dimensionality: None,
            retry_policy: RetryPolicy::exponential(3),
            rate_limiter: None,
        })
    }

    /// Create a new Nomic embeddings instance with default settings.
    ///
    /// Defaults:
    /// - Model: `nomic-embed-text-v1.5`
    /// - API key: from `NOMIC_API_KEY` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `NOMIC_API_KEY` environment variable is not set.
    /// Use `try_new()` for a fallible constructor, or `with_api_key()` to set the key explicitly.
    #[must_use]
    #[allow(clippy::expect_used)] // Documented panic with try_new() fallible alternative
    pub fn new() -> Self {
        Self::try_new().expect("NOMIC_API_KEY environment variable must be set")
    }

    /// Create a new instance without requiring environment variables.
    ///
    /// You must call `with_api_key()` before using this instance.
    ///
    /// Defaults:
    /// - Model: `nomic-embed-text-v1.5`
    #[must_use]
    pub fn new_without_api_key() -> Self {
        Self {
            client: Client::new(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            dimensionality: None,
            retry_policy: RetryPolicy::exponential(3),
            rate_limiter: None,
        }
    }

    /// Set the API key explicitly instead of using environment variable.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dashflow_nomic::embeddings::NomicEmbeddings;
    ///
    /// let embedder = NomicEmbeddings::new_without_api_key()
    ///     .with_api_key("nk_your_api_key_here");
    /// ```
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model to use for embeddings.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dashflow_nomic::embeddings::NomicEmbeddings;
    ///
    /// let embedder = NomicEmbeddings::new_without_api_key()
    ///     .with_model("nomic-embed-text-v1");
    /// ```
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding dimensionality (for Matryoshka-capable models).
    ///
    /// This allows you to reduce the embedding size for storage efficiency
    /// while maintaining most of the semantic information.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dashflow_nomic::embeddings::NomicEmbeddings;
    ///
    /// let embedder = NomicEmbeddings::new_without_api_key()
    ///     .with_dimensionality(512);  // Reduce from 768 to 512
    /// ```
    #[must_use]
    pub fn with_dimensionality(mut self, dimensionality: u32) -> Self {
        self.dimensionality = Some(dimensionality);
        self
    }

    /// Set custom retry policy for handling transient errors.
    ///
    /// By default, uses exponential backoff with 3 retries. This method allows
    /// you to customize the retry behavior.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dashflow_nomic::embeddings::NomicEmbeddings;
    /// use dashflow::core::retry::RetryPolicy;
    ///
    /// // Custom retry policy: 5 retries with exponential backoff
    /// let embedder = NomicEmbeddings::new_without_api_key()
    ///     .with_api_key("nk_your_api_key")
    ///     .with_retry_policy(RetryPolicy::exponential(5));
    ///
    /// // Disable retries
    /// let embedder_no_retry = NomicEmbeddings::new_without_api_key()
    ///     .with_api_key("nk_your_api_key")
    ///     .with_retry_policy(RetryPolicy::no_retry());
    /// ```
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Set a rate limiter to control request rate to the Nomic API.
    ///
    /// This is useful to avoid hitting rate limits, especially with free-tier
    /// API keys that have strict rate limits.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dashflow_nomic::embeddings::NomicEmbeddings;
    /// use dashflow::core::rate_limiters::InMemoryRateLimiter;
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// // Limit to 10 requests per second
    /// let rate_limiter = Arc::new(InMemoryRateLimiter::new(
    ///     10.0,
    ///     Duration::from_millis(100),
    ///     20.0,
    /// ));
    ///
    /// let embedder = NomicEmbeddings::new_without_api_key()
    ///     .with_api_key("nk_your_api_key")
    ///     .with_rate_limiter(rate_limiter);
    /// ```
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    /// Internal method to call the Nomic API for embeddings.
    async fn embed_with_task_type(
        &self,
        texts: &[String],
        task_type: &str,
    ) -> Result<Vec<Vec<f32>>, DashFlowError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| DashFlowError::invalid_input("API key not set"))?;

        // Acquire rate limiter token if configured
        if let Some(ref limiter) = self.rate_limiter {
            limiter.acquire().await;
        }

        let url = format!("{NOMIC_API_BASE}/v1/embedding/text");

        let request_body = EmbedRequest {
            texts: texts.to_vec(),
            model: self.model.clone(),
            task_type: task_type.to_string(),
            dimensionality: self.dimensionality,
        };

        // Wrap API call with retry logic
        let client = self.client.clone();
        let api_key = api_key.clone();
        let response = with_retry(&self.retry_policy, || async {
            let response = client
                .post(&url)
                .header("Authorization", format!("Bearer {api_key}"))
                .json(&request_body)
                .send()
                .await
                .map_err(|e| DashFlowError::http(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(DashFlowError::http(format!(
                    "Nomic API error ({status}): {error_text}"
                )));
            }

            Ok(response)
        })
        .await?;

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| DashFlowError::api_format(format!("Failed to parse response: {e}")))?;

        Ok(embed_response.embeddings)
    }
}

impl Default for NomicEmbeddings {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embeddings for NomicEmbeddings {
    /// Embed a list of documents.
    ///
    /// Uses the `search_document` task type for optimal document embedding.
    ///
    /// # Arguments
    ///
    /// * `texts` - Slice of strings to embed
    ///
    /// # Returns
    ///
    /// A vector of embeddings, one per input text.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    async fn _embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DashFlowError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.embed_with_task_type(texts, "search_document").await
    }

    /// Embed a single query string.
    ///
    /// Uses the `search_query` task type for optimal query embedding.
    ///
    /// # Arguments
    ///
    /// * `text` - The query string to embed
    ///
    /// # Returns
    ///
    /// A single embedding vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    async fn _embed_query(&self, text: &str) -> Result<Vec<f32>, DashFlowError> {
        let texts = vec![text.to_string()];
        let mut embeddings = self.embed_with_task_type(&texts, "search_query").await?;
        embeddings
            .pop()
            .ok_or_else(|| DashFlowError::api_format("No embedding returned from API"))
    }
}

/// Request body for Nomic embedding API
#[derive(Debug, Serialize)]
struct EmbedRequest {
    texts: Vec<String>,
    model: String,
    task_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensionality: Option<u32>,
}

/// Response from Nomic embedding API
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}
