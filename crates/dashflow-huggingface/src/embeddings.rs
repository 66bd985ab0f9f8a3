// Allow clippy warnings for this module
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::clone_on_ref_ptr)]
#![allow(clippy::needless_pass_by_value, clippy::redundant_clone)]

//! `HuggingFace` Hub embeddings implementation.
//!
//! This module provides embeddings using `HuggingFace` Hub's Inference API for embedding models.
//!
//! # Example
//!
//! ```rust
//! use dashflow_huggingface::embeddings::HuggingFaceEmbeddings;
//! use dashflow::{embed, embed_query};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = Arc::new(
//!     HuggingFaceEmbeddings::new().with_model("sentence-transformers/all-mpnet-base-v2"),
//! );
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
use dashflow::core::config_loader::env_vars::{env_string, HF_TOKEN, HUGGINGFACEHUB_API_TOKEN};
use dashflow::core::{
    embeddings::Embeddings,
    rate_limiters::RateLimiter,
    retry::{with_retry, RetryPolicy},
    Error as DashFlowError,
};
use reqwest::Client;
use std::sync::Arc;

/// Default model for `HuggingFace` embeddings
const DEFAULT_MODEL: &str = "sentence-transformers/all-mpnet-base-v2";

/// `HuggingFace` Hub Inference API base URL
const HUGGINGFACE_API_BASE: &str = "https://api-inference.huggingface.co";

/// `HuggingFace` Hub embedding model integration.
///
/// Uses `HuggingFace` Hub's Inference API to generate embeddings from text.
/// Requires a `HuggingFace` API token which can be obtained from <https://huggingface.co/settings/tokens>
///
/// # Configuration
///
/// The API token can be set via:
/// - Constructor: `HuggingFaceEmbeddings::new().with_api_token("hf_...")`
/// - Environment: `HUGGINGFACEHUB_API_TOKEN` or `HF_TOKEN`
///
/// # Supported Models
///
/// Any `HuggingFace` model that supports the "feature-extraction" task, including:
/// - `sentence-transformers/all-mpnet-base-v2` (default): 768-dim embeddings
/// - `sentence-transformers/all-MiniLM-L6-v2`: 384-dim, fast and efficient
/// - `BAAI/bge-large-en-v1.5`: 1024-dim, high-quality embeddings
/// - `thenlper/gte-large`: 1024-dim, General Text Embeddings
///
/// # Rate Limiting
///
/// The Inference API has rate limits for free tier users. Consider using a Pro subscription
/// or deploying your own inference endpoint for production use.
pub struct HuggingFaceEmbeddings {
    /// HTTP client for API requests
    client: Client,
    /// Model name (e.g., "sentence-transformers/all-mpnet-base-v2")
    model: String,
    /// `HuggingFace` API token
    api_token: Option<String>,
    /// Additional model parameters
    model_kwargs: Option<serde_json::Value>,
    /// Retry policy for API calls
    retry_policy: RetryPolicy,
    /// Optional rate limiter to control request rate
    rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl HuggingFaceEmbeddings {
    /// Create a new `HuggingFace` embeddings instance with default settings.
    ///
    /// Defaults:
    /// - Model: `sentence-transformers/all-mpnet-base-v2`
    /// - API token: from `HUGGINGFACEHUB_API_TOKEN` or `HF_TOKEN` environment variable
    ///
    /// # Panics
    ///
    /// Panics if neither `HUGGINGFACEHUB_API_TOKEN` nor `HF_TOKEN` environment variables are set.
    /// Use `with_api_token()` to set the token explicitly.
    #[must_use]
    pub fn new() -> Self {
        let api_token = env_string(HUGGINGFACEHUB_API_TOKEN)
            .or_else(|| env_string(HF_TOKEN))
            .expect("HUGGINGFACEHUB_API_TOKEN or HF_TOKEN environment variable must be set");

        Self {
            client: Client::new(),
            model: DEFAULT_MODEL.to_string(),
            api_token: Some(api_token),
            model_kwargs: None,
            retry_policy: RetryPolicy::exponential(3),
            rate_limiter: None,
        }
    }

    /// Create a new instance without requiring environment variables.
    ///
    /// You must call `with_api_token()` before using this instance.
    #[must_use]
    pub fn new_without_token() -> Self {
        Self {
            client: Client::new(),
            model: DEFAULT_MODEL.to_string(),
            api_token: None,
            model_kwargs: None,
            retry_policy: RetryPolicy::exponential(3),
            rate_limiter: None,
        }
    }

    /// Set the model to use.
    ///
    /// # Example
    /// ```
    /// use dashflow_huggingface::embeddings::HuggingFaceEmbeddings;
    ///
    /// let embedder = HuggingFaceEmbeddings::new_without_token()
    ///     .with_model("sentence-transformers/all-MiniLM-L6-v2");
    /// ```
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API token.
    ///
    /// # Example
    /// ```
    /// use dashflow_huggingface::embeddings::HuggingFaceEmbeddings;
    ///
    /// let embedder = HuggingFaceEmbeddings::new_without_token()
    ///     .with_api_token("hf_...");
    /// ```
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set additional model parameters.
    ///
    /// # Example
    /// ```
    /// use dashflow_huggingface::embeddings::HuggingFaceEmbeddings;
    /// use serde_json::json;
    ///
    /// let embedder = HuggingFaceEmbeddings::new_without_token()
    ///     .with_model_kwargs(json!({"wait_for_model": true}));
    /// ```
    #[must_use]
    pub fn with_model_kwargs(mut self, kwargs: serde_json::Value) -> Self {
        self.model_kwargs = Some(kwargs);
        self
    }

    /// Set the retry policy for API calls.
    ///
    /// Default is exponential backoff with 3 retries.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dashflow_huggingface::embeddings::HuggingFaceEmbeddings;
    /// # use dashflow::core::retry::RetryPolicy;
    /// let embeddings = HuggingFaceEmbeddings::new_without_token()
    ///     .with_api_token("hf_...")
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
    /// # use dashflow_huggingface::embeddings::HuggingFaceEmbeddings;
    /// # use dashflow::core::rate_limiters::InMemoryRateLimiter;
    /// # use std::time::Duration;
    /// # use std::sync::Arc;
    /// let rate_limiter = InMemoryRateLimiter::new(
    ///     10.0,  // 10 requests per second
    ///     Duration::from_millis(100),  // Check every 100ms
    ///     20.0,  // Max burst of 20 requests
    /// );
    ///
    /// let embeddings = HuggingFaceEmbeddings::new_without_token()
    ///     .with_api_token("hf_...")
    ///     .with_rate_limiter(Arc::new(rate_limiter));
    /// ```
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Internal method to call the `HuggingFace` Inference API.
    async fn feature_extraction(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DashFlowError> {
        let api_token = self
            .api_token
            .as_ref()
            .ok_or_else(|| DashFlowError::invalid_input("API token not set"))?
            .clone();

        // Acquire rate limiter token if configured
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        // Replace newlines which can negatively affect performance
        let processed_texts: Vec<String> = texts.iter().map(|t| t.replace('\n', " ")).collect();

        let url = format!(
            "{}/pipeline/feature-extraction/{}",
            HUGGINGFACE_API_BASE, self.model
        );

        let mut request_body = serde_json::json!({
            "inputs": processed_texts,
        });

        // Merge model_kwargs if present
        if let Some(kwargs) = &self.model_kwargs {
            if let Some(obj) = request_body.as_object_mut() {
                if let Some(kwargs_obj) = kwargs.as_object() {
                    for (k, v) in kwargs_obj {
                        obj.insert(k.clone(), v.clone());
                    }
                }
            }
        }

        // Clone values for retry closure
        let client = self.client.clone();
        let url = url.clone();
        let request_body = request_body.clone();

        // Execute with retry logic
        let response = with_retry(&self.retry_policy, || async {
            let response = client
                .post(&url)
                .header("Authorization", format!("Bearer {api_token}"))
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
                    "HuggingFace API error ({status}): {error_text}"
                )));
            }

            Ok(response)
        })
        .await?;

        let embeddings: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|e| DashFlowError::api_format(e.to_string()))?;

        Ok(embeddings)
    }
}

impl Default for HuggingFaceEmbeddings {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embeddings for HuggingFaceEmbeddings {
    /// Embed multiple documents.
    ///
    /// # Arguments
    ///
    /// * `texts` - A slice of strings to embed
    ///
    /// # Returns
    ///
    /// A vector of embeddings, one for each input text.
    async fn _embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DashFlowError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.feature_extraction(texts.to_vec()).await
    }

    /// Embed a single query string.
    ///
    /// # Arguments
    ///
    /// * `text` - The text to embed
    ///
    /// # Returns
    ///
    /// An embedding vector for the query.
    async fn _embed_query(&self, text: &str) -> Result<Vec<f32>, DashFlowError> {
        let embeddings = self.feature_extraction(vec![text.to_string()]).await?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DashFlowError::api_format("No embedding returned"))
    }
}
