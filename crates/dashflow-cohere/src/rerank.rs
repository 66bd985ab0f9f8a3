//! Cohere rerank document compressor
//!
//! This module provides a document compressor that uses the Cohere Rerank API
//! to reorder documents by relevance to a query.

use async_trait::async_trait;
use dashflow::core::{
    config::RunnableConfig,
    config_loader::env_vars::{
        cohere_api_v1_url, env_string_or_default, COHERE_API_KEY, DEFAULT_COHERE_RERANK_ENDPOINT,
    },
    documents::{Document, DocumentCompressor},
    error::Error as DashFlowError,
    http_client::{self, json_with_limit, DEFAULT_RESPONSE_SIZE_LIMIT},
};
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "rerank-english-v3.0";

/// Request format for Cohere Rerank API
#[derive(Debug, Clone, Serialize)]
struct RerankRequest {
    query: String,
    documents: Vec<String>,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_chunks_per_doc: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_documents: Option<bool>,
}

/// Individual result from Cohere Rerank API
#[derive(Debug, Clone, Deserialize)]
pub struct RerankResult {
    pub index: usize,
    pub relevance_score: f64,
}

/// Response from Cohere Rerank API
#[derive(Debug, Clone, Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

/// Document compressor using Cohere's Rerank API
///
/// Reorders documents by relevance to a query using Cohere's specialized
/// reranking models. This is particularly useful for improving retrieval
/// results in RAG pipelines.
///
/// # Example
///
/// ```no_run
/// use dashflow_cohere::CohereRerank;
/// use dashflow::core::documents::{Document, DocumentCompressor};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let reranker = CohereRerank::new()
///     .with_api_key("your-api-key")
///     .with_model("rerank-english-v3.0")
///     .with_top_n(Some(3));
///
/// let documents = vec![
///     Document::new("Document about cats"),
///     Document::new("Document about dogs"),
///     Document::new("Document about birds"),
/// ];
///
/// let reranked = reranker
///     .compress_documents(documents, "cats", None)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CohereRerank {
    /// Cohere API key
    api_key: String,
    /// Model to use for reranking
    model: String,
    /// Number of documents to return (None = return all)
    top_n: Option<usize>,
    /// Maximum number of chunks per document
    max_chunks_per_doc: Option<usize>,
    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug to prevent API key exposure in logs
impl std::fmt::Debug for CohereRerank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohereRerank")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("top_n", &self.top_n)
            .field("max_chunks_per_doc", &self.max_chunks_per_doc)
            .field("client", &"[reqwest::Client]")
            .finish()
    }
}

impl CohereRerank {
    /// Try to create a new `CohereRerank` instance.
    ///
    /// Reads API key from `COHERE_API_KEY` environment variable if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn try_new() -> Result<Self, DashFlowError> {
        let api_key = env_string_or_default(COHERE_API_KEY, "");
        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            top_n: Some(3),
            max_chunks_per_doc: None,
            client: http_client::create_llm_client()?,
        })
    }

    /// Create a new `CohereRerank` instance
    ///
    /// Attempts to read the API key from the `COHERE_API_KEY` environment variable.
    /// If not set, you must call `.with_api_key()` before using the compressor.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. Use `try_new()` for fallible creation.
    #[allow(clippy::expect_used)] // Documented panic with try_new() alternative
    #[must_use]
    pub fn new() -> Self {
        Self::try_new().expect("Failed to create HTTP client for CohereRerank")
    }

    /// Set the Cohere API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the model to use for reranking
    ///
    /// Available models:
    /// - rerank-english-v3.0 (default)
    /// - rerank-multilingual-v3.0
    /// - rerank-english-v2.0
    /// - rerank-multilingual-v2.0
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the number of top documents to return
    ///
    /// If None, all documents are returned. If Some(n), only the top n
    /// documents by relevance score are returned.
    #[must_use]
    pub fn with_top_n(mut self, top_n: Option<usize>) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the maximum number of chunks per document
    #[must_use]
    pub fn with_max_chunks_per_doc(mut self, max_chunks: Option<usize>) -> Self {
        self.max_chunks_per_doc = max_chunks;
        self
    }

    /// Rerank documents and return results with scores
    ///
    /// This is a lower-level method that returns the raw reranking results
    /// including indices and relevance scores.
    pub async fn rerank(
        &self,
        documents: &[Document],
        query: &str,
    ) -> Result<Vec<RerankResult>, DashFlowError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        if self.api_key.is_empty() {
            return Err(DashFlowError::invalid_input(
                "COHERE_API_KEY not set. Set environment variable or use .with_api_key()",
            ));
        }

        // Extract document text content
        let doc_texts: Vec<String> = documents
            .iter()
            .map(|doc| doc.page_content.clone())
            .collect();

        let request = RerankRequest {
            query: query.to_string(),
            documents: doc_texts,
            model: self.model.clone(),
            top_n: self.top_n,
            max_chunks_per_doc: self.max_chunks_per_doc,
            return_documents: Some(false),
        };

        let url = cohere_api_v1_url(DEFAULT_COHERE_RERANK_ENDPOINT);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DashFlowError::network(format!("Failed to call Cohere Rerank API: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DashFlowError::api(format!(
                "Cohere Rerank API returned error {status}: {error_text}"
            )));
        }

        // M-216: Use size-limited JSON parsing to prevent memory exhaustion
        let rerank_response: RerankResponse =
            json_with_limit(response, DEFAULT_RESPONSE_SIZE_LIMIT).await.map_err(|e| {
                DashFlowError::api_format(format!("Failed to parse Cohere Rerank response: {e}"))
            })?;

        Ok(rerank_response.results)
    }
}

impl Default for CohereRerank {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentCompressor for CohereRerank {
    async fn compress_documents(
        &self,
        documents: Vec<Document>,
        query: &str,
        _config: Option<&RunnableConfig>,
    ) -> Result<Vec<Document>, DashFlowError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.rerank(&documents, query).await?;

        // Build reranked documents with relevance scores in metadata
        let mut compressed = Vec::new();
        for result in results {
            if result.index < documents.len() {
                let doc = &documents[result.index];
                let mut new_doc = doc.clone();
                new_doc
                    .metadata
                    .insert("relevance_score".to_string(), result.relevance_score.into());
                compressed.push(new_doc);
            }
        }

        Ok(compressed)
    }
}
