//! Document compressor using cross-encoder models for reranking
//!
//! This module provides a document compressor that uses cross-encoder models
//! to rerank documents based on their relevance to a query.
//!
//! # Overview
//!
//! Cross-encoders are neural models that directly score the relevance of
//! (query, document) pairs. They are more accurate than bi-encoder approaches
//! (like embeddings) but require scoring each pair individually, making them
//! slower for large document sets.
//!
//! Typical workflow:
//! 1. Use fast bi-encoder (embeddings) to retrieve top-k candidates (e.g., k=100)
//! 2. Use cross-encoder to rerank top-n results (e.g., n=10)
//!
//! # Implementation Requirements
//!
//! This compressor requires a `CrossEncoder` implementation. Options include:
//! - ONNX runtime with exported cross-encoder models
//! - API services providing cross-encoder scoring
//! - C++ bindings to sentence-transformers
//!
//! # Example
//!
//! ```rust,ignore
//! use dashflow_document_compressors::{CrossEncoderRerank, CrossEncoder};
//! use dashflow::core::documents::Document;
//!
//! // Assume we have a CrossEncoder implementation
//! let model: Box<dyn CrossEncoder> = get_cross_encoder_model();
//!
//! let reranker = CrossEncoderRerank::new(model)
//!     .with_top_n(3);
//!
//! let documents = vec![
//!     Document::new("Rust is a systems programming language"),
//!     Document::new("Python is great for data science"),
//!     Document::new("Rust has memory safety without garbage collection"),
//! ];
//!
//! let reranked = reranker
//!     .compress_documents(documents, "What is Rust?", None)
//!     .await?;
//!
//! // reranked will contain the top 3 documents sorted by relevance score
//! assert_eq!(reranked.len(), 3);
//! ```

use async_trait::async_trait;
use dashflow::core::documents::{Document, DocumentCompressor};
use dashflow::core::error::Result;

use crate::cross_encoder::CrossEncoder;

/// Document compressor that uses cross-encoder models for reranking.
///
/// Cross-encoders provide more accurate relevance scoring than bi-encoders
/// (embeddings) but are slower as they must score each (query, document) pair.
///
/// # Usage Pattern
///
/// 1. Retrieve candidates with fast bi-encoder (e.g., top-100)
/// 2. Rerank with cross-encoder (e.g., top-10)
/// 3. Use reranked results for downstream tasks
pub struct CrossEncoderRerank {
    /// Cross-encoder model for scoring query-document pairs
    model: Box<dyn CrossEncoder>,
    /// Number of top documents to return after reranking
    top_n: usize,
}

impl CrossEncoderRerank {
    /// Create a new `CrossEncoderRerank` compressor.
    ///
    /// # Arguments
    ///
    /// * `model` - A cross-encoder implementation for scoring documents
    ///
    /// # Default Values
    ///
    /// * `top_n` = 3 - Returns top 3 documents by default
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let model: Box<dyn CrossEncoder> = get_model();
    /// let reranker = CrossEncoderRerank::new(model);
    /// ```
    #[must_use]
    pub fn new(model: Box<dyn CrossEncoder>) -> Self {
        Self { model, top_n: 3 }
    }

    /// Set the number of documents to return after reranking.
    ///
    /// # Arguments
    ///
    /// * `top_n` - Number of documents to return
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let reranker = CrossEncoderRerank::new(model).with_top_n(5);
    /// ```
    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Get the current `top_n` setting.
    #[must_use]
    pub fn top_n(&self) -> usize {
        self.top_n
    }
}

#[async_trait]
impl DocumentCompressor for CrossEncoderRerank {
    /// Rerank documents using cross-encoder model.
    ///
    /// Scores each (query, `document.page_content`) pair and returns the
    /// top-n documents sorted by relevance score (highest first).
    ///
    /// # Arguments
    ///
    /// * `documents` - Documents to rerank
    /// * `query` - Query to compare documents against
    /// * `_callbacks` - Optional callbacks (currently unused)
    ///
    /// # Returns
    ///
    /// Top-n documents sorted by relevance score (highest to lowest).
    /// The `relevance_score` is added to each document's metadata.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let reranked = reranker
    ///     .compress_documents(docs, "machine learning", None)
    ///     .await?;
    ///
    /// for doc in reranked {
    ///     if let Some(score) = doc.metadata.get("relevance_score") {
    ///         println!("Score: {}", score);
    ///     }
    /// }
    /// ```
    async fn compress_documents(
        &self,
        documents: Vec<Document>,
        query: &str,
        _config: Option<&dashflow::core::config::RunnableConfig>,
    ) -> Result<Vec<Document>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        // Create (query, document) pairs for scoring
        let text_pairs: Vec<(String, String)> = documents
            .iter()
            .map(|doc| (query.to_string(), doc.page_content.clone()))
            .collect();

        // Score all pairs
        let scores = self.model.score(text_pairs).await?;

        // Zip documents with their scores
        let mut docs_with_scores: Vec<(Document, f32)> =
            documents.into_iter().zip(scores).collect();

        // Sort by score descending (highest relevance first)
        docs_with_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        // Take top-n and add relevance scores to metadata
        let result: Vec<Document> = docs_with_scores
            .into_iter()
            .take(self.top_n)
            .map(|(mut doc, score)| {
                doc.metadata
                    .insert("relevance_score".to_string(), serde_json::json!(score));
                doc
            })
            .collect();

        Ok(result)
    }
}
