//! LLM-based listwise document reranking
//!
//! This module implements zero-shot listwise document reranking using a language model.
//! Based on the paper: "Zero-Shot Listwise Document Reranking" (<https://arxiv.org/pdf/2305.02156.pdf>)
//!
//! # Overview
//!
//! `ListwiseRerank` uses an LLM to rerank documents by asking it to sort documents
//! by relevance to a query. Unlike pointwise approaches (which score documents individually)
//! or pairwise approaches (which compare pairs), listwise reranking considers all
//! documents together, potentially capturing relationships between documents.
//!
//! # Requirements
//!
//! The LLM must support tool calling / function calling (structured output).
//! Compatible models include:
//! - `OpenAI` (GPT-3.5, GPT-4)
//! - Anthropic Claude
//! - Mistral
//! - Other models with tool calling support
//!
//! # Example
//!
//! ```rust,ignore
//! use dashflow_document_compressors::LLMListwiseRerank;
//! use dashflow_openai::ChatOpenAI;
//! use dashflow::core::documents::Document;
//!
//! let llm = ChatOpenAI::with_config(Default::default()).with_model("gpt-4o-mini");
//! let reranker = LLMListwiseRerank::from_llm(llm, None).with_top_n(3);
//!
//! let documents = vec![
//!     Document::new("Sally is my friend from school"),
//!     Document::new("Steve is my friend from home"),
//!     Document::new("I didn't always like yogurt"),
//!     Document::new("I wonder why it's called football"),
//!     Document::new("Where's waldo"),
//! ];
//!
//! let reranked = reranker
//!     .compress_documents(documents, "Who is steve", None)
//!     .await?;
//!
//! assert_eq!(reranked.len(), 3);
//! assert!(reranked[0].page_content.contains("Steve"));
//! ```

use async_trait::async_trait;
use dashflow::core::documents::{Document, DocumentCompressor};
use dashflow::core::error::{Error, Result};
use dashflow::core::language_models::{ChatModel, ToolChoice, ToolDefinition};
use dashflow::core::messages::{BaseMessage, Message};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Default system prompt template for listwise reranking
const DEFAULT_SYSTEM_TEMPLATE: &str =
    "{context}\n\nSort the Documents by their relevance to the Query.";

/// Schema for the LLM's ranking output
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RankDocuments {
    /// List of document IDs sorted from most to least relevant
    #[serde(rename = "ranked_document_ids")]
    ranked_document_ids: Vec<usize>,
}

/// Document compressor using zero-shot listwise reranking with an LLM.
///
/// This compressor uses a language model to rerank documents by their relevance
/// to a query. It presents all documents to the LLM and asks it to sort them
/// by relevance using structured output (tool calling).
///
/// # Advantages
///
/// - Considers relationships between documents
/// - Can handle complex relevance judgments
/// - Works across many domains without training
///
/// # Disadvantages
///
/// - Slower than embedding-based approaches
/// - More expensive (LLM API calls)
/// - Limited by LLM context window
pub struct LLMListwiseRerank {
    /// Language model for reranking (must support tool calling)
    llm: Arc<dyn ChatModel>,
    /// System prompt template (must contain {context} and {query} placeholders)
    system_template: String,
    /// Number of top documents to return
    top_n: usize,
    /// Tool definition for structured output
    tool_definition: ToolDefinition,
}

impl LLMListwiseRerank {
    /// Create a new `LLMListwiseRerank` from a chat model.
    ///
    /// # Arguments
    ///
    /// * `llm` - Language model that supports tool calling / function calling
    /// * `system_template` - Optional custom system prompt. If None, uses default.
    ///   Must contain {context} placeholder for document listing.
    ///
    /// # Returns
    ///
    /// A new `LLMListwiseRerank` compressor with `top_n=3` by default.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use dashflow_openai::ChatOpenAI;
    ///
    /// let llm = ChatOpenAI::with_config(Default::default()).with_model("gpt-4o-mini");
    /// let reranker = LLMListwiseRerank::from_llm(llm, None);
    /// ```
    pub fn from_llm(llm: Arc<dyn ChatModel>, system_template: Option<String>) -> Self {
        let system_template =
            system_template.unwrap_or_else(|| DEFAULT_SYSTEM_TEMPLATE.to_string());

        // Define the tool/function for structured output
        let tool_definition = ToolDefinition {
            name: "rank_documents".to_string(),
            description: "Rank the documents by their relevance to the user question. \
                 Rank from most to least relevant."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "ranked_document_ids": {
                        "type": "array",
                        "items": {
                            "type": "integer"
                        },
                        "description": "The integer IDs of the documents, sorted from most to least relevant to the user question."
                    }
                },
                "required": ["ranked_document_ids"]
            }),
        };

        Self {
            llm,
            system_template,
            top_n: 3,
            tool_definition,
        }
    }

    /// Set the number of documents to return after reranking.
    ///
    /// # Arguments
    ///
    /// * `top_n` - Number of top documents to return
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let reranker = LLMListwiseRerank::from_llm(llm, None)
    ///     .with_top_n(5);
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

    /// Build the context string for the system prompt.
    ///
    /// Formats documents as:
    /// ```text
    /// Document ID: 0
    /// ```<doc content>```
    ///
    /// Document ID: 1
    /// ```<doc content>```
    ///
    /// Documents = [Document ID: 0, ..., Document ID: N-1]
    /// ```
    fn build_context(&self, documents: &[Document]) -> String {
        let mut context = String::new();

        for (index, doc) in documents.iter().enumerate() {
            context.push_str(&format!(
                "Document ID: {}\n```{}```\n\n",
                index, doc.page_content
            ));
        }

        let document_range = if documents.is_empty() {
            "empty list".to_string()
        } else {
            format!("Document ID: 0, ..., Document ID: {}", documents.len() - 1)
        };

        context.push_str(&format!("Documents = [{document_range}]"));
        context
    }
}

#[async_trait]
impl DocumentCompressor for LLMListwiseRerank {
    /// Rerank documents using LLM-based listwise sorting.
    ///
    /// Presents all documents to the LLM with their IDs and asks the LLM to
    /// return a ranked list of IDs sorted by relevance to the query.
    ///
    /// # Arguments
    ///
    /// * `documents` - Documents to rerank
    /// * `query` - Query to rank documents against
    /// * `_callbacks` - Optional callbacks (currently unused)
    ///
    /// # Returns
    ///
    /// Top-n documents sorted by LLM's relevance judgment.
    /// If LLM fails to provide valid ranking, returns documents in original order.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let reranked = reranker
    ///     .compress_documents(docs, "What is machine learning?", None)
    ///     .await?;
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

        // Build context with document IDs
        let context = self.build_context(&documents);

        // Create messages
        let system_content = self.system_template.replace("{context}", &context);
        let messages: Vec<BaseMessage> =
            vec![Message::system(system_content), Message::human(query)];

        // Call LLM with tool definition
        let tool_choice = ToolChoice::Required;
        let result = self
            .llm
            .generate(
                &messages,
                None,
                Some(std::slice::from_ref(&self.tool_definition)),
                Some(&tool_choice),
                None,
            )
            .await?;

        // Extract tool call from response
        if let Some(generation) = result.generations.first() {
            if let Message::AI { tool_calls, .. } = &generation.message {
                if !tool_calls.is_empty() {
                    if let Some(tool_call) = tool_calls.first() {
                        // Parse the tool call arguments
                        let parsed: RankDocuments = serde_json::from_value(tool_call.args.clone())
                            .map_err(|e| {
                                Error::OutputParsing(format!("Failed to parse ranking: {e}"))
                            })?;

                        // Reorder documents according to ranking
                        let mut reranked = Vec::new();
                        for &doc_id in &parsed.ranked_document_ids {
                            if doc_id < documents.len() {
                                reranked.push(documents[doc_id].clone());
                            }
                        }

                        // If ranking is incomplete, add remaining docs
                        for (i, doc) in documents.iter().enumerate() {
                            if !parsed.ranked_document_ids.contains(&i) {
                                reranked.push(doc.clone());
                            }
                        }

                        return Ok(reranked.into_iter().take(self.top_n).collect());
                    }
                }
            }
        }

        // Fallback: return documents in original order if LLM didn't provide ranking
        Ok(documents.into_iter().take(self.top_n).collect())
    }
}
