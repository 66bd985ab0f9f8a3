//! LLM-based document extractor that extracts relevant parts
//!
//! This compressor uses an LLM to extract only the relevant parts of each document
//! that are needed to answer the query.

use async_trait::async_trait;
use dashflow::core::{
    config::RunnableConfig,
    documents::{Document, DocumentCompressor},
    error::{Error, Result},
    language_models::ChatModel,
    messages::{BaseMessage, Message, MessageContent},
    prompts::PromptTemplate,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Default prompt template for extracting relevant content
const DEFAULT_EXTRACT_PROMPT: &str = r"Given the following question and context, extract any part of the context *AS IS* that is relevant to answer the question. If none of the context is relevant return NO_OUTPUT.

Remember, *DO NOT* edit the extracted parts of the context.

> Question: {question}
> Context:
>>>
{context}
>>>
Extracted relevant parts:";

/// Marker for when no relevant content is found
const NO_OUTPUT_STR: &str = "NO_OUTPUT";

/// Type for the input constructor function
pub type GetInputFn = Arc<dyn Fn(&str, &Document) -> HashMap<String, String> + Send + Sync>;

/// Default function to construct input from query and document
fn default_get_input(query: &str, doc: &Document) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("question".to_string(), query.to_string());
    map.insert("context".to_string(), doc.page_content.clone());
    map
}

/// Document compressor that extracts relevant parts using an LLM
///
/// This compressor sends each document to an LLM with the query and asks it to extract
/// only the relevant parts. Documents with no relevant content are filtered out.
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_document_compressors::LLMChainExtractor;
/// use dashflow_openai::ChatOpenAI;
/// use dashflow::core::documents::Document;
///
/// let llm = ChatOpenAI::with_config(Default::default()).with_model("gpt-4o-mini");
/// let extractor = LLMChainExtractor::from_llm(llm, None)?;
///
/// let docs = vec![
///     Document::new("Rust is a systems programming language. It was created in 2010."),
/// ];
///
/// let extracted = extractor.compress_documents(docs, "When was Rust created?", None).await?;
/// // Returns document with only "It was created in 2010."
/// ```
pub struct LLMChainExtractor {
    /// The LLM to use for extraction
    llm: Arc<dyn ChatModel>,
    /// The prompt template to use (must include {question} and {context} variables)
    prompt: PromptTemplate,
    /// Function to construct input from query and document
    get_input: GetInputFn,
    /// String indicating no relevant content
    no_output_str: String,
}

impl LLMChainExtractor {
    /// Create a new extractor from an LLM and optional custom prompt
    ///
    /// # Arguments
    ///
    /// * `llm` - The language model to use for extraction
    /// * `prompt` - Optional custom prompt template. If None, uses default prompt.
    ///   Must include {question} and {context} variables.
    ///
    /// # Returns
    ///
    /// A new `LLMChainExtractor` instance
    pub fn from_llm(llm: Arc<dyn ChatModel>, prompt: Option<PromptTemplate>) -> Result<Self> {
        let prompt = match prompt {
            Some(p) => p,
            None => PromptTemplate::from_template(DEFAULT_EXTRACT_PROMPT)?,
        };

        // Validate that prompt has required variables
        let required_vars = vec!["question", "context"];
        for var in &required_vars {
            if !prompt.input_variables.contains(&(*var).to_string()) {
                return Err(Error::InvalidInput(format!(
                    "Prompt must include '{var}' variable"
                )));
            }
        }

        Ok(Self {
            llm,
            prompt,
            get_input: Arc::new(default_get_input),
            no_output_str: NO_OUTPUT_STR.to_string(),
        })
    }

    /// Set a custom input constructor function
    pub fn with_get_input(mut self, get_input: GetInputFn) -> Self {
        self.get_input = get_input;
        self
    }

    /// Set a custom no-output marker string
    #[must_use]
    pub fn with_no_output_str(mut self, no_output_str: String) -> Self {
        self.no_output_str = no_output_str;
        self
    }

    /// Parse the LLM output, returning None if no relevant content
    fn parse_output(&self, output: &str) -> Option<String> {
        let cleaned = output.trim();
        if cleaned.is_empty() || cleaned == self.no_output_str {
            None
        } else {
            Some(cleaned.to_string())
        }
    }
}

#[async_trait]
impl DocumentCompressor for LLMChainExtractor {
    async fn compress_documents(
        &self,
        documents: Vec<Document>,
        query: &str,
        config: Option<&RunnableConfig>,
    ) -> Result<Vec<Document>> {
        let mut compressed_docs = Vec::new();

        // Process each document
        for doc in documents {
            // Construct input
            let input = (self.get_input)(query, &doc);

            // Format prompt
            let prompt_text = self.prompt.format(&input)?;

            // Call LLM
            let messages: Vec<BaseMessage> = vec![Message::system(prompt_text)];

            let response = self
                .llm
                .generate(&messages, None, None, None, config)
                .await?;

            // Extract and parse output
            if let Some(msg) = response.generations.first() {
                let content = msg.message.content();
                if let MessageContent::Text(text) = content {
                    if let Some(extracted_content) = self.parse_output(text) {
                        let mut new_doc = Document::new(extracted_content);
                        new_doc.metadata = doc.metadata.clone();
                        compressed_docs.push(new_doc);
                    }
                }
            }
        }

        Ok(compressed_docs)
    }
}
