//! Vector store-backed memory for semantic retrieval of conversation history.
//!
//! Stores conversation in a vector store and retrieves semantically relevant
//! past conversations based on the current input.

use crate::{utils::get_prompt_input_key, BaseMemory, MemoryError, MemoryResult};
use async_trait::async_trait;
use dashflow::core::{documents::Document, vector_stores::VectorStore};
use std::collections::HashMap;

/// Memory backed by a `VectorStoreRetriever`.
///
/// Stores conversation history in a vector store and retrieves semantically relevant
/// past conversations based on the current input. This enables the system to recall
/// relevant context from earlier in long conversations, even if not immediately recent.
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_memory::VectorStoreRetrieverMemory;
/// use dashflow::core::vector_stores::InMemoryVectorStore;
/// use dashflow::core::retrievers::VectorStoreRetriever;
///
/// // Create a vector store and retriever
/// let vector_store = InMemoryVectorStore::new(embeddings);
/// let retriever = VectorStoreRetriever::from_vectorstore(vector_store);
///
/// // Create memory
/// let memory = VectorStoreRetrieverMemory::new(retriever);
///
/// // Use in a conversation
/// memory.save_context(&inputs, &outputs).await?;
/// let vars = memory.load_memory_variables(&inputs).await?;
/// ```
///
/// # Python Baseline Compatibility
///
/// Matches `dashflow.memory.vectorstore.VectorStoreRetrieverMemory`.
/// Source: ~/`dashflow/libs/dashflow/dashflow_classic/memory/vectorstore.py` (lines 23-123)
#[derive(Clone)]
pub struct VectorStoreRetrieverMemory<VS>
where
    VS: VectorStore,
{
    /// The vector store to use for storage and retrieval
    vector_store: VS,

    /// Key name to locate the memories in the result of `load_memory_variables`
    memory_key: String,

    /// Key name to index the inputs to `load_memory_variables`
    input_key: Option<String>,

    /// Whether to return Document objects or joined strings
    return_docs: bool,

    /// Input keys to exclude when constructing the document (in addition to `memory_key`)
    exclude_input_keys: Vec<String>,

    /// Number of documents to retrieve (k parameter)
    k: usize,
}

impl<VS> VectorStoreRetrieverMemory<VS>
where
    VS: VectorStore,
{
    /// Create a new `VectorStoreRetrieverMemory`.
    ///
    /// # Arguments
    ///
    /// * `vector_store` - The vector store to use for storage and retrieval
    pub fn new(vector_store: VS) -> Self {
        Self {
            vector_store,
            memory_key: "history".to_string(),
            input_key: None,
            return_docs: false,
            exclude_input_keys: Vec::new(),
            k: 4, // Default from Python
        }
    }

    /// Set the memory key used in `load_memory_variables` output.
    pub fn with_memory_key(mut self, key: impl Into<String>) -> Self {
        self.memory_key = key.into();
        self
    }

    /// Set the input key to use for querying.
    pub fn with_input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = Some(key.into());
        self
    }

    /// Set whether to return Document objects (true) or joined strings (false).
    pub fn with_return_docs(mut self, return_docs: bool) -> Self {
        self.return_docs = return_docs;
        self
    }

    /// Set input keys to exclude when constructing documents.
    pub fn with_exclude_input_keys(mut self, keys: Vec<String>) -> Self {
        self.exclude_input_keys = keys;
        self
    }

    /// Set the number of documents to retrieve.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Get the input key for the prompt from the inputs dict.
    fn get_prompt_input_key(&self, inputs: &HashMap<String, String>) -> MemoryResult<String> {
        if let Some(ref key) = self.input_key {
            return Ok(key.clone());
        }
        get_prompt_input_key(inputs, std::slice::from_ref(&self.memory_key))
            .map_err(|e| MemoryError::OperationFailed(e.to_string()))
    }

    /// Convert retrieved documents to memory variables.
    fn documents_to_memory_variables(
        &self,
        docs: Vec<Document>,
    ) -> MemoryResult<HashMap<String, String>> {
        let mut result = HashMap::new();

        if self.return_docs {
            // Return documents as JSON string
            let docs_json: Vec<serde_json::Value> = docs
                .into_iter()
                .map(|doc| {
                    serde_json::json!({
                        "page_content": doc.page_content,
                        "metadata": doc.metadata,
                    })
                })
                .collect();
            let json_str = serde_json::to_string(&docs_json)?;
            result.insert(self.memory_key.clone(), json_str);
        } else {
            // Join page_content with newlines
            let text = docs
                .into_iter()
                .map(|doc| doc.page_content)
                .collect::<Vec<_>>()
                .join("\n");
            result.insert(self.memory_key.clone(), text);
        }

        Ok(result)
    }

    /// Format context from this conversation turn into documents.
    fn form_documents(
        &self,
        inputs: &HashMap<String, String>,
        outputs: &HashMap<String, String>,
    ) -> Vec<Document> {
        // Build set of keys to exclude
        let mut exclude = self.exclude_input_keys.clone();
        exclude.push(self.memory_key.clone());
        let exclude_set: std::collections::HashSet<_> = exclude.into_iter().collect();

        // Filter inputs to exclude certain keys
        let filtered_inputs: HashMap<_, _> = inputs
            .iter()
            .filter(|(k, _)| !exclude_set.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        // Build text lines from inputs and outputs
        let mut texts = Vec::new();
        for (k, v) in &filtered_inputs {
            texts.push(format!("{k}: {v}"));
        }
        for (k, v) in outputs {
            texts.push(format!("{k}: {v}"));
        }

        let page_content = texts.join("\n");
        vec![Document::new(page_content)]
    }
}

#[async_trait]
impl<VS> BaseMemory for VectorStoreRetrieverMemory<VS>
where
    VS: VectorStore + Send + Sync,
{
    fn memory_variables(&self) -> Vec<String> {
        vec![self.memory_key.clone()]
    }

    async fn load_memory_variables(
        &self,
        inputs: &HashMap<String, String>,
    ) -> MemoryResult<HashMap<String, String>> {
        // Get the input key to use for querying
        let input_key = self.get_prompt_input_key(inputs)?;
        let query = inputs.get(&input_key).ok_or_else(|| {
            MemoryError::OperationFailed(format!("Input key '{input_key}' not found in inputs"))
        })?;

        // Perform similarity search on vector store
        let docs = self
            .vector_store
            ._similarity_search(query, self.k, None)
            .await
            .map_err(|e| MemoryError::OperationFailed(format!("Vector search failed: {e}")))?;

        // Convert documents to memory variables
        self.documents_to_memory_variables(docs)
    }

    async fn save_context(
        &mut self,
        inputs: &HashMap<String, String>,
        outputs: &HashMap<String, String>,
    ) -> MemoryResult<()> {
        // Form documents from this conversation turn
        let documents = self.form_documents(inputs, outputs);

        // Add documents to vector store
        self.vector_store
            .add_documents(&documents, None)
            .await
            .map_err(|e| MemoryError::OperationFailed(format!("Failed to add documents: {e}")))?;

        Ok(())
    }

    async fn clear(&mut self) -> MemoryResult<()> {
        // VectorStoreRetrieverMemory doesn't implement clear in Python
        // The vector store persists all data
        Ok(())
    }
}
