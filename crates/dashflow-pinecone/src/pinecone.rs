//! Pinecone vector store implementation for `DashFlow` Rust.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use dashflow::core::config::RunnableConfig;
use dashflow::core::documents::Document;
use dashflow::core::embeddings::Embeddings;
use dashflow::core::indexing::document_index::{DeleteResponse, DocumentIndex, UpsertResponse};
use dashflow::core::retrievers::Retriever;
use dashflow::core::vector_stores::{DistanceMetric, VectorStore};
use dashflow::core::{Error, Result};
use dashflow::{embed, embed_query};
use pinecone_sdk::models::{Kind, Metadata, Value as PineconeValue, Vector};
use pinecone_sdk::pinecone::{PineconeClient, PineconeClientConfig};
use serde_json::Value as JsonValue;

/// Pinecone vector store implementation.
///
/// Pinecone is a managed vector database offering:
/// - Serverless and pod-based deployment options
/// - Sub-second query latency at scale
/// - Automatic index optimization and management
/// - Built-in metadata filtering
/// - Namespace support for data isolation
pub struct PineconeVectorStore {
    client: PineconeClient,
    index_host: String,
    embeddings: Arc<dyn Embeddings>,
    namespace: Option<String>,
    distance_metric: DistanceMetric,
}

impl PineconeVectorStore {
    /// Creates a new `PineconeVectorStore` instance.
    ///
    /// # Arguments
    ///
    /// * `index_host` - The host URL for your Pinecone index (e.g., "my-index-abc123.svc.aped-0000-1111.pinecone.io")
    /// * `embeddings` - Embeddings implementation for converting text to vectors
    /// * `api_key` - Optional API key (if None, uses `PINECONE_API_KEY` environment variable)
    /// * `namespace` - Optional namespace for data isolation (defaults to empty string)
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = PineconeVectorStore::new(
    ///     "my-index-abc123.svc.aped-0000-1111.pinecone.io",
    ///     embeddings,
    ///     None, // Use PINECONE_API_KEY env var
    ///     Some("my-namespace"),
    /// ).await?;
    /// ```
    pub async fn new(
        index_host: &str,
        embeddings: Arc<dyn Embeddings>,
        api_key: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<Self> {
        let config = PineconeClientConfig {
            api_key: api_key.map(std::string::ToString::to_string),
            ..Default::default()
        };

        let client = config
            .client()
            .map_err(|e| Error::config(format!("Failed to create Pinecone client: {e}")))?;

        Ok(Self {
            client,
            index_host: index_host.to_string(),
            embeddings,
            namespace: namespace.map(std::string::ToString::to_string),
            distance_metric: DistanceMetric::Cosine,
        })
    }

    /// Set the namespace for this vector store.
    #[must_use]
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Set the distance metric for this vector store.
    #[must_use]
    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    /// Convert `serde_json::Value` to `pinecone_sdk::models::Value`.
    fn json_to_pinecone_value(json: &JsonValue) -> PineconeValue {
        let kind = match json {
            JsonValue::Null => Some(Kind::NullValue(0)),
            JsonValue::Bool(b) => Some(Kind::BoolValue(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Kind::NumberValue(i as f64))
                } else if let Some(f) = n.as_f64() {
                    Some(Kind::NumberValue(f))
                } else {
                    Some(Kind::NullValue(0))
                }
            }
            JsonValue::String(s) => Some(Kind::StringValue(s.clone())),
            JsonValue::Array(arr) => {
                // Note: pinecone-sdk 0.1.2 has ListValue but it might not be exported
                // For now, we'll store arrays as strings or skip them
                // This is a limitation of the current SDK version
                let json_str = serde_json::to_string(arr).unwrap_or_default();
                Some(Kind::StringValue(json_str))
            }
            JsonValue::Object(obj) => {
                let fields: BTreeMap<String, PineconeValue> = obj
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::json_to_pinecone_value(v)))
                    .collect();
                Some(Kind::StructValue(Metadata { fields }))
            }
        };

        PineconeValue { kind }
    }

    /// Convert `pinecone_sdk::models::Value` to `serde_json::Value`.
    fn pinecone_value_to_json(value: &PineconeValue) -> JsonValue {
        match &value.kind {
            None | Some(Kind::NullValue(_)) => JsonValue::Null,
            Some(Kind::BoolValue(b)) => JsonValue::Bool(*b),
            Some(Kind::NumberValue(n)) => {
                // Try to preserve integer types
                if n.fract() == 0.0 && n.is_finite() {
                    JsonValue::Number((*n as i64).into())
                } else {
                    serde_json::Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number)
                }
            }
            Some(Kind::StringValue(s)) => JsonValue::String(s.clone()),
            Some(Kind::ListValue(_list)) => {
                // Note: pinecone-sdk 0.1.2 ListValue might not be fully accessible
                // Return empty array for now
                JsonValue::Array(vec![])
            }
            Some(Kind::StructValue(metadata)) => {
                let map: serde_json::Map<String, JsonValue> = metadata
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::pinecone_value_to_json(v)))
                    .collect();
                JsonValue::Object(map)
            }
        }
    }

    /// Convert `HashMap` metadata to Pinecone Metadata.
    fn metadata_to_pinecone(metadata: &HashMap<String, JsonValue>) -> Metadata {
        let fields: BTreeMap<String, PineconeValue> = metadata
            .iter()
            .map(|(k, v)| (k.clone(), Self::json_to_pinecone_value(v)))
            .collect();
        Metadata { fields }
    }

    /// Convert Pinecone Metadata to `HashMap`.
    fn pinecone_to_metadata(metadata: &Metadata) -> HashMap<String, JsonValue> {
        metadata
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Self::pinecone_value_to_json(v)))
            .collect()
    }

    /// Build a metadata filter for Pinecone queries.
    fn build_filter(filter: &HashMap<String, JsonValue>) -> Option<Metadata> {
        if filter.is_empty() {
            return None;
        }
        Some(Self::metadata_to_pinecone(filter))
    }
}

#[async_trait]
impl VectorStore for PineconeVectorStore {
    fn embeddings(&self) -> Option<Arc<dyn Embeddings>> {
        Some(Arc::clone(&self.embeddings))
    }

    fn distance_metric(&self) -> DistanceMetric {
        self.distance_metric
    }

    async fn add_texts(
        &mut self,
        texts: &[impl AsRef<str> + Send + Sync],
        metadatas: Option<&[HashMap<String, JsonValue>]>,
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let text_count = texts.len();
        if let Some(metadatas) = metadatas {
            if metadatas.len() != text_count {
                return Err(Error::config(format!(
                    "Metadatas length mismatch: {} vs {}",
                    metadatas.len(),
                    text_count
                )));
            }
        }
        if let Some(ids) = ids {
            if ids.len() != text_count {
                return Err(Error::config(format!(
                    "IDs length mismatch: {} vs {}",
                    ids.len(),
                    text_count
                )));
            }
        }

        let text_strings: Vec<String> = texts.iter().map(|t| t.as_ref().to_string()).collect();
        // Generate embeddings using graph API
        let embeddings_vec = embed(Arc::clone(&self.embeddings), &text_strings).await?;
        let doc_ids: Vec<String> = if let Some(ids) = ids {
            ids.to_vec()
        } else {
            (0..text_count)
                .map(|_| uuid::Uuid::new_v4().to_string())
                .collect()
        };

        // Build Pinecone vectors
        let vectors: Vec<Vector> = doc_ids
            .iter()
            .zip(embeddings_vec.iter())
            .enumerate()
            .map(|(i, (id, values))| {
                let metadata = metadatas.map(|m| Self::metadata_to_pinecone(&m[i]));
                Vector {
                    id: id.clone(),
                    values: values.clone(),
                    sparse_values: None,
                    metadata,
                }
            })
            .collect();

        // Get index and upsert
        let mut index = self
            .client
            .index(&self.index_host)
            .await
            .map_err(|e| Error::other(format!("Failed to get Pinecone index: {e}")))?;

        let namespace = self.namespace.as_deref().unwrap_or("");
        index
            .upsert(&vectors, &namespace.into())
            .await
            .map_err(|e| Error::other(format!("Pinecone upsert failed: {e}")))?;

        Ok(doc_ids)
    }

    async fn delete(&mut self, ids: Option<&[String]>) -> Result<bool> {
        if let Some(ids) = ids {
            if ids.is_empty() {
                return Ok(true);
            }

            let mut index = self
                .client
                .index(&self.index_host)
                .await
                .map_err(|e| Error::other(format!("Failed to get Pinecone index: {e}")))?;

            let namespace = self.namespace.as_deref().unwrap_or("");
            let ids_refs: Vec<&str> = ids.iter().map(std::string::String::as_str).collect();

            index
                .delete_by_id(&ids_refs, &namespace.into())
                .await
                .map_err(|e| Error::other(format!("Pinecone delete failed: {e}")))?;

            Ok(true)
        } else {
            // Delete all vectors in namespace
            let mut index = self
                .client
                .index(&self.index_host)
                .await
                .map_err(|e| Error::other(format!("Failed to get Pinecone index: {e}")))?;

            let namespace = self.namespace.as_deref().unwrap_or("");
            index
                .delete_all(&namespace.into())
                .await
                .map_err(|e| Error::other(format!("Pinecone delete_all failed: {e}")))?;

            Ok(true)
        }
    }

    async fn _similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<Document>> {
        // Embed the query using graph API
        let query_embedding = embed_query(Arc::clone(&self.embeddings), query).await?;

        // Get index
        let mut index = self
            .client
            .index(&self.index_host)
            .await
            .map_err(|e| Error::other(format!("Failed to get Pinecone index: {e}")))?;

        let namespace = self.namespace.as_deref().unwrap_or("");
        let filter_metadata = filter.and_then(Self::build_filter);

        // Query Pinecone
        // Signature: query_by_value(vector, sparse_vector, top_k, namespace, filter, include_values, include_metadata)
        let response = index
            .query_by_value(
                query_embedding,
                None, // sparse_vector
                k as u32,
                &namespace.into(),
                filter_metadata, // filter
                Some(true),      // include_values
                Some(true),      // include_metadata
            )
            .await
            .map_err(|e| Error::other(format!("Pinecone query failed: {e}")))?;

        // Convert matches to documents
        let documents: Vec<Document> = response
            .matches
            .iter()
            .map(|m| {
                let mut metadata = if let Some(ref meta) = m.metadata {
                    Self::pinecone_to_metadata(meta)
                } else {
                    HashMap::new()
                };

                // Add score to metadata
                metadata.insert("score".to_string(), JsonValue::from(m.score));

                // Use the ID as page_content if no text is stored
                // (In production, you'd typically store the text in metadata)
                let page_content = metadata
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&m.id)
                    .to_string();

                Document {
                    id: Some(m.id.clone()),
                    page_content,
                    metadata,
                }
            })
            .collect();

        Ok(documents)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<(Document, f32)>> {
        // Embed the query using graph API
        let query_embedding = embed_query(Arc::clone(&self.embeddings), query).await?;
        self.similarity_search_by_vector_with_score(&query_embedding, k, filter)
            .await
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Get index
        let mut index = self
            .client
            .index(&self.index_host)
            .await
            .map_err(|e| Error::other(format!("Failed to get Pinecone index: {e}")))?;

        let namespace = self.namespace.as_deref().unwrap_or("");
        let ids_refs: Vec<&str> = ids.iter().map(std::string::String::as_str).collect();

        // Fetch vectors by ID
        let response = index
            .fetch(&ids_refs, &namespace.into())
            .await
            .map_err(|e| Error::other(format!("Pinecone fetch failed: {e}")))?;

        // Convert response to documents
        let documents: Vec<Document> = response
            .vectors
            .iter()
            .map(|(id, vector)| {
                let metadata = if let Some(ref meta) = vector.metadata {
                    Self::pinecone_to_metadata(meta)
                } else {
                    HashMap::new()
                };

                // Extract text from metadata or use ID as fallback
                let page_content = metadata
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or(id)
                    .to_string();

                Document {
                    id: Some(id.clone()),
                    page_content,
                    metadata,
                }
            })
            .collect();

        Ok(documents)
    }

    async fn similarity_search_by_vector(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<Document>> {
        let results = self
            .similarity_search_by_vector_with_score(embedding, k, filter)
            .await?;
        Ok(results.into_iter().map(|(doc, _)| doc).collect())
    }

    async fn similarity_search_by_vector_with_score(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<(Document, f32)>> {
        // Get index
        let mut index = self
            .client
            .index(&self.index_host)
            .await
            .map_err(|e| Error::other(format!("Failed to get Pinecone index: {e}")))?;

        let namespace = self.namespace.as_deref().unwrap_or("");
        let filter_metadata = filter.and_then(Self::build_filter);

        // Query Pinecone
        // Signature: query_by_value(vector, sparse_vector, top_k, namespace, filter, include_values, include_metadata)
        let response = index
            .query_by_value(
                embedding.to_vec(),
                None, // sparse_vector
                k as u32,
                &namespace.into(),
                filter_metadata, // filter
                Some(true),      // include_values
                Some(true),      // include_metadata
            )
            .await
            .map_err(|e| Error::other(format!("Pinecone query failed: {e}")))?;

        // Convert matches to documents with scores
        let results: Vec<(Document, f32)> = response
            .matches
            .iter()
            .map(|m| {
                let metadata = if let Some(ref meta) = m.metadata {
                    Self::pinecone_to_metadata(meta)
                } else {
                    HashMap::new()
                };

                // Don't add score to metadata here (it's returned separately)
                let page_content = metadata
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&m.id)
                    .to_string();

                let doc = Document {
                    id: Some(m.id.clone()),
                    page_content,
                    metadata,
                };
                (doc, m.score)
            })
            .collect();

        Ok(results)
    }

    async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
        lambda: f32,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<Document>> {
        // Embed the query using graph API
        let query_embedding = embed_query(Arc::clone(&self.embeddings), query).await?;

        // Get index
        let mut index = self
            .client
            .index(&self.index_host)
            .await
            .map_err(|e| Error::other(format!("Failed to get Pinecone index: {e}")))?;

        let namespace = self.namespace.as_deref().unwrap_or("");
        let filter_metadata = filter.and_then(Self::build_filter);

        // Query Pinecone with fetch_k candidates (need include_values=true to get embeddings)
        let response = index
            .query_by_value(
                query_embedding.clone(),
                None, // sparse_vector
                fetch_k as u32,
                &namespace.into(),
                filter_metadata, // filter
                Some(true),      // include_values (get embeddings back)
                Some(true),      // include_metadata
            )
            .await
            .map_err(|e| Error::other(format!("Pinecone query failed: {e}")))?;

        if response.matches.is_empty() {
            return Ok(Vec::new());
        }

        // Extract embeddings for MMR calculation
        // Note: Pinecone returns values directly (not as Option) when include_values=true
        let candidate_embeddings: Vec<Vec<f32>> = response
            .matches
            .iter()
            .map(|m| m.values.clone())
            .collect();

        if candidate_embeddings.is_empty() {
            // Fallback: if no embeddings returned, just return top k by score
            return Ok(response
                .matches
                .iter()
                .take(k)
                .map(|m| {
                    let metadata = if let Some(ref meta) = m.metadata {
                        Self::pinecone_to_metadata(meta)
                    } else {
                        HashMap::new()
                    };
                    let page_content = metadata
                        .get("text")
                        .and_then(|v| v.as_str())
                        .unwrap_or(&m.id)
                        .to_string();

                    Document {
                        id: Some(m.id.clone()),
                        page_content,
                        metadata,
                    }
                })
                .collect());
        }

        // Run MMR algorithm
        let selected_indices = dashflow::core::vector_stores::maximal_marginal_relevance(
            &query_embedding,
            &candidate_embeddings,
            k,
            lambda,
        )?;

        // Build result documents from selected indices
        let results: Vec<Document> = selected_indices
            .into_iter()
            .filter_map(|idx| {
                response.matches.get(idx).map(|m| {
                    let metadata = if let Some(ref meta) = m.metadata {
                        Self::pinecone_to_metadata(meta)
                    } else {
                        HashMap::new()
                    };
                    let page_content = metadata
                        .get("text")
                        .and_then(|v| v.as_str())
                        .unwrap_or(&m.id)
                        .to_string();

                    Document {
                        id: Some(m.id.clone()),
                        page_content,
                        metadata,
                    }
                })
            })
            .collect();

        Ok(results)
    }
}

#[async_trait]
impl Retriever for PineconeVectorStore {
    async fn _get_relevant_documents(
        &self,
        query: &str,
        _config: Option<&RunnableConfig>,
    ) -> Result<Vec<Document>> {
        self._similarity_search(query, 4, None).await
    }
}

#[async_trait]
impl DocumentIndex for PineconeVectorStore {
    async fn upsert(
        &self,
        _documents: &[Document],
    ) -> std::result::Result<UpsertResponse, Box<dyn std::error::Error + Send + Sync>> {
        // Note: DocumentIndex requires &self but VectorStore::add_documents requires &mut self
        // This is a design limitation - for now we'll return an error
        // In production, you'd need interior mutability (Arc<Mutex<...>>)
        Err("DocumentIndex::upsert not supported - requires interior mutability".into())
    }

    async fn delete(
        &self,
        _ids: Option<&[String]>,
    ) -> std::result::Result<DeleteResponse, Box<dyn std::error::Error + Send + Sync>> {
        // Note: Same issue as upsert - requires &mut self
        Err("DocumentIndex::delete not supported - requires interior mutability".into())
    }

    async fn get(
        &self,
        ids: &[String],
    ) -> std::result::Result<Vec<Document>, Box<dyn std::error::Error + Send + Sync>> {
        self.get_by_ids(ids)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }
}
