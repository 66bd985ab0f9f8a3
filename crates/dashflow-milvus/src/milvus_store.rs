//! DashFlow.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashflow::core::documents::Document;
use dashflow::core::embeddings::Embeddings;
use dashflow::core::vector_stores::{DistanceMetric, VectorStore};
use dashflow::core::{Error, Result};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use milvus::client::Client;
use milvus::collection::{Collection, SearchOption};
use milvus::data::FieldColumn;
use milvus::index::{IndexParams, IndexType, MetricType};
use milvus::schema::{CollectionSchema, CollectionSchemaBuilder, FieldSchema};
use milvus::value::Value;

/// Field names used in Milvus collections
const ID_FIELD: &str = "id";
const TEXT_FIELD: &str = "text";
const VECTOR_FIELD: &str = "vector";
const METADATA_FIELD: &str = "metadata";

/// Milvus vector database implementation.
///
/// This implementation uses Milvus's native vector search capabilities for efficient
/// similarity search. Milvus is a cloud-native vector database that supports various
/// indexing algorithms including IVF_FLAT, IVF_SQ8, IVF_PQ, HNSW, and more.
///
/// # Example
///
/// ```rust,no_run
/// use dashflow_milvus::MilvusVectorStore;
/// use dashflow::core::embeddings::Embeddings;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # struct MockEmbeddings;
/// # #[async_trait::async_trait]
/// # impl Embeddings for MockEmbeddings {
/// #     async fn embed_documents(&self, texts: &[String]) -> dashflow::core::Result<Vec<Vec<f32>>> {
/// #         Ok(vec![vec![0.0; 384]; texts.len()])
/// #     }
/// #     async fn embed_query(&self, text: &str) -> dashflow::core::Result<Vec<f32>> {
/// #         Ok(vec![0.0; 384])
/// #     }
/// # }
/// let embeddings: Arc<dyn Embeddings> = Arc::new(MockEmbeddings);
///
/// let mut store = MilvusVectorStore::new(
///     "http://localhost:19530",
///     "documents",
///     embeddings,
///     384,  // embedding dimension
/// ).await?;
/// # Ok(())
/// # }
/// ```
pub struct MilvusVectorStore {
    client: Client,
    collection_name: String,
    collection_schema: CollectionSchema,
    embeddings: Arc<dyn Embeddings>,
    distance_metric: DistanceMetric,
    /// Embedding vector dimension (stored for reference)
    ///
    /// Embedding dimension for potential runtime schema validation
    #[allow(dead_code)] // Architectural: Reserved for runtime dimension validation before insertion
    dimension: i64,
}

impl MilvusVectorStore {
    /// Get the Milvus collection instance.
    async fn get_collection(&self) -> Result<Collection> {
        self.client
            .get_collection(&self.collection_name)
            .await
            .map_err(|e| Error::api(format!("Failed to get collection: {}", e)))
    }
}

impl MilvusVectorStore {
    /// Creates a new MilvusVectorStore instance.
    ///
    /// # Arguments
    ///
    /// * `url` - Milvus server URL (e.g., "http://localhost:19530")
    /// * `collection_name` - Name of the Milvus collection to store documents in
    /// * `embeddings` - Embeddings model to use
    /// * `dimension` - Dimension of the embedding vectors
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Connection to Milvus fails
    /// - Collection creation fails
    /// - Index creation fails
    ///
    /// # Note
    ///
    /// This will automatically create the collection if it doesn't exist.
    /// The collection schema includes:
    /// - `id` field (VARCHAR, primary key)
    /// - `text` field (VARCHAR)
    /// - `vector` field (FloatVector with specified dimension)
    /// - `metadata` field (JSON)
    pub async fn new(
        url: &str,
        collection_name: &str,
        embeddings: Arc<dyn Embeddings>,
        dimension: i64,
    ) -> Result<Self> {
        let client = Client::new(url.to_string())
            .await
            .map_err(|e| Error::api(format!("Failed to connect to Milvus: {}", e)))?;

        let collection_schema = Self::create_collection_schema(collection_name, dimension)?;

        // Check if collection exists
        let has_collection = client
            .has_collection(collection_name)
            .await
            .map_err(|e| Error::api(format!("Failed to check collection existence: {}", e)))?;

        if !has_collection {
            // Create collection
            client
                .create_collection(collection_schema.clone(), None)
                .await
                .map_err(|e| Error::api(format!("Failed to create collection: {}", e)))?;

            // Get collection to perform operations on it
            let collection = client
                .get_collection(collection_name)
                .await
                .map_err(|e| Error::api(format!("Failed to get collection: {}", e)))?;

            // Create index on vector field
            let mut params_map = HashMap::new();
            params_map.insert("nlist".to_string(), "128".to_string());

            let index_params = IndexParams::new(
                "vector_index".to_string(),
                IndexType::IvfFlat,
                MetricType::L2,
                params_map,
            );

            collection
                .create_index(VECTOR_FIELD, index_params)
                .await
                .map_err(|e| Error::api(format!("Failed to create index: {}", e)))?;

            // Load collection into memory
            collection
                .load(1) // replica number
                .await
                .map_err(|e| Error::api(format!("Failed to load collection: {}", e)))?;
        }

        Ok(Self {
            client,
            collection_name: collection_name.to_string(),
            collection_schema,
            embeddings,
            distance_metric: DistanceMetric::Euclidean, // IVF_FLAT typically uses L2
            dimension,
        })
    }

    /// Creates the collection schema for Milvus.
    fn create_collection_schema(
        collection_name: &str,
        dimension: i64,
    ) -> Result<CollectionSchema> {
        CollectionSchemaBuilder::new(collection_name, "DashFlow document collection")
            .add_field(FieldSchema::new_primary_varchar(
                ID_FIELD,
                "Document ID",
                false, // not auto_id
                256,   // max length
            ))
            .add_field(FieldSchema::new_varchar(TEXT_FIELD, "Document text", 65535))
            .add_field(FieldSchema::new_float_vector(
                VECTOR_FIELD,
                "Embedding vector",
                dimension,
            ))
            .add_field(FieldSchema::new_string(METADATA_FIELD, "Document metadata"))
            .build()
            .map_err(|e| Error::config(format!("Failed to build collection schema: {}", e)))
    }

    /// Sets the distance metric for this store.
    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    /// Converts DistanceMetric to Milvus MetricType.
    fn metric_to_milvus(&self) -> MetricType {
        match self.distance_metric {
            DistanceMetric::Euclidean => MetricType::L2,
            DistanceMetric::Cosine => MetricType::IP, // Cosine not available, use IP
            DistanceMetric::DotProduct | DistanceMetric::MaxInnerProduct => MetricType::IP,
        }
    }
}

#[async_trait]
impl VectorStore for MilvusVectorStore {
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
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Validate input lengths
        if let Some(metas) = metadatas {
            if metas.len() != texts.len() {
                return Err(Error::config(format!(
                    "Metadatas length ({}) must match texts length ({})",
                    metas.len(),
                    texts.len()
                )));
            }
        }

        if let Some(ids_vec) = ids {
            if ids_vec.len() != texts.len() {
                return Err(Error::config(format!(
                    "IDs length ({}) must match texts length ({})",
                    ids_vec.len(),
                    texts.len()
                )));
            }
        }

        // Generate embeddings
        let text_strings: Vec<String> = texts.iter().map(|t| t.as_ref().to_string()).collect();
        let embeddings = self
            .embeddings
            .embed_documents(&text_strings)
            .await
            .map_err(|e| Error::other(format!("Failed to embed documents: {}", e)))?;

        // Prepare IDs
        let doc_ids: Vec<String> = if let Some(ids_vec) = ids {
            ids_vec.to_vec()
        } else {
            (0..texts.len()).map(|_| Uuid::new_v4().to_string()).collect()
        };

        // Prepare field data
        let id_field = self
            .collection_schema
            .get_field(ID_FIELD)
            .ok_or_else(|| Error::other("ID field not found in schema"))?;
        let text_field = self
            .collection_schema
            .get_field(TEXT_FIELD)
            .ok_or_else(|| Error::other("Text field not found in schema"))?;
        let vector_field = self
            .collection_schema
            .get_field(VECTOR_FIELD)
            .ok_or_else(|| Error::other("Vector field not found in schema"))?;
        let metadata_field = self
            .collection_schema
            .get_field(METADATA_FIELD)
            .ok_or_else(|| Error::other("Metadata field not found in schema"))?;

        // Flatten embeddings for Milvus (expects flat Vec<f32>)
        let flat_embeddings: Vec<f32> = embeddings.into_iter().flatten().collect();

        // Prepare metadata JSON strings
        let metadata_jsons: Vec<String> = if let Some(metas) = metadatas {
            metas
                .iter()
                .map(|m| serde_json::to_string(m).unwrap_or_else(|_| "{}".to_string()))
                .collect()
        } else {
            vec!["{}".to_string(); texts.len()]
        };

        // Create field columns
        let columns = vec![
            FieldColumn::new(id_field, doc_ids.clone()),
            FieldColumn::new(text_field, text_strings),
            FieldColumn::new(vector_field, flat_embeddings),
            FieldColumn::new(metadata_field, metadata_jsons),
        ];

        // Get collection and insert data
        let collection = self.get_collection().await?;

        collection
            .insert(columns, None)
            .await
            .map_err(|e| Error::api(format!("Failed to insert documents: {}", e)))?;

        // Flush to persist
        collection
            .flush()
            .await
            .map_err(|e| Error::api(format!("Failed to flush collection: {}", e)))?;

        Ok(doc_ids)
    }

    async fn _similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<Document>> {
        let results = self
            .similarity_search_with_score(query, k, filter)
            .await?;
        Ok(results.into_iter().map(|(doc, _score)| doc).collect())
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<(Document, f32)>> {
        // Embed query
        let query_embedding = self
            .embeddings
            .embed_query(query)
            .await
            .map_err(|e| Error::other(format!("Failed to embed query: {}", e)))?;

        self.similarity_search_by_vector_with_score(&query_embedding, k, filter)
            .await
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
        Ok(results.into_iter().map(|(doc, _score)| doc).collect())
    }

    async fn similarity_search_by_vector_with_score(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&HashMap<String, JsonValue>>,
    ) -> Result<Vec<(Document, f32)>> {
        // Prepare search vector
        let search_vector = Value::from(embedding.to_vec());

        // Build search options
        let mut search_option = SearchOption::new();

        // Add filter expression if provided
        if let Some(filter_map) = filter {
            let expr = Self::build_filter_expression(filter_map)?;
            search_option.set_expr(expr);
        }

        // Perform search using Collection
        let collection = self.get_collection().await?;

        let results = collection
            .search(
                vec![search_vector],
                VECTOR_FIELD,
                k as i32,
                self.metric_to_milvus(),
                vec![ID_FIELD, TEXT_FIELD, METADATA_FIELD],
                &search_option,
            )
            .await
            .map_err(|e| Error::api(format!("Search failed: {}", e)))?;

        // Parse results
        let mut documents = Vec::new();

        for result in results {
            // Each SearchResult contains vectors of matches
            // Extract field column vectors
            let id_col = result
                .field
                .iter()
                .find(|f| f.name == ID_FIELD)
                .ok_or_else(|| Error::other("ID field not found in search results"))?;

            let text_col = result
                .field
                .iter()
                .find(|f| f.name == TEXT_FIELD)
                .ok_or_else(|| Error::other("Text field not found in search results"))?;

            let metadata_col = result
                .field
                .iter()
                .find(|f| f.name == METADATA_FIELD)
                .ok_or_else(|| Error::other("Metadata field not found in search results"))?;

            // Extract vectors from each column
            let id_vec: Vec<String> = id_col
                .value
                .clone()
                .try_into()
                .map_err(|e| Error::other(format!("Failed to parse ID field: {e:?}")))?;

            let text_vec: Vec<String> = text_col
                .value
                .clone()
                .try_into()
                .map_err(|e| Error::other(format!("Failed to parse text field: {e:?}")))?;

            let metadata_vec: Vec<String> = metadata_col
                .value
                .clone()
                .try_into()
                .map_err(|e| Error::other(format!("Failed to parse metadata field: {e:?}")))?;

            // Iterate through each match in this SearchResult
            for (idx, ((id, text), metadata_str)) in id_vec
                .into_iter()
                .zip(text_vec.into_iter())
                .zip(metadata_vec.into_iter())
                .enumerate()
            {
                let metadata: HashMap<String, JsonValue> =
                    serde_json::from_str(&metadata_str).unwrap_or_default();

                // Get score for this match
                let score = result.score.get(idx).copied().unwrap_or(0.0);

                // Convert distance to relevance score [0, 1]
                let relevance_score = self.distance_metric.distance_to_relevance(score);

                let document = Document {
                    id: Some(id),
                    page_content: text,
                    metadata,
                };

                documents.push((document, relevance_score));
            }
        }

        Ok(documents)
    }

    async fn delete(&mut self, ids: Option<&[String]>) -> Result<bool> {
        if let Some(ids_to_delete) = ids {
            if ids_to_delete.is_empty() {
                return Ok(true);
            }

            // Build delete expression: id in ["id1", "id2", ...]
            let ids_str = ids_to_delete
                .iter()
                .map(|id| format!("\"{}\"", id))
                .collect::<Vec<_>>()
                .join(", ");
            let expr = format!("{} in [{}]", ID_FIELD, ids_str);

            // Get collection and delete
            let collection = self
                .client
                .get_collection(&self.collection_name)
                .await
                .map_err(|e| Error::api(format!("Failed to get collection: {}", e)))?;

            collection
                .delete(&expr, None)
                .await
                .map_err(|e| Error::api(format!("Failed to delete documents: {}", e)))?;

            collection
                .flush()
                .await
                .map_err(|e| Error::api(format!("Failed to flush after delete: {}", e)))?;

            Ok(true)
        } else {
            // Delete all - drop and recreate collection
            self.client
                .drop_collection(&self.collection_name)
                .await
                .map_err(|e| Error::api(format!("Failed to drop collection: {}", e)))?;

            // Recreate collection
            self.client
                .create_collection(self.collection_schema.clone(), None)
                .await
                .map_err(|e| Error::api(format!("Failed to recreate collection: {}", e)))?;

            Ok(true)
        }
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Build query expression: id in ["id1", "id2", ...]
        let ids_str = ids
            .iter()
            .map(|id| format!("\"{}\"", id))
            .collect::<Vec<_>>()
            .join(", ");
        let expr = format!("{} in [{}]", ID_FIELD, ids_str);

        // Query documents using collection (no output fields parameter in 0.1.0)
        let collection = self.get_collection().await?;

        let results = collection
            .query(&expr, Vec::<String>::new()) // empty partition names
            .await
            .map_err(|e| Error::api(format!("Query failed: {}", e)))?;

        // Parse results into documents
        // Results are Vec<FieldColumn>, need to transpose into per-doc format
        let mut documents = Vec::new();

        // Find each field column
        let id_col = results
            .iter()
            .find(|col| col.name == ID_FIELD)
            .ok_or_else(|| Error::other("ID field not found in query results"))?;

        let text_col = results
            .iter()
            .find(|col| col.name == TEXT_FIELD)
            .ok_or_else(|| Error::other("Text field not found in query results"))?;

        let metadata_col = results
            .iter()
            .find(|col| col.name == METADATA_FIELD)
            .ok_or_else(|| Error::other("Metadata field not found in query results"))?;

        // Extract vectors from each column
        let id_vec: Vec<String> = id_col
            .value
            .clone()
            .try_into()
            .map_err(|e| Error::other(format!("Failed to parse ID field: {e:?}")))?;

        let text_vec: Vec<String> = text_col
            .value
            .clone()
            .try_into()
            .map_err(|e| Error::other(format!("Failed to parse text field: {e:?}")))?;

        let metadata_vec: Vec<String> = metadata_col
            .value
            .clone()
            .try_into()
            .map_err(|e| Error::other(format!("Failed to parse metadata field: {e:?}")))?;

        // Combine into documents
        for ((id, text), metadata_str) in id_vec
            .into_iter()
            .zip(text_vec.into_iter())
            .zip(metadata_vec.into_iter())
        {
            let metadata: HashMap<String, JsonValue> =
                serde_json::from_str(&metadata_str).unwrap_or_default();

            documents.push(Document {
                id: Some(id),
                page_content: text,
                metadata,
            });
        }

        Ok(documents)
    }
}

impl MilvusVectorStore {
    /// Builds a Milvus filter expression from a metadata filter map.
    ///
    /// Converts HashMap<String, JsonValue> to Milvus expression syntax.
    /// Example: {"category": "tech"} -> "metadata['category'] == 'tech'"
    fn build_filter_expression(filter: &HashMap<String, JsonValue>) -> Result<String> {
        let conditions: Vec<String> = filter
            .iter()
            .map(|(key, value)| {
                let val_str = match value {
                    JsonValue::String(s) => format!("'{}'", s),
                    JsonValue::Number(n) => n.to_string(),
                    JsonValue::Bool(b) => b.to_string(),
                    _ => return Err(Error::config("Unsupported filter value type")),
                };
                Ok(format!("{}['{}'] == {}", METADATA_FIELD, key, val_str))
            })
            .collect::<Result<Vec<_>>>()?;

        if conditions.is_empty() {
            Ok(String::new())
        } else {
            Ok(conditions.join(" && "))
        }
    }
}
