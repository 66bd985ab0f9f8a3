use async_trait::async_trait;
use dashflow::core::documents::Document;
use dashflow::core::embeddings::Embeddings;
use dashflow::core::vector_stores::{DistanceMetric, VectorStore};
use dashflow::core::{Error, Result};
use dashflow::{embed, embed_query};
use neo4rs::{Graph, Query};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Distance strategy for vector similarity search
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum DistanceStrategy {
    /// Cosine similarity (default) - measures angle between vectors
    Cosine,
    /// Euclidean distance - measures L2 distance between vectors
    Euclidean,
}

impl DistanceStrategy {
    /// Returns the Neo4j vector index similarity function name
    fn to_neo4j_similarity(self) -> &'static str {
        match self {
            DistanceStrategy::Cosine => "cosine",
            DistanceStrategy::Euclidean => "euclidean",
        }
    }

    /// Convert to `DashFlow` `DistanceMetric`
    fn to_distance_metric(self) -> DistanceMetric {
        match self {
            DistanceStrategy::Cosine => DistanceMetric::Cosine,
            DistanceStrategy::Euclidean => DistanceMetric::Euclidean,
        }
    }
}

/// Configuration for Neo4j vector store
#[derive(Debug, Clone)]
pub struct Neo4jVectorConfig {
    /// Neo4j database name (default: "neo4j")
    pub database: String,
    /// Node label for storing documents (default: "Document")
    pub node_label: String,
    /// Property name for storing embeddings (default: "embedding")
    pub embedding_property: String,
    /// Property name for storing text content (default: "text")
    pub text_property: String,
    /// Property name for storing document ID (default: "id")
    pub id_property: String,
    /// Name of the vector index (default: "`vector_index`")
    pub index_name: String,
    /// Distance strategy for similarity search
    pub distance_strategy: DistanceStrategy,
}

impl Default for Neo4jVectorConfig {
    fn default() -> Self {
        Self {
            database: "neo4j".to_string(),
            node_label: "Document".to_string(),
            embedding_property: "embedding".to_string(),
            text_property: "text".to_string(),
            id_property: "id".to_string(),
            index_name: "vector_index".to_string(),
            distance_strategy: DistanceStrategy::Cosine,
        }
    }
}

/// Neo4j vector store implementation
pub struct Neo4jVector {
    graph: Arc<Graph>,
    embeddings: Arc<dyn Embeddings>,
    config: Neo4jVectorConfig,
}

impl Neo4jVector {
    /// Create a new Neo4j vector store with default configuration
    ///
    /// # Arguments
    ///
    /// * `uri` - Neo4j connection URI (e.g., "<bolt://localhost:7687>")
    /// * `user` - Neo4j username
    /// * `password` - Neo4j password
    /// * `embeddings` - Embeddings model to use
    pub async fn new(
        uri: &str,
        user: &str,
        password: &str,
        embeddings: Arc<dyn Embeddings>,
    ) -> Result<Self> {
        Self::with_config(
            uri,
            user,
            password,
            embeddings,
            Neo4jVectorConfig::default(),
        )
        .await
    }

    /// Create a new Neo4j vector store with custom configuration
    ///
    /// # Arguments
    ///
    /// * `uri` - Neo4j connection URI (e.g., "<bolt://localhost:7687>")
    /// * `user` - Neo4j username
    /// * `password` - Neo4j password
    /// * `embeddings` - Embeddings model to use
    /// * `config` - Custom configuration
    pub async fn with_config(
        uri: &str,
        user: &str,
        password: &str,
        embeddings: Arc<dyn Embeddings>,
        config: Neo4jVectorConfig,
    ) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .map_err(|e| Error::other(format!("Failed to connect to Neo4j: {e}")))?;

        let store = Self {
            graph: Arc::new(graph),
            embeddings,
            config,
        };

        // Ensure vector index exists
        store.create_vector_index().await?;

        Ok(store)
    }

    /// Create vector index if it doesn't exist
    async fn create_vector_index(&self) -> Result<()> {
        // First check if index exists
        let check_query = format!(
            "SHOW INDEXES YIELD name WHERE name = '{}' RETURN name",
            self.config.index_name
        );

        let mut result = self
            .graph
            .execute(Query::new(check_query))
            .await
            .map_err(|e| Error::other(format!("Failed to check index existence: {e}")))?;

        // Check if any results returned (index exists)
        if result
            .next()
            .await
            .map_err(|e| Error::other(format!("Failed to read index check result: {e}")))?
            .is_some()
        {
            // Index already exists
            return Ok(());
        }

        // Get embedding dimensions from a sample embedding
        let sample = embed_query(Arc::clone(&self.embeddings), "sample")
            .await
            .map_err(|e| Error::other(format!("Sample embedding failed: {e}")))?;
        let dimensions = sample.len();

        // Create vector index
        // Note: Neo4j 5.11+ syntax for vector indexes
        let create_index = format!(
            "CREATE VECTOR INDEX {} IF NOT EXISTS
             FOR (n:{}) ON n.{}
             OPTIONS {{
               indexConfig: {{
                 `vector.dimensions`: {},
                 `vector.similarity_function`: '{}'
               }}
             }}",
            self.config.index_name,
            self.config.node_label,
            self.config.embedding_property,
            dimensions,
            self.config.distance_strategy.to_neo4j_similarity()
        );

        self.graph
            .run(Query::new(create_index))
            .await
            .map_err(|e| Error::other(format!("Failed to create vector index: {e}")))?;

        Ok(())
    }

    /// Perform similarity search by vector
    async fn similarity_search_by_vector_internal(
        &self,
        query_vector: &[f32],
        k: usize,
        _filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<(Document, f32)>> {
        // Build the vector search query
        let query_parts = [
            format!(
                "CALL db.index.vector.queryNodes('{}', {}, $embedding) YIELD node, score",
                self.config.index_name, k
            ),
            format!(
                "RETURN node.{} AS id, node.{} AS text, score",
                self.config.id_property, self.config.text_property
            ),
        ];

        let cypher = query_parts.join(" ");
        let q = Query::new(cypher).param("embedding", query_vector.to_vec());

        // Note: Metadata filtering would require converting serde_json::Value to BoltType
        // For now, we skip metadata filtering in the query

        let mut result = self
            .graph
            .execute(q)
            .await
            .map_err(|e| Error::other(format!("Failed to execute similarity search: {e}")))?;

        let mut documents = Vec::new();

        while let Some(row) = result
            .next()
            .await
            .map_err(|e| Error::other(format!("Failed to read search results: {e}")))?
        {
            let id: String = row
                .get("id")
                .map_err(|e| Error::other(format!("Failed to get id from search results: {e}")))?;

            let text: String = row.get("text").map_err(|e| {
                Error::other(format!("Failed to get text from search results: {e}"))
            })?;

            let score: f64 = row.get("score").map_err(|e| {
                Error::other(format!("Failed to get score from search results: {e}"))
            })?;

            let mut metadata = HashMap::new();
            metadata.insert("id".to_string(), serde_json::json!(id));

            let doc = Document {
                id: Some(id),
                page_content: text,
                metadata,
            };

            documents.push((doc, score as f32));
        }

        Ok(documents)
    }

    /// Delete documents by IDs
    pub async fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let query = format!(
            "MATCH (n:{}) WHERE n.{} IN $ids DETACH DELETE n",
            self.config.node_label, self.config.id_property
        );

        self.graph
            .run(Query::new(query).param("ids", ids.to_vec()))
            .await
            .map_err(|e| Error::other(format!("Failed to delete documents: {e}")))?;

        Ok(())
    }

    /// Drop the vector index (for cleanup/testing)
    pub async fn drop_index(&self) -> Result<()> {
        let query = format!("DROP INDEX {} IF EXISTS", self.config.index_name);

        self.graph
            .run(Query::new(query))
            .await
            .map_err(|e| Error::other(format!("Failed to drop index: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for Neo4jVector {
    fn embeddings(&self) -> Option<Arc<dyn Embeddings>> {
        Some(Arc::clone(&self.embeddings))
    }

    fn distance_metric(&self) -> DistanceMetric {
        self.config.distance_strategy.to_distance_metric()
    }

    async fn add_texts(
        &mut self,
        texts: &[impl AsRef<str> + Send + Sync],
        metadatas: Option<&[HashMap<String, serde_json::Value>]>,
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

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Convert texts to strings
        let text_strings: Vec<String> = texts.iter().map(|t| t.as_ref().to_string()).collect();

        // Generate embeddings for all texts
        let embeddings = embed(Arc::clone(&self.embeddings), &text_strings)
            .await
            .map_err(|e| Error::other(format!("Embedding failed: {e}")))?;

        // Generate IDs if not provided
        let doc_ids: Vec<String> = if let Some(ids) = ids {
            ids.to_vec()
        } else {
            (0..text_count)
                .map(|_| Uuid::new_v4().to_string())
                .collect()
        };

        // Create nodes in Neo4j
        for (i, (text, embedding)) in text_strings.iter().zip(embeddings.iter()).enumerate() {
            // Build the Cypher query with base properties
            let query_str = format!(
                "CREATE (n:{} {{`{}`: $id, `{}`: $text, `{}`: $embedding}})",
                self.config.node_label,
                self.config.id_property,
                self.config.text_property,
                self.config.embedding_property
            );

            let q = Query::new(query_str)
                .param("id", doc_ids[i].as_str())
                .param("text", text.as_str())
                .param("embedding", embedding.clone());

            self.graph
                .run(q)
                .await
                .map_err(|e| Error::other(format!("Failed to insert document: {e}")))?;
        }

        Ok(doc_ids)
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "MATCH (n:{}) WHERE n.{} IN $ids RETURN n.{} AS id, n.{} AS text",
            self.config.node_label,
            self.config.id_property,
            self.config.id_property,
            self.config.text_property
        );

        let mut result = self
            .graph
            .execute(Query::new(query).param("ids", ids.to_vec()))
            .await
            .map_err(|e| Error::other(format!("Failed to get documents: {e}")))?;

        let mut documents = Vec::new();

        while let Some(row) = result
            .next()
            .await
            .map_err(|e| Error::other(format!("Failed to read documents: {e}")))?
        {
            let id: String = row
                .get("id")
                .map_err(|e| Error::other(format!("Failed to get id from results: {e}")))?;

            let text: String = row
                .get("text")
                .map_err(|e| Error::other(format!("Failed to get text from results: {e}")))?;

            let mut metadata = HashMap::new();
            metadata.insert("id".to_string(), serde_json::json!(id.clone()));

            documents.push(Document {
                id: Some(id),
                page_content: text,
                metadata,
            });
        }

        Ok(documents)
    }

    async fn _similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<Document>> {
        let results = self.similarity_search_with_score(query, k, filter).await?;
        Ok(results.into_iter().map(|(doc, _score)| doc).collect())
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<(Document, f32)>> {
        let query_vector = embed_query(Arc::clone(&self.embeddings), query)
            .await
            .map_err(|e| Error::other(format!("Query embedding failed: {e}")))?;
        self.similarity_search_by_vector_internal(&query_vector, k, filter)
            .await
    }

    async fn similarity_search_by_vector(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<Document>> {
        let results = self
            .similarity_search_by_vector_internal(embedding, k, filter)
            .await?;
        Ok(results.into_iter().map(|(doc, _score)| doc).collect())
    }

    async fn similarity_search_by_vector_with_score(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<(Document, f32)>> {
        self.similarity_search_by_vector_internal(embedding, k, filter)
            .await
    }
}
