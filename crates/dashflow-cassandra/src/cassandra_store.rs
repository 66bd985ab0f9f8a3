// Allow clippy warnings for this module
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::clone_on_ref_ptr)]
#![allow(clippy::needless_pass_by_value, clippy::redundant_clone)]

//! Apache Cassandra / Astra DB vector store implementation

use async_trait::async_trait;
use dashflow::core::documents::Document;
use dashflow::core::embeddings::Embeddings;
use dashflow::core::vector_stores::{DistanceMetric, VectorStore};
use dashflow::core::{Error, Result};
use dashflow::{embed, embed_query};
use scylla::{Session, SessionBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Validate a Cassandra identifier (keyspace name, table name, etc.)
///
/// Cassandra identifiers must:
/// - Start with a letter (a-z, A-Z) or underscore
/// - Contain only letters, digits, and underscores
/// - Be at most 48 characters (Cassandra limit for keyspace/table names)
fn validate_identifier(name: &str, kind: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::config(format!("{} name cannot be empty", kind)));
    }

    if name.len() > 48 {
        return Err(Error::config(format!(
            "{} name '{}' exceeds maximum length of 48 characters",
            kind, name
        )));
    }

    let mut chars = name.chars();
    let first = chars.next().unwrap(); // Safe: we checked non-empty above

    // First character must be a letter or underscore
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(Error::config(format!(
            "{} name '{}' must start with a letter or underscore",
            kind, name
        )));
    }

    // Remaining characters must be letters, digits, or underscores
    for c in chars {
        if !c.is_ascii_alphanumeric() && c != '_' {
            return Err(Error::config(format!(
                "{} name '{}' contains invalid character '{}'",
                kind, name, c
            )));
        }
    }

    Ok(())
}

/// Similarity function for vector comparisons in Cassandra
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarityFunction {
    /// Cosine similarity (default)
    Cosine,
    /// Euclidean distance (L2)
    Euclidean,
    /// Dot product / Inner product
    DotProduct,
}

impl SimilarityFunction {
    /// Convert to Cassandra CQL similarity function name
    #[must_use]
    pub fn as_cql_str(&self) -> &'static str {
        match self {
            SimilarityFunction::Cosine => "cosine",
            SimilarityFunction::Euclidean => "euclidean",
            SimilarityFunction::DotProduct => "dot_product",
        }
    }

    /// Convert to `DashFlow` `DistanceMetric`
    #[must_use]
    pub fn to_distance_metric(&self) -> DistanceMetric {
        match self {
            SimilarityFunction::Cosine => DistanceMetric::Cosine,
            SimilarityFunction::Euclidean => DistanceMetric::Euclidean,
            SimilarityFunction::DotProduct => DistanceMetric::DotProduct,
        }
    }
}

/// Apache Cassandra / Astra DB vector store
///
/// Stores document embeddings in Cassandra using native `VECTOR<FLOAT, N>` type
/// and performs similarity search using `ORDER BY ANN OF` queries.
///
/// ## Features
///
/// - Native vector type support (Cassandra 5.0+ / Astra DB)
/// - Approximate Nearest Neighbor (ANN) search
/// - Multiple similarity functions (cosine, euclidean, dot product)
/// - Metadata filtering
/// - Distributed architecture for horizontal scaling
///
/// ## Example
///
/// ```rust,no_run
/// use dashflow_cassandra::CassandraVectorStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = CassandraVectorStore::builder()
///     .contact_points(vec!["127.0.0.1:9042"])
///     .keyspace("dashflow")
///     .table("vector_store")
///     .vector_dimension(1536)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct CassandraVectorStore {
    session: Arc<Session>,
    keyspace: String,
    table: String,
    vector_dimension: usize,
    similarity_function: SimilarityFunction,
    embeddings: Arc<dyn Embeddings>,
}

impl CassandraVectorStore {
    /// Create a new builder for configuring the Cassandra vector store
    #[must_use]
    pub fn builder() -> CassandraVectorStoreBuilder {
        CassandraVectorStoreBuilder::default()
    }

    /// Get fully qualified table name (keyspace.table)
    fn table_fqname(&self) -> String {
        format!("{}.{}", self.keyspace, self.table)
    }

    /// Initialize the vector store table if it doesn't exist
    async fn initialize_table(&self) -> Result<()> {
        let create_table_cql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                content TEXT,
                metadata TEXT,
                vector VECTOR<FLOAT, {}>
            )",
            self.table_fqname(),
            self.vector_dimension
        );

        self.session
            .query_unpaged(create_table_cql, &[])
            .await
            .map_err(|e| Error::other(format!("Failed to create table: {e}")))?;

        Ok(())
    }

    /// Create vector index if it doesn't exist
    async fn create_vector_index(&self) -> Result<()> {
        let create_index_cql = format!(
            "CREATE INDEX IF NOT EXISTS idx_vector ON {} (vector)
             WITH OPTIONS = {{'similarity_function': '{}'}}",
            self.table_fqname(),
            self.similarity_function.as_cql_str()
        );

        self.session
            .query_unpaged(create_index_cql, &[])
            .await
            .map_err(|e| Error::other(format!("Failed to create index: {e}")))?;

        Ok(())
    }

    /// Add documents with their pre-computed embeddings
    pub async fn add_documents_with_embeddings(
        &self,
        texts: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metadatas: Option<Vec<HashMap<String, serde_json::Value>>>,
    ) -> Result<Vec<String>> {
        if texts.len() != embeddings.len() {
            return Err(Error::config(
                "Number of texts must match number of embeddings",
            ));
        }

        // Validate dimensions
        for emb in &embeddings {
            if emb.len() != self.vector_dimension {
                return Err(Error::config(format!(
                    "Expected vector dimension {}, got {}",
                    self.vector_dimension,
                    emb.len()
                )));
            }
        }

        let insert_cql = format!(
            "INSERT INTO {} (id, content, metadata, vector) VALUES (?, ?, ?, ?)",
            self.table_fqname()
        );

        let prepared = self
            .session
            .prepare(insert_cql)
            .await
            .map_err(|e| Error::other(format!("Failed to prepare statement: {e}")))?;

        let mut ids = Vec::new();

        for (idx, (text, embedding)) in texts.iter().zip(embeddings.iter()).enumerate() {
            let id = Uuid::new_v4();
            let metadata_json = metadatas.as_ref().and_then(|m| m.get(idx)).map_or_else(
                || "{}".to_string(),
                |m| serde_json::to_string(m).unwrap_or_else(|_| "{}".to_string()),
            );

            self.session
                .execute_unpaged(
                    &prepared,
                    (id, text.as_str(), metadata_json.as_str(), embedding),
                )
                .await
                .map_err(|e| Error::other(format!("Failed to insert document: {e}")))?;

            ids.push(id.to_string());
        }

        Ok(ids)
    }

    /// Perform similarity search by vector (internal implementation)
    async fn similarity_search_by_vector_with_score_internal(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<(Document, f32)>> {
        if query_vector.len() != self.vector_dimension {
            return Err(Error::config(format!(
                "Expected vector dimension {}, got {}",
                self.vector_dimension,
                query_vector.len()
            )));
        }

        // Cassandra 5.0+ ANN search syntax: ORDER BY vector ANN OF ?
        let select_cql = format!(
            "SELECT id, content, metadata, similarity_{}(vector, ?) AS score
             FROM {}
             ORDER BY vector ANN OF ?
             LIMIT ?",
            self.similarity_function.as_cql_str(),
            self.table_fqname()
        );

        let query_vec = query_vector.to_vec();
        let query_result = self
            .session
            .query_unpaged(select_cql, (&query_vec, &query_vec, k as i32))
            .await
            .map_err(|e| Error::other(format!("Failed to execute query: {e}")))?;

        let rows_opt = query_result
            .rows
            .ok_or_else(|| Error::other("Query returned no rows"))?;

        let mut results = Vec::new();

        for row in rows_opt {
            let content: String = row
                .columns
                .get(1)
                .and_then(|c| c.as_ref())
                .and_then(|c| {
                    if let scylla::frame::response::result::CqlValue::Text(s) = c {
                        Some(s.clone())
                    } else {
                        None
                    }
                })
                .ok_or_else(|| Error::other("Missing content column"))?;

            let metadata_str: String = row
                .columns
                .get(2)
                .and_then(|c| c.as_ref())
                .and_then(|c| {
                    if let scylla::frame::response::result::CqlValue::Text(s) = c {
                        Some(s.clone())
                    } else {
                        None
                    }
                })
                .unwrap_or_else(|| "{}".to_string());

            let metadata: HashMap<String, serde_json::Value> =
                serde_json::from_str(&metadata_str).unwrap_or_default();

            let score: f32 = *row
                .columns
                .get(3)
                .and_then(|c| c.as_ref())
                .and_then(|c| {
                    if let scylla::frame::response::result::CqlValue::Float(f) = c {
                        Some(f)
                    } else {
                        None
                    }
                })
                .ok_or_else(|| Error::other("Missing score column"))?;

            let doc = Document {
                id: None, // We don't need to return IDs for search results
                page_content: content,
                metadata,
            };

            results.push((doc, score));
        }

        Ok(results)
    }

    /// Delete documents by IDs
    pub async fn delete(&self, ids: Vec<String>) -> Result<()> {
        let delete_cql = format!("DELETE FROM {} WHERE id = ?", self.table_fqname());

        let prepared = self
            .session
            .prepare(delete_cql)
            .await
            .map_err(|e| Error::other(format!("Failed to prepare delete: {e}")))?;

        for id_str in ids {
            let id = Uuid::parse_str(&id_str)
                .map_err(|e| Error::config(format!("Invalid UUID: {e}")))?;

            self.session
                .execute_unpaged(&prepared, (id,))
                .await
                .map_err(|e| Error::other(format!("Failed to delete: {e}")))?;
        }

        Ok(())
    }

    /// Get documents by IDs
    pub async fn get_by_ids(&self, ids: Vec<String>) -> Result<Vec<Document>> {
        let select_cql = format!(
            "SELECT content, metadata FROM {} WHERE id = ?",
            self.table_fqname()
        );

        let prepared = self
            .session
            .prepare(select_cql)
            .await
            .map_err(|e| Error::other(format!("Failed to prepare select: {e}")))?;

        let mut documents = Vec::new();

        for id_str in ids {
            let id = Uuid::parse_str(&id_str)
                .map_err(|e| Error::config(format!("Invalid UUID: {e}")))?;

            let query_result = self
                .session
                .execute_unpaged(&prepared, (id,))
                .await
                .map_err(|e| Error::other(format!("Failed to select: {e}")))?;

            let rows_opt = query_result.rows;
            if let Some(rows) = rows_opt {
                for row in rows {
                    let content: String = row
                        .columns
                        .first()
                        .and_then(|c| c.as_ref())
                        .and_then(|c| {
                            if let scylla::frame::response::result::CqlValue::Text(s) = c {
                                Some(s.clone())
                            } else {
                                None
                            }
                        })
                        .ok_or_else(|| Error::other("Missing content column"))?;

                    let metadata_str: String = row
                        .columns
                        .get(1)
                        .and_then(|c| c.as_ref())
                        .and_then(|c| {
                            if let scylla::frame::response::result::CqlValue::Text(s) = c {
                                Some(s.clone())
                            } else {
                                None
                            }
                        })
                        .unwrap_or_else(|| "{}".to_string());

                    let metadata: HashMap<String, serde_json::Value> =
                        serde_json::from_str(&metadata_str).unwrap_or_default();

                    documents.push(Document {
                        id: Some(id_str.clone()),
                        page_content: content,
                        metadata,
                    });
                }
            }
        }

        Ok(documents)
    }
}

#[async_trait]
impl VectorStore for CassandraVectorStore {
    fn embeddings(&self) -> Option<Arc<dyn Embeddings>> {
        Some(Arc::clone(&self.embeddings))
    }

    fn distance_metric(&self) -> DistanceMetric {
        self.similarity_function.to_distance_metric()
    }

    async fn add_texts(
        &mut self,
        texts: &[impl AsRef<str> + Send + Sync],
        metadatas: Option<&[HashMap<String, serde_json::Value>]>,
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        // Convert texts to strings
        let text_strings: Vec<String> = texts.iter().map(|t| t.as_ref().to_string()).collect();
        let text_count = text_strings.len();

        // Validate metadatas length if provided
        if let Some(metadatas) = metadatas {
            if metadatas.len() != text_count {
                return Err(Error::config(format!(
                    "Metadatas length mismatch: {} vs {}",
                    metadatas.len(),
                    text_count
                )));
            }
        }

        // Validate IDs length if provided
        if let Some(ids) = ids {
            if ids.len() != text_count {
                return Err(Error::config(format!(
                    "IDs length mismatch: {} vs {}",
                    ids.len(),
                    text_count
                )));
            }
        }

        // Generate embeddings for all texts using graph API
        let embedded_vectors = embed(Arc::clone(&self.embeddings), &text_strings).await?;

        // Add documents with embeddings
        self.add_documents_with_embeddings(
            text_strings,
            embedded_vectors,
            metadatas
                .map(<[std::collections::HashMap<std::string::String, serde_json::Value>]>::to_vec),
        )
        .await
    }

    async fn delete(&mut self, ids: Option<&[String]>) -> Result<bool> {
        if let Some(ids) = ids {
            let delete_cql = format!("DELETE FROM {} WHERE id = ?", self.table_fqname());

            let prepared = self
                .session
                .prepare(delete_cql)
                .await
                .map_err(|e| Error::other(format!("Failed to prepare delete: {e}")))?;

            for id_str in ids {
                let id = Uuid::parse_str(id_str)
                    .map_err(|e| Error::config(format!("Invalid UUID: {e}")))?;

                self.session
                    .execute_unpaged(&prepared, (id,))
                    .await
                    .map_err(|e| Error::other(format!("Failed to delete: {e}")))?;
            }
            Ok(true)
        } else {
            // If no IDs provided, don't delete anything
            Ok(false)
        }
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Document>> {
        let select_cql = format!(
            "SELECT content, metadata FROM {} WHERE id = ?",
            self.table_fqname()
        );

        let prepared = self
            .session
            .prepare(select_cql)
            .await
            .map_err(|e| Error::other(format!("Failed to prepare select: {e}")))?;

        let mut documents = Vec::new();

        for id_str in ids {
            let id =
                Uuid::parse_str(id_str).map_err(|e| Error::config(format!("Invalid UUID: {e}")))?;

            let query_result = self
                .session
                .execute_unpaged(&prepared, (id,))
                .await
                .map_err(|e| Error::other(format!("Failed to select: {e}")))?;

            let rows_opt = query_result.rows;
            if let Some(rows) = rows_opt {
                for row in rows {
                    let content: String = row
                        .columns
                        .first()
                        .and_then(|c| c.as_ref())
                        .and_then(|c| {
                            if let scylla::frame::response::result::CqlValue::Text(s) = c {
                                Some(s.clone())
                            } else {
                                None
                            }
                        })
                        .ok_or_else(|| Error::other("Missing content column"))?;

                    let metadata_str: String = row
                        .columns
                        .get(1)
                        .and_then(|c| c.as_ref())
                        .and_then(|c| {
                            if let scylla::frame::response::result::CqlValue::Text(s) = c {
                                Some(s.clone())
                            } else {
                                None
                            }
                        })
                        .unwrap_or_else(|| "{}".to_string());

                    let metadata: HashMap<String, serde_json::Value> =
                        serde_json::from_str(&metadata_str).unwrap_or_default();

                    documents.push(Document {
                        id: Some(id_str.clone()),
                        page_content: content,
                        metadata,
                    });
                }
            }
        }

        Ok(documents)
    }

    async fn _similarity_search(
        &self,
        query: &str,
        k: usize,
        _filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<Document>> {
        let query_vector = embed_query(Arc::clone(&self.embeddings), query).await?;
        let results = self
            .similarity_search_by_vector_with_score(&query_vector, k, _filter)
            .await?;
        Ok(results.into_iter().map(|(doc, _score)| doc).collect())
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        _filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<(Document, f32)>> {
        let query_vector = embed_query(Arc::clone(&self.embeddings), query).await?;
        self.similarity_search_by_vector_with_score(&query_vector, k, _filter)
            .await
    }

    async fn similarity_search_by_vector(
        &self,
        query_vector: &[f32],
        k: usize,
        _filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<Document>> {
        let results = self
            .similarity_search_by_vector_with_score_internal(query_vector, k)
            .await?;
        Ok(results.into_iter().map(|(doc, _score)| doc).collect())
    }

    async fn similarity_search_by_vector_with_score(
        &self,
        query_vector: &[f32],
        k: usize,
        _filter: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<Vec<(Document, f32)>> {
        self.similarity_search_by_vector_with_score_internal(query_vector, k)
            .await
    }
}

/// Builder for configuring a Cassandra vector store
pub struct CassandraVectorStoreBuilder {
    contact_points: Vec<String>,
    keyspace: Option<String>,
    table: Option<String>,
    vector_dimension: Option<usize>,
    similarity_function: SimilarityFunction,
    embeddings: Option<Arc<dyn Embeddings>>,
}

impl Default for CassandraVectorStoreBuilder {
    fn default() -> Self {
        Self {
            contact_points: vec!["127.0.0.1:9042".to_string()],
            keyspace: None,
            table: None,
            vector_dimension: None,
            similarity_function: SimilarityFunction::Cosine,
            embeddings: None,
        }
    }
}

impl CassandraVectorStoreBuilder {
    /// Set Cassandra contact points (nodes)
    ///
    /// # Example
    /// ```rust,no_run
    /// # use dashflow_cassandra::CassandraVectorStore;
    /// let builder = CassandraVectorStore::builder()
    ///     .contact_points(vec![
    ///         "10.0.0.1:9042".to_string(),
    ///         "10.0.0.2:9042".to_string(),
    ///     ]);
    /// ```
    #[must_use]
    pub fn contact_points(mut self, contact_points: Vec<impl Into<String>>) -> Self {
        self.contact_points = contact_points
            .into_iter()
            .map(std::convert::Into::into)
            .collect();
        self
    }

    /// Set keyspace name
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Set table name
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set vector dimension (must match embedding model)
    #[must_use]
    pub fn vector_dimension(mut self, dimension: usize) -> Self {
        self.vector_dimension = Some(dimension);
        self
    }

    /// Set similarity function for vector comparisons
    #[must_use]
    pub fn similarity_function(mut self, func: SimilarityFunction) -> Self {
        self.similarity_function = func;
        self
    }

    /// Set embeddings model
    pub fn embeddings(mut self, embeddings: Arc<dyn Embeddings>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    /// Build the Cassandra vector store
    ///
    /// This will:
    /// 1. Validate keyspace and table names (CQL injection prevention)
    /// 2. Connect to Cassandra cluster
    /// 3. Create table if it doesn't exist
    /// 4. Create vector index if it doesn't exist
    pub async fn build(self) -> Result<CassandraVectorStore> {
        let keyspace = self
            .keyspace
            .ok_or_else(|| Error::config("Keyspace is required"))?;

        let table = self
            .table
            .ok_or_else(|| Error::config("Table name is required"))?;

        // Validate identifiers to prevent CQL injection
        validate_identifier(&keyspace, "Keyspace")?;
        validate_identifier(&table, "Table")?;

        let vector_dimension = self
            .vector_dimension
            .ok_or_else(|| Error::config("Vector dimension is required"))?;

        let embeddings = self
            .embeddings
            .ok_or_else(|| Error::config("Embeddings model is required"))?;

        // Create session
        let mut session_builder = SessionBuilder::new();
        for contact_point in &self.contact_points {
            session_builder = session_builder.known_node(contact_point);
        }

        let session = session_builder
            .build()
            .await
            .map_err(|e| Error::other(format!("Failed to connect to Cassandra: {e}")))?;

        let store = CassandraVectorStore {
            session: Arc::new(session),
            keyspace,
            table,
            vector_dimension,
            similarity_function: self.similarity_function,
            embeddings,
        };

        // Initialize table and index
        store.initialize_table().await?;
        store.create_vector_index().await?;

        Ok(store)
    }
}
