//! Cassandra/ScyllaDB-based chat message history storage
//!
//! Stores chat message history in Apache Cassandra or ScyllaDB. Messages are serialized to JSON
//! and stored in a table with partition key (session_id) and clustering key (timeuuid) for
//! time-ordered retrieval.
//!
//! # Overview
//!
//! The Cassandra backend uses:
//! - **Cassandra/ScyllaDB** for distributed storage
//! - **Partition key**: session_id for message grouping
//! - **Clustering key**: timeuuid for time-ordered retrieval
//! - **JSON serialization** for message persistence
//! - **Optional TTL** for automatic expiration
//!
//! # Usage
//!
//! ```rust,ignore
//! use dashflow_memory::CassandraChatMessageHistory;
//! use dashflow::core::chat_history::BaseChatMessageHistory;
//! use scylla::SessionBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! // Create Cassandra session
//! let session = SessionBuilder::new()
//!     .known_node("127.0.0.1:9042")
//!     .build()
//!     .await?;
//!
//! // Create message history
//! let history = CassandraChatMessageHistory::builder()
//!     .session(session)
//!     .keyspace("my_keyspace")
//!     .session_id("session-123")
//!     .build()
//!     .await?;
//!
//! // Add messages
//! history.add_user_message("Hello!").await?;
//! history.add_ai_message("Hi there!").await?;
//!
//! // Retrieve messages
//! let messages = history.get_messages().await?;
//! assert_eq!(messages.len(), 2);
//!
//! // Clear history
//! history.clear().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Python Baseline Compatibility
//!
//! Matches `CassandraChatMessageHistory` from
//! `dashflow_community.chat_message_histories.cassandra:33-131`.
//!
//! Key features:
//! - Uses Cassandra/ScyllaDB for distributed storage
//! - Partition by session_id, cluster by timeuuid
//! - Supports optional TTL for automatic expiration
//! - Automatic table creation (unless skip_provisioning=true)

use async_trait::async_trait;
use dashflow::core::chat_history::BaseChatMessageHistory;
use dashflow::core::messages::Message;
use futures::stream::TryStreamExt;
use scylla::frame::value::CqlTimeuuid;
use scylla::{Session, SessionBuilder};
use serde_json;
use std::sync::Arc;

/// Cassandra/ScyllaDB-based chat message history implementation.
///
/// Stores chat messages in a Cassandra or ScyllaDB table, with partition key
/// (session_id) and clustering key (timeuuid) for time-ordered retrieval.
/// Messages are serialized as JSON and stored in the `body_blob` column.
///
/// # Storage Format
///
/// - **Partition Key**: session_id (TEXT)
/// - **Clustering Key**: row_id (TIMEUUID)
/// - **Message Column**: body_blob (TEXT, JSON-serialized Message)
/// - **Ordering**: DESC by timeuuid (newest first in partition)
///
/// # Features
///
/// - **Session-based**: Each session_id gets its own partition
/// - **Time-ordered**: Messages ordered by timeuuid (chronological)
/// - **TTL support**: Optional expiration time for automatic cleanup
/// - **Distributed**: Leverages Cassandra/ScyllaDB scalability
#[derive(Clone)]
pub struct CassandraChatMessageHistory {
    session: Arc<Session>,
    keyspace: String,
    table_name: String,
    session_id: String,
    ttl_seconds: Option<i32>,
}

impl CassandraChatMessageHistory {
    /// Creates a new builder for CassandraChatMessageHistory
    pub fn builder() -> CassandraChatMessageHistoryBuilder {
        CassandraChatMessageHistoryBuilder::default()
    }

    /// Get the full table name with keyspace
    fn full_table_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.table_name)
    }

    /// Create the table if it doesn't exist
    async fn create_table(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let create_table_query = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                session_id TEXT,
                row_id TIMEUUID,
                body_blob TEXT,
                PRIMARY KEY (session_id, row_id)
            ) WITH CLUSTERING ORDER BY (row_id DESC)",
            self.full_table_name()
        );

        self.session.query_unpaged(create_table_query, &[]).await?;
        Ok(())
    }

    /// Read messages from Cassandra
    async fn read_messages(
        &self,
    ) -> Result<Vec<Message>, Box<dyn std::error::Error + Send + Sync>> {
        let query = format!(
            "SELECT body_blob FROM {} WHERE session_id = ?",
            self.full_table_name()
        );

        let rows = self.session.query_iter(query, (&self.session_id,)).await?;

        let mut messages = Vec::new();
        let rows_vec: Vec<_> = rows.try_collect().await?;

        // Rows are returned in DESC order (newest first), so we reverse them
        for row in rows_vec.into_iter().rev() {
            if let Some(Some(body_blob)) = row.columns[0].as_ref().map(|c| c.as_text()) {
                let message: Message = serde_json::from_str(body_blob)?;
                messages.push(message);
            }
        }

        Ok(messages)
    }
}

#[async_trait]
impl BaseChatMessageHistory for CassandraChatMessageHistory {
    async fn add_messages(
        &self,
        messages: &[Message],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        for message in messages {
            // Generate timeuuid for this message
            let row_id = CqlTimeuuid::from(uuid::Uuid::new_v4());

            // Serialize message to JSON
            let body_blob = serde_json::to_string(message)?;

            // Insert with optional TTL
            if let Some(ttl) = self.ttl_seconds {
                let query = format!(
                    "INSERT INTO {} (session_id, row_id, body_blob) VALUES (?, ?, ?) USING TTL ?",
                    self.full_table_name()
                );
                self.session
                    .query_unpaged(query, (&self.session_id, row_id, &body_blob, ttl))
                    .await?;
            } else {
                let query = format!(
                    "INSERT INTO {} (session_id, row_id, body_blob) VALUES (?, ?, ?)",
                    self.full_table_name()
                );
                self.session
                    .query_unpaged(query, (&self.session_id, row_id, &body_blob))
                    .await?;
            }
        }

        Ok(())
    }

    async fn get_messages(&self) -> Result<Vec<Message>, Box<dyn std::error::Error + Send + Sync>> {
        self.read_messages().await
    }

    async fn clear(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let query = format!(
            "DELETE FROM {} WHERE session_id = ?",
            self.full_table_name()
        );
        self.session
            .query_unpaged(query, (&self.session_id,))
            .await?;
        Ok(())
    }
}

/// Builder for CassandraChatMessageHistory
#[derive(Default)]
pub struct CassandraChatMessageHistoryBuilder {
    session: Option<Arc<Session>>,
    contact_points: Vec<String>,
    keyspace: Option<String>,
    table_name: Option<String>,
    session_id: Option<String>,
    ttl_seconds: Option<i32>,
    skip_provisioning: bool,
}

impl CassandraChatMessageHistoryBuilder {
    /// Set an existing Cassandra session
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(Arc::new(session));
        self
    }

    /// Set an existing Cassandra session from an Arc (for sharing sessions)
    pub fn shared_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Add a contact point (node address) for creating a new session
    /// Format: "host:port" (e.g., "127.0.0.1:9042")
    pub fn contact_point(mut self, contact_point: impl Into<String>) -> Self {
        self.contact_points.push(contact_point.into());
        self
    }

    /// Set the keyspace name (required)
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Set the table name (default: "message_store")
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Set the session ID (required)
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set TTL in seconds (items will expire after this duration)
    pub fn ttl_seconds(mut self, ttl_seconds: i32) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    /// Skip automatic table creation
    pub fn skip_provisioning(mut self, skip: bool) -> Self {
        self.skip_provisioning = skip;
        self
    }

    /// Build the CassandraChatMessageHistory
    pub async fn build(
        self,
    ) -> Result<CassandraChatMessageHistory, Box<dyn std::error::Error + Send + Sync>> {
        let keyspace = self.keyspace.ok_or("keyspace is required")?;
        let session_id = self.session_id.ok_or("session_id is required")?;
        let table_name = self
            .table_name
            .unwrap_or_else(|| "message_store".to_string());

        // Get or create session
        let session = if let Some(session) = self.session {
            session
        } else if !self.contact_points.is_empty() {
            let mut builder = SessionBuilder::new();
            for contact_point in &self.contact_points {
                builder = builder.known_node(contact_point);
            }
            Arc::new(builder.build().await?)
        } else {
            return Err("Either session or contact_points must be provided".into());
        };

        // Use keyspace
        session.use_keyspace(&keyspace, false).await?;

        let history = CassandraChatMessageHistory {
            session,
            keyspace,
            table_name,
            session_id,
            ttl_seconds: self.ttl_seconds,
        };

        // Create table unless skip_provisioning is true
        if !self.skip_provisioning {
            history.create_table().await?;
        }

        Ok(history)
    }
}
