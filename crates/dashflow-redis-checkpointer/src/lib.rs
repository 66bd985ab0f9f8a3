//! Redis checkpointer for DashFlow
//!
//! Provides persistent checkpoint storage using Redis.
//!
//! # Example
//!
//! ```rust,ignore
//! use dashflow_redis_checkpointer::RedisCheckpointer;
//! use dashflow::{StateGraph, GraphState};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct MyState {
//!     value: i32,
//! }
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let connection_string = "redis://localhost:6379";
//!     let checkpointer = RedisCheckpointer::new(connection_string).await?;
//!
//!     let mut graph = StateGraph::new();
//!     // ... build graph ...
//!     let app = graph.compile()?.with_checkpointer(checkpointer);
//!
//!     let initial_state = MyState { value: 0 };
//!     let result = app.invoke(initial_state).await?;
//!     Ok(())
//! }
//! ```
//!
//! # See Also
//!
//! - [`Checkpointer`] - The trait this implements
//! - [`Checkpoint`] - The checkpoint data structure
//! - [`dashflow-postgres-checkpointer`](https://docs.rs/dashflow-postgres-checkpointer) - Alternative: PostgreSQL-based checkpointing
//! - [`dashflow-redis`](https://docs.rs/dashflow-redis) - Redis vector store (different from checkpointer)
//! - [Redis Documentation](https://redis.io/docs/) - Official Redis docs

use dashflow::{
    checkpointer_helpers::{nanos_to_timestamp, timestamp_to_nanos},
    Checkpoint, CheckpointMetadata, Checkpointer, GraphState, Result as DashFlowResult,
    RetentionPolicy,
};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use std::marker::PhantomData;
use std::time::SystemTime;
use tracing::{debug, error, info};

#[cfg(feature = "compression")]
use dashflow_compression::{Compression, CompressionType};

/// Errors that can occur when using Redis checkpointer
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RedisCheckpointerError {
    #[error("Redis connection error: {0}")]
    ConnectionError(String),

    #[error("Redis command error: {0}")]
    CommandError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[cfg(feature = "compression")]
    #[error("Compression error: {0}")]
    CompressionError(String),
}

impl From<RedisError> for RedisCheckpointerError {
    fn from(err: RedisError) -> Self {
        RedisCheckpointerError::CommandError(err.to_string())
    }
}

impl From<RedisCheckpointerError> for dashflow::Error {
    fn from(err: RedisCheckpointerError) -> Self {
        use dashflow::error::CheckpointError;
        let checkpoint_err = match err {
            RedisCheckpointerError::ConnectionError(msg) => CheckpointError::ConnectionLost {
                backend: "redis".to_string(),
                reason: msg,
            },
            RedisCheckpointerError::CommandError(msg) => {
                CheckpointError::Other(format!("Redis command error: {}", msg))
            }
            RedisCheckpointerError::SerializationError(msg) => {
                CheckpointError::SerializationFailed { reason: msg }
            }
            RedisCheckpointerError::DeserializationError(msg) => {
                CheckpointError::DeserializationFailed { reason: msg }
            }
            #[cfg(feature = "compression")]
            RedisCheckpointerError::CompressionError(msg) => {
                CheckpointError::Other(format!("Compression error: {}", msg))
            }
        };
        dashflow::Error::Checkpoint(checkpoint_err)
    }
}

/// Redis-backed checkpointer
///
/// Stores checkpoints in Redis with the following data structure:
/// - Hash per checkpoint: `checkpoint:{checkpoint_id}` containing:
///   - `thread_id` - Thread ID
///   - `state` - Bincode-encoded state
///   - `node` - Node name
///   - `timestamp` - Unix timestamp in nanoseconds (string, full precision)
///   - `parent_id` - Parent checkpoint ID (if any)
///   - `metadata` - JSON-encoded metadata
/// - Sorted set per thread: `thread:{thread_id}:checkpoints`
///   - Members: checkpoint IDs
///   - Scores: timestamps in milliseconds (f64-safe, sufficient for ordering)
/// - Set of all thread IDs: `threads`
///
/// Note: ZSET scores use milliseconds to avoid f64 precision loss. The full
/// nanosecond timestamp is stored in the hash field for precise reads.
pub struct RedisCheckpointer<S: GraphState> {
    connection_manager: ConnectionManager,
    key_prefix: String,
    #[cfg(feature = "compression")]
    compression: Option<Box<dyn Compression>>,
    retention_policy: Option<RetentionPolicy>,
    _phantom: PhantomData<S>,
}

impl<S: GraphState> RedisCheckpointer<S> {
    /// Create a new Redis checkpointer
    ///
    /// # Arguments
    /// * `connection_string` - Redis connection string (e.g., "redis://localhost:6379")
    ///
    /// # Errors
    /// Returns error if connection fails
    pub async fn new(connection_string: &str) -> Result<Self, RedisCheckpointerError> {
        Self::with_key_prefix(connection_string, "dashflow").await
    }

    /// Create a new Redis checkpointer with custom key prefix
    ///
    /// # Arguments
    /// * `connection_string` - Redis connection string
    /// * `key_prefix - Prefix for all Redis keys (default: "dashflow"))
    pub async fn with_key_prefix(
        connection_string: &str,
        key_prefix: &str,
    ) -> Result<Self, RedisCheckpointerError> {
        info!("Connecting to Redis: {}", connection_string);
        let client = redis::Client::open(connection_string).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            RedisCheckpointerError::ConnectionError(e.to_string())
        })?;

        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to connect to Redis: {}", e);
            RedisCheckpointerError::ConnectionError(e.to_string())
        })?;

        debug!("Redis connection established with prefix: {}", key_prefix);

        Ok(Self {
            connection_manager,
            key_prefix: key_prefix.to_string(),
            #[cfg(feature = "compression")]
            compression: None,
            retention_policy: None,
            _phantom: PhantomData,
        })
    }

    /// Enable compression for checkpoint storage
    ///
    /// # Arguments
    /// * `compression_type` - The compression algorithm and configuration to use
    #[cfg(feature = "compression")]
    pub fn with_compression(
        mut self,
        compression_type: CompressionType,
    ) -> Result<Self, RedisCheckpointerError> {
        self.compression = Some(
            compression_type
                .build()
                .map_err(|e| RedisCheckpointerError::CompressionError(e.to_string()))?,
        );
        Ok(self)
    }

    /// Set retention policy for automatic checkpoint cleanup
    ///
    /// # Arguments
    /// * `policy` - The retention policy to apply
    pub fn with_retention_policy(mut self, policy: RetentionPolicy) -> Self {
        self.retention_policy = Some(policy);
        self
    }

    /// Apply retention policy to clean up old checkpoints for a thread
    ///
    /// This method should be called periodically or after saving checkpoints
    /// to enforce the retention policy rules.
    ///
    /// # Arguments
    /// * `thread_id` - The thread ID to apply retention policy to
    ///
    /// # Returns
    /// Number of checkpoints deleted
    pub async fn apply_retention(&self, thread_id: &str) -> DashFlowResult<usize> {
        let policy = match &self.retention_policy {
            Some(p) => p,
            None => return Ok(0), // No policy configured
        };

        // Get all checkpoints for this thread
        let checkpoints = self.list(thread_id).await?;

        // Evaluate retention policy
        let (_to_keep, to_delete) = policy.evaluate(&checkpoints, SystemTime::now());

        // Delete checkpoints marked for deletion
        for checkpoint_id in &to_delete {
            self.delete(checkpoint_id).await?;
        }

        debug!(
            "Applied retention policy to thread {}: deleted {} checkpoints",
            thread_id,
            to_delete.len()
        );

        Ok(to_delete.len())
    }

    /// Get the Redis key for a checkpoint
    fn checkpoint_key(&self, checkpoint_id: &str) -> String {
        format!("{}:checkpoint:{}", self.key_prefix, checkpoint_id)
    }

    /// Get the Redis key for a thread's checkpoint sorted set
    fn thread_checkpoints_key(&self, thread_id: &str) -> String {
        format!("{}:thread:{}:checkpoints", self.key_prefix, thread_id)
    }

    /// Get the Redis key for the set of all threads
    fn threads_key(&self) -> String {
        format!("{}:threads", self.key_prefix)
    }

    /// Helper to deserialize a checkpoint from Redis hash data
    ///
    /// # Arguments
    /// * `data` - HashMap from Redis HGETALL command
    ///
    /// # Returns
    /// Deserialized checkpoint or error
    #[allow(clippy::needless_pass_by_value)] // Takes ownership - callers don't need data after
    fn deserialize_checkpoint(
        &self,
        data: std::collections::HashMap<String, Vec<u8>>,
    ) -> Result<Checkpoint<S>, RedisCheckpointerError> {
        let thread_id = String::from_utf8(
            data.get("thread_id")
                .ok_or_else(|| {
                    RedisCheckpointerError::DeserializationError(
                        "Missing thread_id field".to_string(),
                    )
                })?
                .clone(),
        )
        .map_err(|e| {
            RedisCheckpointerError::DeserializationError(format!("Invalid thread_id UTF-8: {}", e))
        })?;

        let checkpoint_id = String::from_utf8(
            data.get("checkpoint_id")
                .ok_or_else(|| {
                    RedisCheckpointerError::DeserializationError(
                        "Missing checkpoint_id field".to_string(),
                    )
                })?
                .clone(),
        )
        .map_err(|e| {
            RedisCheckpointerError::DeserializationError(format!(
                "Invalid checkpoint_id UTF-8: {}",
                e
            ))
        })?;

        #[cfg_attr(not(feature = "compression"), allow(unused_mut))]
        let mut state_bytes = data
            .get("state")
            .ok_or_else(|| {
                RedisCheckpointerError::DeserializationError("Missing state field".to_string())
            })?
            .clone();

        // Decompress if compression is enabled
        #[cfg(feature = "compression")]
        if let Some(ref compressor) = self.compression {
            state_bytes = compressor.decompress(&state_bytes).map_err(|e| {
                error!("Failed to decompress checkpoint state: {}", e);
                RedisCheckpointerError::DeserializationError(format!("Decompression error: {}", e))
            })?;
            debug!("Decompressed state to {} bytes", state_bytes.len());
        }

        let state: S = bincode::deserialize(&state_bytes).map_err(|e| {
            RedisCheckpointerError::DeserializationError(format!(
                "Failed to deserialize state: {}",
                e
            ))
        })?;

        let node = String::from_utf8(
            data.get("node")
                .ok_or_else(|| {
                    RedisCheckpointerError::DeserializationError("Missing node field".to_string())
                })?
                .clone(),
        )
        .map_err(|e| {
            RedisCheckpointerError::DeserializationError(format!("Invalid node UTF-8: {}", e))
        })?;

        let timestamp_bytes = data
            .get("timestamp")
            .ok_or_else(|| {
                RedisCheckpointerError::DeserializationError("Missing timestamp field".to_string())
            })?
            .clone();

        let timestamp_str = String::from_utf8(timestamp_bytes).map_err(|e| {
            RedisCheckpointerError::DeserializationError(format!("Invalid timestamp UTF-8: {}", e))
        })?;

        let timestamp_nanos: i64 = timestamp_str.parse().map_err(|e| {
            RedisCheckpointerError::DeserializationError(format!("Invalid timestamp: {}", e))
        })?;

        let timestamp = nanos_to_timestamp(timestamp_nanos);

        let parent_id = data
            .get("parent_id")
            .and_then(|bytes| String::from_utf8(bytes.clone()).ok())
            .filter(|s| !s.is_empty());

        let metadata_bytes = data.get("metadata").map(|b| b.as_slice()).unwrap_or(b"{}");
        let metadata: std::collections::HashMap<String, String> =
            serde_json::from_slice(metadata_bytes).map_err(|e| {
                RedisCheckpointerError::DeserializationError(format!(
                    "Failed to deserialize metadata: {}",
                    e
                ))
            })?;

        Ok(Checkpoint {
            id: checkpoint_id,
            thread_id,
            state,
            node,
            timestamp,
            parent_id,
            metadata,
        })
    }
}

#[async_trait::async_trait]
impl<S: GraphState> Checkpointer<S> for RedisCheckpointer<S> {
    async fn save(&self, checkpoint: Checkpoint<S>) -> DashFlowResult<()> {
        let checkpoint_key = self.checkpoint_key(&checkpoint.id);
        let thread_checkpoints_key = self.thread_checkpoints_key(&checkpoint.thread_id);
        let threads_key = self.threads_key();

        // Serialize state with bincode
        #[cfg_attr(not(feature = "compression"), allow(unused_mut))]
        let mut state_bytes = bincode::serialize(&checkpoint.state)
            .map_err(|e| dashflow::Error::Generic(format!("Failed to serialize state: {}", e)))?;

        // Apply compression if enabled
        #[cfg(feature = "compression")]
        if let Some(ref compressor) = self.compression {
            state_bytes = compressor.compress(&state_bytes).map_err(|e| {
                error!("Failed to compress checkpoint state: {}", e);
                dashflow::Error::Generic(format!("Compression error: {}", e))
            })?;
            debug!("Compressed state to {} bytes", state_bytes.len());
        }

        // Serialize metadata as JSON
        let metadata_json = serde_json::to_string(&checkpoint.metadata).map_err(|e| {
            dashflow::Error::Generic(format!("Failed to serialize metadata: {}", e))
        })?;

        let timestamp_nanos = timestamp_to_nanos(checkpoint.timestamp);

        // Store checkpoint as Redis hash
        let mut conn = self.connection_manager.clone();

        // Use Redis pipelining for atomic multi-command execution
        let mut pipe = redis::pipe();
        pipe.atomic();

        // Store checkpoint hash
        pipe.hset_multiple(
            &checkpoint_key,
            &[
                ("checkpoint_id", checkpoint.id.as_bytes()),
                ("thread_id", checkpoint.thread_id.as_bytes()),
                ("state", &state_bytes),
                ("node", checkpoint.node.as_bytes()),
                ("timestamp", timestamp_nanos.to_string().as_bytes()),
                (
                    "parent_id",
                    checkpoint
                        .parent_id
                        .as_ref()
                        .map(|s| s.as_bytes())
                        .unwrap_or(b""),
                ),
                ("metadata", metadata_json.as_bytes()),
            ],
        );

        // Add checkpoint to thread's sorted set
        // Use milliseconds for score (safe for f64, sufficient for ordering)
        // Full nanoseconds are stored in the hash field for precision
        let score_millis = timestamp_nanos / 1_000_000;
        pipe.zadd(&thread_checkpoints_key, &checkpoint.id, score_millis as f64);

        // Add thread to threads set
        pipe.sadd(&threads_key, &checkpoint.thread_id);

        // Execute pipeline
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e: RedisError| {
                dashflow::Error::Generic(format!("Failed to save checkpoint: {}", e))
            })?;

        debug!(
            "Saved checkpoint {} for thread {}",
            checkpoint.id, checkpoint.thread_id
        );

        // Apply retention policy if configured
        if self.retention_policy.is_some() {
            if let Err(e) = self.apply_retention(&checkpoint.thread_id).await {
                // Log but don't fail the save operation if retention cleanup fails
                tracing::warn!(
                    "Failed to apply retention policy for thread {}: {}",
                    checkpoint.thread_id,
                    e
                );
            }
        }

        Ok(())
    }

    async fn load(&self, checkpoint_id: &str) -> DashFlowResult<Option<Checkpoint<S>>> {
        let checkpoint_key = self.checkpoint_key(checkpoint_id);

        let mut conn = self.connection_manager.clone();

        // Get all fields from checkpoint hash
        let data: std::collections::HashMap<String, Vec<u8>> = conn
            .hgetall(&checkpoint_key)
            .await
            .map_err(|e: RedisError| {
                dashflow::Error::Generic(format!("Failed to load checkpoint: {}", e))
            })?;

        if data.is_empty() {
            return Ok(None);
        }

        let checkpoint = self.deserialize_checkpoint(data).map_err(|e| {
            dashflow::Error::Generic(format!("Failed to deserialize checkpoint: {}", e))
        })?;

        debug!("Loaded checkpoint {}", checkpoint_id);

        Ok(Some(checkpoint))
    }

    async fn get_latest(&self, thread_id: &str) -> DashFlowResult<Option<Checkpoint<S>>> {
        let thread_checkpoints_key = self.thread_checkpoints_key(thread_id);

        let mut conn = self.connection_manager.clone();

        // Get the checkpoint with the highest timestamp (most recent)
        // ZREVRANGE returns members in descending score order
        let checkpoint_ids: Vec<String> = conn
            .zrevrange(&thread_checkpoints_key, 0, 0)
            .await
            .map_err(|e: RedisError| {
                dashflow::Error::Generic(format!("Failed to get latest checkpoint: {}", e))
            })?;

        if let Some(checkpoint_id) = checkpoint_ids.first() {
            self.load(checkpoint_id).await
        } else {
            Ok(None)
        }
    }

    async fn list(&self, thread_id: &str) -> DashFlowResult<Vec<CheckpointMetadata>> {
        let thread_checkpoints_key = self.thread_checkpoints_key(thread_id);

        let mut conn = self.connection_manager.clone();

        // Get all checkpoint IDs for this thread, ordered by timestamp (descending)
        let checkpoint_ids: Vec<String> = conn
            .zrevrange(&thread_checkpoints_key, 0, -1)
            .await
            .map_err(|e: RedisError| {
                dashflow::Error::Generic(format!("Failed to list checkpoints: {}", e))
            })?;

        let mut metadatas = Vec::new();

        for checkpoint_id in checkpoint_ids {
            let checkpoint_key = self.checkpoint_key(&checkpoint_id);

            // Get metadata fields only (no state) using HMGET
            let fields = [
                "checkpoint_id",
                "thread_id",
                "node",
                "timestamp",
                "parent_id",
                "metadata",
            ];

            // HMGET returns values in same order as fields requested
            let values: Vec<Option<Vec<u8>>> = redis::cmd("HMGET")
                .arg(&checkpoint_key)
                .arg(&fields)
                .query_async(&mut conn)
                .await
                .map_err(|e: RedisError| {
                    dashflow::Error::Generic(format!("Failed to get checkpoint metadata: {}", e))
                })?;

            // Build HashMap from fields and values
            let mut data = std::collections::HashMap::new();
            for (field, value) in fields.iter().zip(values.into_iter()) {
                if let Some(v) = value {
                    data.insert((*field).to_string(), v);
                }
            }

            if data.is_empty() {
                continue;
            }

            let id = checkpoint_id;

            let thread_id_val = String::from_utf8(
                data.get("thread_id")
                    .ok_or_else(|| dashflow::Error::Generic("Missing thread_id field".to_string()))?
                    .clone(),
            )
            .map_err(|e| dashflow::Error::Generic(format!("Invalid thread_id UTF-8: {}", e)))?;

            let node = String::from_utf8(
                data.get("node")
                    .ok_or_else(|| dashflow::Error::Generic("Missing node field".to_string()))?
                    .clone(),
            )
            .map_err(|e| dashflow::Error::Generic(format!("Invalid node UTF-8: {}", e)))?;

            let timestamp_bytes = data
                .get("timestamp")
                .ok_or_else(|| dashflow::Error::Generic("Missing timestamp field".to_string()))?
                .clone();

            let timestamp_str = String::from_utf8(timestamp_bytes)
                .map_err(|e| dashflow::Error::Generic(format!("Invalid timestamp UTF-8: {}", e)))?;

            let timestamp_nanos: i64 = timestamp_str
                .parse()
                .map_err(|e| dashflow::Error::Generic(format!("Invalid timestamp: {}", e)))?;

            let timestamp = nanos_to_timestamp(timestamp_nanos);

            let parent_id = data
                .get("parent_id")
                .and_then(|bytes| String::from_utf8(bytes.clone()).ok())
                .filter(|s| !s.is_empty());

            let metadata_bytes = data.get("metadata").map(|b| b.as_slice()).unwrap_or(b"{}");
            let metadata: std::collections::HashMap<String, String> =
                serde_json::from_slice(metadata_bytes).map_err(|e| {
                    dashflow::Error::Generic(format!("Failed to deserialize metadata: {}", e))
                })?;

            metadatas.push(CheckpointMetadata {
                id,
                thread_id: thread_id_val,
                node,
                timestamp,
                parent_id,
                metadata,
            });
        }

        debug!(
            "Listed {} checkpoints for thread {}",
            metadatas.len(),
            thread_id
        );

        Ok(metadatas)
    }

    async fn delete(&self, checkpoint_id: &str) -> DashFlowResult<()> {
        let checkpoint_key = self.checkpoint_key(checkpoint_id);

        // First, get the thread_id from the checkpoint
        let mut conn = self.connection_manager.clone();

        let thread_id_bytes: Option<Vec<u8>> = conn
            .hget(&checkpoint_key, "thread_id")
            .await
            .map_err(|e: RedisError| {
                dashflow::Error::Generic(format!("Failed to get thread_id for checkpoint: {}", e))
            })?;

        if let Some(thread_id_bytes) = thread_id_bytes {
            let thread_id = String::from_utf8(thread_id_bytes)
                .map_err(|e| dashflow::Error::Generic(format!("Invalid thread_id UTF-8: {}", e)))?;

            let thread_checkpoints_key = self.thread_checkpoints_key(&thread_id);

            // Use pipeline for atomic deletion
            let mut pipe = redis::pipe();
            pipe.atomic();

            // Delete checkpoint hash
            pipe.del(&checkpoint_key);

            // Remove from thread's sorted set
            pipe.zrem(&thread_checkpoints_key, checkpoint_id);

            // Execute pipeline
            pipe.query_async::<()>(&mut conn)
                .await
                .map_err(|e: RedisError| {
                    dashflow::Error::Generic(format!("Failed to delete checkpoint: {}", e))
                })?;

            debug!("Deleted checkpoint {}", checkpoint_id);
        } else {
            // Checkpoint hash doesn't exist or is missing thread_id.
            // Delete the checkpoint key anyway, and also try to clean up orphaned
            // ZSET entries by scanning all threads. This prevents orphaned entries.
            let _: () = conn.del(&checkpoint_key).await.map_err(|e: RedisError| {
                dashflow::Error::Generic(format!("Failed to delete checkpoint: {}", e))
            })?;

            // Try to clean up orphaned ZSET entries across all threads
            let threads_key = self.threads_key();
            let thread_ids: Vec<String> = conn.smembers(&threads_key).await.unwrap_or_default();

            for thread_id in thread_ids {
                let thread_checkpoints_key = self.thread_checkpoints_key(&thread_id);
                // Best-effort cleanup - ignore errors
                let _: std::result::Result<(), _> = conn
                    .zrem::<_, _, ()>(&thread_checkpoints_key, checkpoint_id)
                    .await;
            }

            debug!(
                "Deleted checkpoint {} (orphan cleanup attempted)",
                checkpoint_id
            );
        }

        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> DashFlowResult<()> {
        let thread_checkpoints_key = self.thread_checkpoints_key(thread_id);
        let threads_key = self.threads_key();

        let mut conn = self.connection_manager.clone();

        // Get all checkpoint IDs for this thread
        let checkpoint_ids: Vec<String> = conn
            .zrange(&thread_checkpoints_key, 0, -1)
            .await
            .map_err(|e: RedisError| {
                dashflow::Error::Generic(format!("Failed to get checkpoints for thread: {}", e))
            })?;

        // Delete all checkpoint hashes and the thread's sorted set
        let mut pipe = redis::pipe();
        pipe.atomic();

        for checkpoint_id in checkpoint_ids {
            let checkpoint_key = self.checkpoint_key(&checkpoint_id);
            pipe.del(&checkpoint_key);
        }

        // Delete thread's checkpoint sorted set
        pipe.del(&thread_checkpoints_key);

        // Remove thread from threads set
        pipe.srem(&threads_key, thread_id);

        // Execute pipeline
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e: RedisError| {
                dashflow::Error::Generic(format!("Failed to delete thread: {}", e))
            })?;

        debug!("Deleted all checkpoints for thread {}", thread_id);

        Ok(())
    }

    async fn list_threads(&self) -> DashFlowResult<Vec<dashflow::ThreadInfo>> {
        let threads_key = self.threads_key();
        let mut conn = self.connection_manager.clone();

        // Get all thread IDs from the threads set
        let thread_ids: Vec<String> =
            conn.smembers(&threads_key).await.map_err(|e: RedisError| {
                dashflow::Error::Generic(format!("Failed to list threads: {}", e))
            })?;

        let mut thread_infos = Vec::with_capacity(thread_ids.len());

        for thread_id in thread_ids {
            let thread_checkpoints_key = self.thread_checkpoints_key(&thread_id);

            // Get the latest checkpoint ID for this thread (highest score)
            // ZSET scores are in milliseconds for ordering; precise timestamp is in hash
            let latest: Vec<String> = conn
                .zrevrange(&thread_checkpoints_key, 0, 0)
                .await
                .map_err(|e: RedisError| {
                    dashflow::Error::Generic(format!(
                        "Failed to get latest checkpoint for thread: {}",
                        e
                    ))
                })?;

            if let Some(checkpoint_id) = latest.into_iter().next() {
                // Read precise timestamp from the hash field (nanoseconds)
                let checkpoint_key = self.checkpoint_key(&checkpoint_id);
                let timestamp_bytes: Option<Vec<u8>> =
                    conn.hget(&checkpoint_key, "timestamp").await.ok();

                let timestamp = if let Some(bytes) = timestamp_bytes {
                    String::from_utf8(bytes)
                        .ok()
                        .and_then(|s| s.parse::<i64>().ok())
                        .map(nanos_to_timestamp)
                        .unwrap_or(SystemTime::UNIX_EPOCH)
                } else {
                    SystemTime::UNIX_EPOCH
                };

                thread_infos.push(dashflow::ThreadInfo {
                    thread_id,
                    latest_checkpoint_id: checkpoint_id,
                    updated_at: timestamp,
                    checkpoint_count: None,
                });
            }
        }

        // Sort by updated_at DESC (most recent first)
        thread_infos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        debug!("Listed {} threads", thread_infos.len());
        Ok(thread_infos)
    }
}
