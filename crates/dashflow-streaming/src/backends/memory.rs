// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)
// DashFlow Streaming - In-Memory Backend

//! # In-Memory Streaming Backend
//!
//! A simple in-memory backend for testing and development.
//! Messages are stored in memory and lost when the backend is dropped.
//!
//! ## Features
//!
//! - Zero external dependencies (no Kafka, Redis, etc.)
//! - Fast message delivery (direct memory access)
//! - Multiple topics support
//! - Consumer group support with offset tracking
//! - Ideal for unit tests and local development
//!
//! ## Example
//!
//! ```rust
//! use dashflow_streaming::backends::{StreamBackend, InMemoryBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryBackend::new();
//!
//!     // Create producer and consumer
//!     let producer = backend.create_producer("events").await?;
//!     let mut consumer = backend.create_consumer("events", "test-group").await?;
//!
//!     // ... send and receive messages
//!     Ok(())
//! }
//! ```

use super::traits::{BackendError, BackendResult, StreamBackend, StreamConsumer, StreamProducer};
use crate::DashStreamMessage;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Stored message with metadata
#[derive(Clone)]
#[allow(dead_code)] // Architectural: Struct fields accessed via Vec<StoredMessage> in TopicData
struct StoredMessage {
    message: DashStreamMessage,
    offset: i64,
    timestamp_us: i64,
}

/// Topic storage
struct TopicData {
    messages: tokio::sync::RwLock<Vec<StoredMessage>>,
    next_offset: AtomicI64,
    sender: broadcast::Sender<()>,
}

impl TopicData {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_TOPIC_NOTIFICATION_CHANNEL_CAPACITY);
        Self {
            messages: tokio::sync::RwLock::new(Vec::new()),
            next_offset: AtomicI64::new(0),
            sender,
        }
    }
}

/// Consumer group offset tracking
struct ConsumerGroupOffsets {
    offsets: DashMap<String, i64>, // topic -> committed offset
}

impl ConsumerGroupOffsets {
    fn new() -> Self {
        Self {
            offsets: DashMap::new(),
        }
    }
}

/// In-memory streaming backend
///
/// Provides a fully in-memory message queue for testing and development.
/// All data is lost when the backend is dropped.
///
/// To avoid unbounded growth in long-running dev sessions, topics enforce a
/// soft cap on stored messages. The cap is high by default and can be adjusted.
pub const DEFAULT_MAX_MESSAGES_PER_TOPIC: usize = 100_000;

/// Default capacity for the per-topic broadcast notification channel.
///
/// This is used to wake consumers when new messages arrive; the payload is `()`.
pub const DEFAULT_TOPIC_NOTIFICATION_CHANNEL_CAPACITY: usize = 1024;

/// In-memory implementation of the streaming backend.
///
/// Intended for tests and local development where Kafka is not required.
pub struct InMemoryBackend {
    topics: Arc<DashMap<String, Arc<TopicData>>>,
    consumer_groups: Arc<DashMap<String, Arc<ConsumerGroupOffsets>>>,
    closed: AtomicBool,
    message_count: Arc<AtomicU64>,
    max_messages_per_topic: usize,
}

impl InMemoryBackend {
    /// Create a new in-memory backend
    pub fn new() -> Self {
        Self::with_max_messages_per_topic(DEFAULT_MAX_MESSAGES_PER_TOPIC)
    }

    /// Create a new in-memory backend with a custom per-topic cap.
    pub fn with_max_messages_per_topic(max_messages_per_topic: usize) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            consumer_groups: Arc::new(DashMap::new()),
            closed: AtomicBool::new(false),
            message_count: Arc::new(AtomicU64::new(0)),
            max_messages_per_topic,
        }
    }

    /// Get or create topic data
    fn get_or_create_topic(&self, topic: &str) -> Arc<TopicData> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| Arc::new(TopicData::new()))
            .clone()
    }

    /// Get or create consumer group
    fn get_or_create_group(&self, group_id: &str) -> Arc<ConsumerGroupOffsets> {
        self.consumer_groups
            .entry(group_id.to_string())
            .or_insert_with(|| Arc::new(ConsumerGroupOffsets::new()))
            .clone()
    }

    /// Get total message count across all topics
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::Relaxed)
    }

    /// Get message count for a specific topic
    pub async fn topic_message_count(&self, topic: &str) -> usize {
        if let Some(topic_data) = self.topics.get(topic) {
            topic_data.messages.read().await.len()
        } else {
            0
        }
    }

    /// Clear all messages (useful for test reset)
    pub async fn clear(&self) {
        for entry in self.topics.iter() {
            let mut messages = entry.messages.write().await;
            messages.clear();
            entry.next_offset.store(0, Ordering::SeqCst);
        }
        self.message_count.store(0, Ordering::Relaxed);
    }

    /// List all topics
    pub fn list_topics(&self) -> Vec<String> {
        self.topics.iter().map(|e| e.key().clone()).collect()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamBackend for InMemoryBackend {
    type Producer = InMemoryProducer;
    type Consumer = InMemoryConsumer;

    async fn create_producer(&self, topic: &str) -> BackendResult<Self::Producer> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(BackendError::Closed);
        }

        let topic_data = self.get_or_create_topic(topic);

        Ok(InMemoryProducer {
            topic: topic.to_string(),
            topic_data,
            message_count: Arc::new(AtomicU64::new(0)),
            global_count: Arc::clone(&self.message_count),
            max_messages_per_topic: self.max_messages_per_topic,
        })
    }

    async fn create_consumer(&self, topic: &str, group_id: &str) -> BackendResult<Self::Consumer> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(BackendError::Closed);
        }

        let topic_data = self.get_or_create_topic(topic);
        let group = self.get_or_create_group(group_id);

        // Get starting offset (committed offset or 0)
        // DashMap::get returns Ref wrapper, dereference to get value
        let start_offset = group.offsets.get(topic).map_or(0, |r| *r);

        Ok(InMemoryConsumer {
            topic: topic.to_string(),
            group_id: group_id.to_string(),
            topic_data,
            group_offsets: group,
            current_offset: start_offset,
            receiver: None,
        })
    }

    async fn health_check(&self) -> BackendResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            Err(BackendError::Closed)
        } else {
            Ok(())
        }
    }

    async fn close(&self) -> BackendResult<()> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// In-memory producer
pub struct InMemoryProducer {
    topic: String,
    topic_data: Arc<TopicData>,
    message_count: Arc<AtomicU64>,
    global_count: Arc<AtomicU64>,
    max_messages_per_topic: usize,
}

#[async_trait]
impl StreamProducer for InMemoryProducer {
    async fn send(&self, message: DashStreamMessage) -> BackendResult<()> {
        let timestamp_us = chrono::Utc::now().timestamp_micros();

        let mut messages = self.topic_data.messages.write().await;
        if messages.len() >= self.max_messages_per_topic {
            return Err(BackendError::Other(format!(
                "InMemoryBackend topic '{}' exceeded max_messages_per_topic={}",
                self.topic, self.max_messages_per_topic
            )));
        }

        let offset = self.topic_data.next_offset.fetch_add(1, Ordering::SeqCst);
        messages.push(StoredMessage {
            message,
            offset,
            timestamp_us,
        });

        self.message_count.fetch_add(1, Ordering::Relaxed);
        self.global_count.fetch_add(1, Ordering::Relaxed);

        // Notify waiting consumers
        // SAFETY: Broadcast send failure means no consumers are waiting - that's OK.
        let _ = self.topic_data.sender.send(());

        Ok(())
    }

    async fn flush(&self) -> BackendResult<()> {
        // In-memory backend doesn't need flushing
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

/// In-memory consumer
pub struct InMemoryConsumer {
    topic: String,
    group_id: String,
    topic_data: Arc<TopicData>,
    group_offsets: Arc<ConsumerGroupOffsets>,
    current_offset: i64,
    receiver: Option<broadcast::Receiver<()>>,
}

#[async_trait]
impl StreamConsumer for InMemoryConsumer {
    async fn next(&mut self) -> Option<BackendResult<DashStreamMessage>> {
        // Check for available message
        loop {
            {
                let messages = self.topic_data.messages.read().await;
                if let Some(stored) = messages.get(self.current_offset as usize) {
                    self.current_offset += 1;
                    return Some(Ok(stored.message.clone()));
                }
            }

            // No message available, subscribe and wait
            if self.receiver.is_none() {
                self.receiver = Some(self.topic_data.sender.subscribe());
            }

            // Wait for notification
            if let Some(ref mut rx) = self.receiver {
                match rx.recv().await {
                    Ok(_) => continue, // Check again
                    Err(broadcast::error::RecvError::Closed) => return None,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        }
    }

    async fn next_timeout(
        &mut self,
        timeout: Duration,
    ) -> Option<BackendResult<DashStreamMessage>> {
        tokio::time::timeout(timeout, self.next())
            .await
            .unwrap_or(None)
    }

    async fn commit(&mut self) -> BackendResult<()> {
        self.group_offsets
            .offsets
            .insert(self.topic.clone(), self.current_offset);
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn group_id(&self) -> &str {
        &self.group_id
    }

    fn current_offset(&self) -> i64 {
        self.current_offset
    }
}
