//! DynamoDB-based chat message history storage
//!
//! Stores chat message history in AWS DynamoDB. Messages are serialized to JSON
//! and stored in a DynamoDB table with configurable primary key and TTL support.
//!
//! # Overview
//!
//! The DynamoDB backend uses:
//! - **DynamoDB table** for message storage
//! - **JSON serialization** for message persistence
//! - **Session-based keys** (configurable primary key name)
//! - **Optional TTL** for automatic item expiration
//! - **History size limit** for trimming old messages
//!
//! # Usage
//!
//! ```rust,ignore
//! use dashflow_memory::DynamoDBChatMessageHistory;
//! use dashflow::core::chat_history::BaseChatMessageHistory;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! // Create DynamoDB history with default settings
//! let history = DynamoDBChatMessageHistory::builder()
//!     .table_name("chat_history")
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
//! Matches `DynamoDBChatMessageHistory` from
//! `dashflow_community.chat_message_histories.dynamodb:27-179`.
//!
//! Key features:
//! - Stores messages in DynamoDB table with configurable primary key
//! - Supports optional TTL for automatic expiration
//! - Supports history size limit (keeps only latest N messages)
//! - Uses update_item with SET expression for atomic updates
//! - Supports custom key schemas (composite keys, GSI/LSI keys)

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use dashflow::core::chat_history::BaseChatMessageHistory;
use dashflow::core::messages::Message;
use serde_json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// DynamoDB-based chat message history implementation.
///
/// Stores chat messages in a DynamoDB table, with each session identified by
/// a configurable primary key. Messages are serialized as JSON and stored in
/// a configurable attribute (default: "History").
///
/// # Storage Format
///
/// - **Primary Key**: Configurable (default: "SessionId" = session_id)
/// - **Message Attribute**: Configurable (default: "History")
/// - **Message Format**: JSON-serialized list of Message objects
/// - **TTL Attribute**: Configurable (default: "expireAt")
///
/// # Features
///
/// - **Session-based**: Each session_id gets its own DynamoDB item
/// - **TTL support**: Optional expiration time for automatic cleanup
/// - **History size limit**: Optional limit to keep only latest N messages
/// - **Custom keys**: Support for composite keys and secondary indexes
/// - **JSON serialization**: Uses serde_json for Message serialization
/// - **Thread-safe**: Uses Arc for safe concurrent access
#[derive(Clone)]
pub struct DynamoDBChatMessageHistory {
    client: Arc<Client>,
    table_name: String,
    key: HashMap<String, AttributeValue>,
    ttl: Option<u64>,
    ttl_key_name: String,
    history_size: Option<usize>,
    history_messages_key: String,
}

impl DynamoDBChatMessageHistory {
    /// Creates a new builder for DynamoDBChatMessageHistory
    pub fn builder() -> DynamoDBChatMessageHistoryBuilder {
        DynamoDBChatMessageHistoryBuilder::default()
    }

    /// Get current Unix timestamp in seconds
    fn current_timestamp() -> u64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs(),
            Err(_) => 0,
        }
    }

    /// Read messages from DynamoDB
    async fn read_messages(
        &self,
    ) -> Result<Vec<Message>, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(self.key.clone()))
            .send()
            .await?;

        if let Some(item) = response.item {
            if let Some(AttributeValue::L(messages_list)) = item.get(&self.history_messages_key) {
                let mut messages = Vec::new();
                for attr_val in messages_list {
                    if let AttributeValue::S(json_str) = attr_val {
                        let message: Message = serde_json::from_str(json_str)?;
                        messages.push(message);
                    }
                }
                return Ok(messages);
            }
        }

        Ok(Vec::new())
    }

    /// Write messages to DynamoDB
    async fn write_messages(
        &self,
        messages: &[Message],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Serialize messages to AttributeValue list
        let mut messages_list = Vec::with_capacity(messages.len());
        for msg in messages {
            let json_str = serde_json::to_string(msg)?;
            messages_list.push(AttributeValue::S(json_str));
        }

        let messages_attr = AttributeValue::L(messages_list);

        // Build update expression based on TTL configuration
        if let Some(ttl_seconds) = self.ttl {
            let expire_at = Self::current_timestamp() + ttl_seconds;

            self.client
                .update_item()
                .table_name(&self.table_name)
                .set_key(Some(self.key.clone()))
                .update_expression(format!(
                    "SET {} = :h, {} = :t",
                    self.history_messages_key, self.ttl_key_name
                ))
                .expression_attribute_values(":h", messages_attr)
                .expression_attribute_values(":t", AttributeValue::N(expire_at.to_string()))
                .send()
                .await?;
        } else {
            self.client
                .update_item()
                .table_name(&self.table_name)
                .set_key(Some(self.key.clone()))
                .update_expression(format!("SET {} = :h", self.history_messages_key))
                .expression_attribute_values(":h", messages_attr)
                .send()
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl BaseChatMessageHistory for DynamoDBChatMessageHistory {
    async fn add_messages(
        &self,
        messages: &[Message],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Read existing messages
        let mut existing_messages = self.read_messages().await?;

        // Append new messages
        existing_messages.extend_from_slice(messages);

        // Apply history size limit if configured
        let final_messages = if let Some(limit) = self.history_size {
            if existing_messages.len() > limit {
                existing_messages.split_off(existing_messages.len() - limit)
            } else {
                existing_messages
            }
        } else {
            existing_messages
        };

        // Write back to DynamoDB
        self.write_messages(&final_messages).await
    }

    async fn get_messages(&self) -> Result<Vec<Message>, Box<dyn std::error::Error + Send + Sync>> {
        self.read_messages().await
    }

    async fn clear(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(self.key.clone()))
            .send()
            .await?;

        Ok(())
    }
}

/// Builder for DynamoDBChatMessageHistory
#[derive(Default)]
pub struct DynamoDBChatMessageHistoryBuilder {
    table_name: Option<String>,
    session_id: Option<String>,
    endpoint_url: Option<String>,
    primary_key_name: Option<String>,
    custom_key: Option<HashMap<String, String>>,
    ttl: Option<u64>,
    ttl_key_name: Option<String>,
    history_size: Option<usize>,
    history_messages_key: Option<String>,
}

impl DynamoDBChatMessageHistoryBuilder {
    /// Set the DynamoDB table name (required)
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Set the session ID (required)
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set a custom endpoint URL (useful for testing with LocalStack)
    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the primary key name (default: "SessionId")
    pub fn primary_key_name(mut self, primary_key_name: impl Into<String>) -> Self {
        self.primary_key_name = Some(primary_key_name.into());
        self
    }

    /// Set a custom key (for composite keys or secondary indexes)
    pub fn custom_key(mut self, key: HashMap<String, String>) -> Self {
        self.custom_key = Some(key);
        self
    }

    /// Set TTL in seconds (items will expire after this duration)
    pub fn ttl(mut self, ttl: u64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the TTL attribute name (default: "expireAt")
    pub fn ttl_key_name(mut self, ttl_key_name: impl Into<String>) -> Self {
        self.ttl_key_name = Some(ttl_key_name.into());
        self
    }

    /// Set the maximum number of messages to keep (oldest are trimmed)
    pub fn history_size(mut self, history_size: usize) -> Self {
        self.history_size = Some(history_size);
        self
    }

    /// Set the attribute name for message history (default: "History")
    pub fn history_messages_key(mut self, history_messages_key: impl Into<String>) -> Self {
        self.history_messages_key = Some(history_messages_key.into());
        self
    }

    /// Build the DynamoDBChatMessageHistory
    pub async fn build(
        self,
    ) -> Result<DynamoDBChatMessageHistory, Box<dyn std::error::Error + Send + Sync>> {
        let table_name = self.table_name.ok_or("table_name is required")?;
        let session_id = self.session_id.ok_or("session_id is required")?;

        // Load AWS config
        let config = if let Some(endpoint) = self.endpoint_url {
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .endpoint_url(endpoint)
                .load()
                .await
        } else {
            aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await
        };

        let client = Client::new(&config);

        // Build the key
        let key = if let Some(custom_key) = self.custom_key {
            custom_key
                .into_iter()
                .map(|(k, v)| (k, AttributeValue::S(v)))
                .collect()
        } else {
            let primary_key_name = self
                .primary_key_name
                .unwrap_or_else(|| "SessionId".to_string());
            let mut key = HashMap::new();
            key.insert(primary_key_name, AttributeValue::S(session_id.clone()));
            key
        };

        Ok(DynamoDBChatMessageHistory {
            client: Arc::new(client),
            table_name,
            key,
            ttl: self.ttl,
            ttl_key_name: self.ttl_key_name.unwrap_or_else(|| "expireAt".to_string()),
            history_size: self.history_size,
            history_messages_key: self
                .history_messages_key
                .unwrap_or_else(|| "History".to_string()),
        })
    }
}
