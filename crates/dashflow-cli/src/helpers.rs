/// Helper functions for accessing Event fields from protobuf structure
///
/// The Event struct has a nested Header and attributes `HashMap`, so we need
/// helper functions for ergonomic field access.
use anyhow::{anyhow, Result};
use dashflow_streaming::codec::{decode_message_compatible, DEFAULT_MAX_PAYLOAD_SIZE};
use dashflow_streaming::{attribute_value, DashStreamMessage, Event, Header};

/// Decode a Kafka payload into a DashStreamMessage.
///
/// Producer frames include a 1-byte compression header (0x00/0x01). We decode
/// strictly by default, but fall back to legacy headerless decoding for
/// backwards compatibility with v1.0 topics.
pub fn decode_payload(payload: &[u8]) -> Result<DashStreamMessage> {
    decode_message_compatible(payload, DEFAULT_MAX_PAYLOAD_SIZE)
        .map_err(|e| anyhow!("Failed to decode DashStream payload: {}", e))
}

/// Get the header from an event
pub fn get_header(event: &Event) -> Option<&Header> {
    event.header.as_ref()
}

/// Get `thread_id` from event header
pub fn get_thread_id(event: &Event) -> Option<&str> {
    event.header.as_ref().map(|h| h.thread_id.as_str())
}

/// Get `timestamp_us` from event header
pub fn get_timestamp_us(event: &Event) -> Option<i64> {
    event.header.as_ref().map(|h| h.timestamp_us)
}

/// Get `tenant_id` from event header
pub fn get_tenant_id(event: &Event) -> Option<&str> {
    event.header.as_ref().map(|h| h.tenant_id.as_str())
}

/// Get sequence from event header
pub fn get_sequence(event: &Event) -> Option<u64> {
    event.header.as_ref().map(|h| h.sequence)
}

/// Get `message_id` from event header
pub fn get_message_id(event: &Event) -> Option<&[u8]> {
    event.header.as_ref().map(|h| h.message_id.as_slice())
}

/// Get a string attribute by key
pub fn get_string_attr(event: &Event, key: &str) -> Option<String> {
    event
        .attributes
        .get(key)
        .and_then(|v| v.value.as_ref())
        .and_then(|val| match val {
            attribute_value::Value::StringValue(s) => Some(s.clone()),
            _ => None,
        })
}

/// Get an int attribute by key
pub fn get_int_attr(event: &Event, key: &str) -> Option<i64> {
    event
        .attributes
        .get(key)
        .and_then(|v| v.value.as_ref())
        .and_then(|val| match val {
            attribute_value::Value::IntValue(i) => Some(*i),
            _ => None,
        })
}

/// Commonly used attribute keys
pub mod attr_keys {
    pub const CHECKPOINT_ID: &str = "checkpoint_id";
    pub const EDGE_FROM: &str = "edge_from";
    pub const EDGE_TO: &str = "edge_to";
    pub const TOOL_NAME: &str = "tool_name";
    pub const INPUT_TOKENS: &str = "input_tokens";
    pub const OUTPUT_TOKENS: &str = "output_tokens";
}
