//! `EventBus`: single-producer-per-run, multi-consumer ordered event
//! stream (spec.md §4.12).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::warn;

use crate::checkpoint::Checkpointer;

/// Wire-level event kinds (spec.md §4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Status,
    Plan,
    ToolStart,
    ToolResult,
    ToolError,
    Screenshot,
    Artifact,
    TextDelta,
    Quality,
    Completion,
    Interrupt,
    Cancelled,
    Error,
    Done,
}

/// One event on a run's stream; matches spec.md §6's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub seq: u64,
    pub ts: DateTime<Utc>,
    pub run_id: String,
    pub data: Value,
}

/// Per-run event stream. `publish` is non-blocking for the producer: a
/// lagging consumer drops the oldest events it hasn't read rather than
/// stalling the run (spec.md §5 "bounded buffer ... drop-oldest").
pub struct EventBus {
    run_id: String,
    sender: broadcast::Sender<Event>,
    seq: AtomicU64,
    checkpointer: Option<Arc<dyn Checkpointer>>,
}

impl EventBus {
    #[must_use]
    pub fn new(run_id: impl Into<String>, buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self { run_id: run_id.into(), sender, seq: AtomicU64::new(0), checkpointer: None }
    }

    #[must_use]
    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Publishes `kind`/`data` with the next monotonic sequence number.
    /// Never blocks; if there are no subscribers the event is simply
    /// dropped (spec.md's bounded-buffer eviction policy applies only when
    /// consumers exist but lag).
    pub fn publish(&self, kind: EventKind, data: Value) -> Event {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let event = Event { kind, seq, ts: Utc::now(), run_id: self.run_id.clone(), data };
        if self.sender.send(event.clone()).is_err() {
            // No active subscribers; not an error.
        }
        if let Some(checkpointer) = &self.checkpointer {
            let checkpointer = checkpointer.clone();
            let event_clone = event.clone();
            tokio::spawn(async move {
                if let Err(err) = checkpointer.mirror_event(&event_clone).await {
                    warn!(error = %err, "failed to mirror event to checkpointer");
                }
            });
        }
        event
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    #[must_use]
    pub fn next_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequence_numbers_are_monotonic_and_total() {
        let bus = EventBus::new("run-1", 16);
        let mut rx = bus.subscribe();
        bus.publish(EventKind::Status, serde_json::json!({}));
        bus.publish(EventKind::Plan, serde_json::json!({}));
        bus.publish(EventKind::Done, serde_json::json!({}));

        let mut seqs = Vec::new();
        for _ in 0..3 {
            seqs.push(rx.recv().await.unwrap().seq);
        }
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new("run-1", 4);
        bus.publish(EventKind::Status, serde_json::json!({"x": 1}));
        assert_eq!(bus.next_seq(), 1);
    }

    #[tokio::test]
    async fn lagging_consumer_drops_oldest_under_small_buffer() {
        let bus = EventBus::new("run-1", 2);
        let mut rx = bus.subscribe();
        for i in 0..5 {
            bus.publish(EventKind::Status, serde_json::json!({"i": i}));
        }
        // The receiver lagged; it should still be able to recover and keep
        // receiving rather than block the producer.
        let result = rx.recv().await;
        assert!(result.is_ok() || matches!(result, Err(broadcast::error::RecvError::Lagged(_))));
    }

    #[test]
    fn event_serializes_with_wire_field_names() {
        let event = Event { kind: EventKind::Quality, seq: 3, ts: Utc::now(), run_id: "r".into(), data: serde_json::json!({"a": 1}) };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "quality");
        assert_eq!(json["seq"], 3);
        assert_eq!(json["run_id"], "r");
    }
}
