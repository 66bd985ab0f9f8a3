//! Async batching queue for efficient run submission

use crate::client::Client;
use crate::error::Result;
use crate::run::{RunCreate, RunUpdate};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Default batch size for submissions
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Default flush interval (5 seconds)
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Message for the batch queue
#[derive(Debug)]
enum QueueMessage {
    /// Create a new run
    Create(RunCreate),
    /// Update an existing run
    Update(Uuid, RunUpdate),
    /// Flush all pending items immediately
    Flush,
    /// Shutdown the queue
    Shutdown,
}

/// Default capacity for the batch queue channel
const BATCH_QUEUE_CHANNEL_CAPACITY: usize = 10000;

/// Async batching queue for `LangSmith` runs
///
/// This queue collects run creations and updates, batching them together
/// for efficient submission to the `LangSmith` API.
pub struct BatchQueue {
    sender: mpsc::Sender<QueueMessage>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl BatchQueue {
    /// Create a new batch queue with default settings
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_config(client, DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL)
    }

    /// Create a new batch queue with custom configuration
    #[must_use]
    pub fn with_config(client: Client, batch_size: usize, flush_interval: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(BATCH_QUEUE_CHANNEL_CAPACITY);

        let handle = tokio::spawn(async move {
            run_batch_worker(client, receiver, batch_size, flush_interval).await;
        });

        Self {
            sender,
            handle: Some(handle),
        }
    }

    /// Submit a run creation to the queue
    pub fn create_run(&self, run: RunCreate) -> Result<()> {
        match self.sender.try_send(QueueMessage::Create(run)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Batch queue full, dropping run creation");
                Err(crate::error::Error::Other("Queue is full".to_string()))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(crate::error::Error::Other("Queue is closed".to_string()))
            }
        }
    }

    /// Submit a run update to the queue
    pub fn update_run(&self, run_id: Uuid, update: RunUpdate) -> Result<()> {
        match self.sender.try_send(QueueMessage::Update(run_id, update)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(run_id = %run_id, "Batch queue full, dropping run update");
                Err(crate::error::Error::Other("Queue is full".to_string()))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(crate::error::Error::Other("Queue is closed".to_string()))
            }
        }
    }

    /// Flush all pending items immediately
    pub fn flush(&self) -> Result<()> {
        match self.sender.try_send(QueueMessage::Flush) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                // Flush is less critical - queue being full means flush is coming anyway
                warn!("Batch queue full during flush request");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(crate::error::Error::Other("Queue is closed".to_string()))
            }
        }
    }

    /// Shutdown the queue gracefully, flushing all pending items
    pub async fn shutdown(mut self) {
        // Shutdown is critical - use blocking send to ensure it arrives
        let _ = self.sender.try_send(QueueMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for BatchQueue {
    fn drop(&mut self) {
        // Send shutdown signal on drop - best effort
        let _ = self.sender.try_send(QueueMessage::Shutdown);
    }
}

/// Worker function that processes batches
async fn run_batch_worker(
    client: Client,
    mut receiver: mpsc::Receiver<QueueMessage>,
    batch_size: usize,
    flush_interval: Duration,
) {
    let mut pending_creates = Vec::new();
    let mut pending_updates: Vec<(Uuid, RunUpdate)> = Vec::new();
    let mut flush_timer = interval(flush_interval);
    flush_timer.tick().await; // Skip first immediate tick

    loop {
        tokio::select! {
            // Process incoming messages
            msg = receiver.recv() => {
                match msg {
                    Some(QueueMessage::Create(run)) => {
                        pending_creates.push(run);
                        if pending_creates.len() >= batch_size {
                            flush_batch(&client, &mut pending_creates, &mut pending_updates).await;
                        }
                    }
                    Some(QueueMessage::Update(run_id, update)) => {
                        pending_updates.push((run_id, update));
                        if pending_updates.len() >= batch_size {
                            flush_batch(&client, &mut pending_creates, &mut pending_updates).await;
                        }
                    }
                    Some(QueueMessage::Flush) => {
                        flush_batch(&client, &mut pending_creates, &mut pending_updates).await;
                    }
                    Some(QueueMessage::Shutdown) | None => {
                        // Flush remaining items and exit
                        flush_batch(&client, &mut pending_creates, &mut pending_updates).await;
                        debug!("Batch queue worker shutting down");
                        break;
                    }
                }
            }

            // Periodic flush
            _ = flush_timer.tick() => {
                if !pending_creates.is_empty() || !pending_updates.is_empty() {
                    flush_batch(&client, &mut pending_creates, &mut pending_updates).await;
                }
            }
        }
    }
}

/// Flush pending creates and updates to the API
async fn flush_batch(
    client: &Client,
    creates: &mut Vec<RunCreate>,
    updates: &mut Vec<(Uuid, RunUpdate)>,
) {
    if creates.is_empty() && updates.is_empty() {
        return;
    }

    debug!(
        "Flushing batch: {} creates, {} updates",
        creates.len(),
        updates.len()
    );

    let batch = crate::client::BatchIngest {
        post: std::mem::take(creates),
        patch: std::mem::take(updates),
    };

    if let Err(e) = client.batch_ingest_runs(&batch).await {
        error!("Failed to submit batch: {}", e);
        // Put items back for retry (simple approach - could be more sophisticated)
        warn!(
            "Lost {} run submissions due to API error",
            batch.post.len() + batch.patch.len()
        );
    }
}
