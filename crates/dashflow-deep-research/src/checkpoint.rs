//! `Checkpointer`: persists `RunState` at node and epoch boundaries so a run
//! can resume from the next-to-execute node (spec.md §4.13). Mirrors
//! `dashflow::checkpoint::Checkpointer`'s save/load/get_latest shape,
//! adapted to this crate's own `RunState` and a single `run_id` keyspace
//! (one checkpoint lineage per run, not dashflow's multi-thread graph
//! model).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CheckpointError;
use crate::events::Event;
use crate::types::RunState;

/// The node that will execute next if this checkpoint is resumed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCheckpoint {
    pub run_id: String,
    pub next_node: String,
    pub state: RunState,
    pub seq: u64,
    pub created_at: DateTime<Utc>,
}

/// Pluggable checkpoint persistence (spec.md §4.13 "Storage backend is
/// pluggable: in-memory (ephemeral) or durable (relational)"). Writes are
/// atomic per checkpoint; `mirror_event` is an optional best-effort audit
/// trail hook used by `EventBus` and never blocks event publication.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn put(&self, checkpoint: RunCheckpoint) -> Result<(), CheckpointError>;

    /// Returns the most recent checkpoint for `run_id`. `NotFound` if the
    /// run has never been checkpointed (spec.md §4.13, §7).
    async fn get_latest(&self, run_id: &str) -> Result<RunCheckpoint, CheckpointError>;

    /// Best-effort mirror of an emitted event into durable storage, for
    /// audit trails. Default is a no-op; failures must never fail the run
    /// (spec.md §7 `CheckpointError` "write failure is logged, run
    /// continues but becomes non-resumable").
    async fn mirror_event(&self, _event: &Event) -> Result<(), CheckpointError> {
        Ok(())
    }
}

/// In-memory checkpoint store. Ephemeral: nothing survives process
/// restart. Keeps the full lineage per run (not just the latest) so tests
/// and debugging tools can inspect epoch-by-epoch history.
#[derive(Default)]
pub struct MemoryCheckpointer {
    history: dashmap::DashMap<String, Vec<RunCheckpoint>>,
}

impl MemoryCheckpointer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(&self, run_id: &str) -> Vec<RunCheckpoint> {
        self.history.get(run_id).map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Checkpointer for MemoryCheckpointer {
    async fn put(&self, checkpoint: RunCheckpoint) -> Result<(), CheckpointError> {
        self.history.entry(checkpoint.run_id.clone()).or_default().push(checkpoint);
        Ok(())
    }

    async fn get_latest(&self, run_id: &str) -> Result<RunCheckpoint, CheckpointError> {
        self.history
            .get(run_id)
            .and_then(|v| v.last().cloned())
            .ok_or_else(|| CheckpointError::NotFound { run_id: run_id.to_string() })
    }
}

/// Wraps any `Checkpointer` so write failures degrade gracefully: the run
/// keeps going non-resumably rather than aborting, per spec.md §7
/// `CheckpointError` propagation policy. `RunController` wraps whatever
/// backend it is given in this before handing it to the workflow.
pub struct DegradingCheckpointer<C> {
    inner: C,
}

impl<C: Checkpointer> DegradingCheckpointer<C> {
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: Checkpointer> Checkpointer for DegradingCheckpointer<C> {
    async fn put(&self, checkpoint: RunCheckpoint) -> Result<(), CheckpointError> {
        let run_id = checkpoint.run_id.clone();
        if let Err(err) = self.inner.put(checkpoint).await {
            warn!(run_id, error = %err, "checkpoint write failed; run continues but is not resumable");
        }
        Ok(())
    }

    async fn get_latest(&self, run_id: &str) -> Result<RunCheckpoint, CheckpointError> {
        self.inner.get_latest(run_id).await
    }

    async fn mirror_event(&self, event: &Event) -> Result<(), CheckpointError> {
        if let Err(err) = self.inner.mirror_event(event).await {
            warn!(error = %err, "event mirror failed, continuing");
        }
        Ok(())
    }
}

#[cfg(feature = "postgres-checkpointer")]
pub mod postgres {
    //! Durable relational backend. Mirrors
    //! `dashflow-postgres-checkpointer`'s table-per-concern layout, scaled
    //! down to this crate's single `RunCheckpoint` row shape.

    use super::{CheckpointError, Checkpointer, RunCheckpoint};
    use async_trait::async_trait;
    use tokio_postgres::Client;

    pub struct PostgresCheckpointer {
        client: Client,
    }

    impl PostgresCheckpointer {
        /// Creates the backing table if absent and returns a checkpointer
        /// bound to `client`.
        pub async fn new(client: Client) -> Result<Self, CheckpointError> {
            client
                .batch_execute(
                    "CREATE TABLE IF NOT EXISTS deep_research_checkpoints (
                        run_id TEXT NOT NULL,
                        seq BIGINT NOT NULL,
                        next_node TEXT NOT NULL,
                        state JSONB NOT NULL,
                        created_at TIMESTAMPTZ NOT NULL,
                        PRIMARY KEY (run_id, seq)
                    )",
                )
                .await
                .map_err(|e| CheckpointError::StoreUnavailable { reason: e.to_string() })?;
            Ok(Self { client })
        }
    }

    #[async_trait]
    impl Checkpointer for PostgresCheckpointer {
        async fn put(&self, checkpoint: RunCheckpoint) -> Result<(), CheckpointError> {
            let state_json = serde_json::to_value(&checkpoint.state)
                .map_err(|e| CheckpointError::Serialization { run_id: checkpoint.run_id.clone(), reason: e.to_string() })?;
            self.client
                .execute(
                    "INSERT INTO deep_research_checkpoints (run_id, seq, next_node, state, created_at)
                     VALUES ($1, $2, $3, $4, $5)
                     ON CONFLICT (run_id, seq) DO UPDATE SET next_node = EXCLUDED.next_node, state = EXCLUDED.state",
                    &[&checkpoint.run_id, &(checkpoint.seq as i64), &checkpoint.next_node, &state_json, &checkpoint.created_at],
                )
                .await
                .map_err(|e| CheckpointError::WriteFailed { run_id: checkpoint.run_id.clone(), reason: e.to_string() })?;
            Ok(())
        }

        async fn get_latest(&self, run_id: &str) -> Result<RunCheckpoint, CheckpointError> {
            let row = self
                .client
                .query_opt(
                    "SELECT run_id, seq, next_node, state, created_at FROM deep_research_checkpoints
                     WHERE run_id = $1 ORDER BY seq DESC LIMIT 1",
                    &[&run_id],
                )
                .await
                .map_err(|e| CheckpointError::StoreUnavailable { reason: e.to_string() })?
                .ok_or_else(|| CheckpointError::NotFound { run_id: run_id.to_string() })?;

            let state_json: serde_json::Value = row.get("state");
            let state = serde_json::from_value(state_json)
                .map_err(|e| CheckpointError::Serialization { run_id: run_id.to_string(), reason: e.to_string() })?;
            Ok(RunCheckpoint {
                run_id: row.get("run_id"),
                seq: row.get::<_, i64>("seq") as u64,
                next_node: row.get("next_node"),
                state,
                created_at: row.get("created_at"),
            })
        }
    }
}
