//! Error taxonomy for the deep research orchestrator.
//!
//! Each subsystem gets its own `thiserror`-typed enum rather than a single
//! catch-all, mirroring the rest of the workspace (see
//! `dashflow-context::ContextError`, `dashflow-postgres-checkpointer::Error`).
//! Only these types cross public API boundaries; nothing here reaches for
//! `anyhow`.

use thiserror::Error;

/// Failures from a single outbound provider call. Recovered locally by
/// `ProviderReliability` (retry / circuit-break per spec.md §4.4); surfaced
/// to callers only once every provider in a profile is exhausted.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProviderError {
    /// The call did not complete within its configured timeout.
    #[error("provider '{provider}' timed out after {elapsed_ms}ms")]
    Timeout { provider: String, elapsed_ms: u64 },

    /// A transport-level failure (connection reset, DNS, TLS, 5xx, ...).
    #[error("provider '{provider}' transport error: {reason}")]
    Transport { provider: String, reason: String },

    /// The provider responded with a rate-limit signal.
    #[error("provider '{provider}' rate limited")]
    RateLimited { provider: String },

    /// The circuit for this provider is open; the call was rejected without
    /// invoking the underlying function.
    #[error("provider '{provider}' unavailable (circuit open)")]
    ProviderUnavailable { provider: String },

    /// A 4xx-class client error. Does not count toward circuit breaker
    /// failure tallies per spec.md §4.4.
    #[error("provider '{provider}' rejected the request: {reason}")]
    BadRequest { provider: String, reason: String },
}

impl ProviderError {
    /// Whether this failure should count toward the circuit breaker's
    /// consecutive-failure tally. 4xx/bad-request errors do not.
    #[must_use]
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, ProviderError::BadRequest { .. })
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Timeout { provider, .. }
            | ProviderError::Transport { provider, .. }
            | ProviderError::RateLimited { provider }
            | ProviderError::ProviderUnavailable { provider }
            | ProviderError::BadRequest { provider, .. } => provider,
        }
    }
}

/// Checkpoint store failures (spec.md §4.13, §7).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CheckpointError {
    #[error("no checkpoint found for run '{run_id}'")]
    NotFound { run_id: String },

    #[error("checkpoint store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("failed to serialize checkpoint for run '{run_id}': {reason}")]
    Serialization { run_id: String, reason: String },

    #[error("checkpoint write failed for run '{run_id}': {reason}")]
    WriteFailed { run_id: String, reason: String },
}

/// Context window management failures (spec.md §4.7).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContextError {
    #[error("message at index {index} ({tokens} tokens) exceeds the available budget of {budget} tokens even alone")]
    MessageTooLarge { index: usize, tokens: usize, budget: usize },

    #[error("reserved tokens ({reserved}) exceed the context limit ({limit})")]
    ReservedExceedsLimit { reserved: usize, limit: usize },
}

/// Query planning failures (spec.md §4.8, §7 `ParsingError`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlannerError {
    #[error("planner output could not be parsed: {reason}")]
    ParsingFailed { reason: String },

    #[error("planner LLM call failed: {reason}")]
    LlmFailed { reason: String },
}

/// Report-composition failures (spec.md §4.11 writer node).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriterError {
    #[error("writer LLM call failed: {reason}")]
    LlmFailed { reason: String },
}

/// Multi-provider search orchestration failures (spec.md §4.5, §8 boundary
/// `search_providers=[]`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OrchestratorError {
    #[error("no search providers are registered or enabled")]
    NoProviders,

    #[error("all providers in profile '{profile}' are unavailable")]
    AllProvidersUnavailable { profile: String },

    #[error("run was cancelled during search fan-out")]
    Cancelled,
}

/// Workflow graph and node execution failures (spec.md §4.11, §7).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkflowError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error("run cancelled at checkpoint '{checkpoint}'")]
    Cancelled { checkpoint: String },

    #[error("run exceeded its token or wall-clock budget")]
    BudgetExceeded,

    #[error("router classification failed: {reason}")]
    ClassificationFailed { reason: String },

    #[error("internal invariant violated: {0}")]
    FatalInternal(String),
}

/// Top-level error returned by `RunController`. Unifies every subsystem
/// error kind behind one type at the public boundary, per spec.md §7's
/// "surfaced uniformly" propagation policy.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("run '{run_id}' not found")]
    RunNotFound { run_id: String },

    #[error("cancellation requested for unknown run '{run_id}' (no-op)")]
    UnknownRunCancel { run_id: String },

    #[error("requested model '{model}' is not registered")]
    ModelNotFound { model: String },
}

impl From<ProviderError> for OrchestratorError {
    fn from(_: ProviderError) -> Self {
        OrchestratorError::AllProvidersUnavailable { profile: "general".to_string() }
    }
}
