//! `RunController`: the top-level façade binding every component into a
//! single run lifecycle (spec.md §4.14). Accepts `(input, options)`,
//! allocates a run ID and cancel token, drives `WorkflowGraph` to
//! completion (or cancellation), and streams events while it goes.
//!
//! Long-lived, model-independent collaborators — `SourceRegistry`,
//! `SearchCache`, `ProviderReliability`, `MultiSearchOrchestrator`,
//! `ContentHydrator`, `ContextManager` — are constructed once and shared
//! across every run, per spec.md §9's note to promote module-level
//! singletons to explicitly constructed, shared components. The
//! model-dependent collaborators (`QueryPlanner`, `Writer`, `ClaimVerifier`,
//! `EvidenceEvaluator`, `DeepSearchEngine`, `WorkflowGraph`) are cheap
//! struct compositions rebuilt per run so a caller can pick a different
//! registered model per `start_run` call via `StartOptions::model`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::cancellation::CancellationRegistry;
use crate::checkpoint::{Checkpointer, DegradingCheckpointer, MemoryCheckpointer, RunCheckpoint};
use crate::claim_verifier::ClaimVerifier;
use crate::config::RunConfig;
use crate::context::ContextManager;
use crate::deepsearch::{DeepSearchEngine, DeepSearchMode, DeepSearchSettings};
use crate::error::{RunError, WorkflowError};
use crate::evaluator::EvidenceEvaluator;
use crate::events::{Event, EventBus, EventKind};
use crate::hydrator::ContentHydrator;
use crate::orchestrator::{MultiSearchOrchestrator, OrchestratorSettings};
use crate::planner::QueryPlanner;
use crate::providers::{ChatModel, Crawler, LlmRegistry, ProviderRegistry};
use crate::reliability::ProviderReliability;
use crate::search_cache::SearchCache;
use crate::source_registry::SourceRegistry;
use crate::types::{Budget, Mode, QualityMetrics, RunState};
use crate::workflow::{Node, WorkflowGraph, WorkflowSettings};
use crate::writer::Writer;

/// Options recognized by `start_run` (spec.md §6 inbound interface).
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    pub mode: Option<Mode>,
    /// Model id to resolve from the `LlmRegistry`; the registry's
    /// first-registered model is used when absent.
    pub model: Option<String>,
    pub agent_id: Option<String>,
    pub user_id: Option<String>,
    /// Carried for wire-format parity with spec.md §6; this crate has no
    /// vision pipeline, so image inputs are not otherwise consumed.
    pub images: Vec<String>,
    pub deepsearch_mode: Option<DeepSearchMode>,
}

/// Lifecycle status of a run tracked by the controller's read models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Row returned by `list_runs` (spec.md §6).
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub status: RunStatus,
    pub mode: Mode,
    pub started_at: DateTime<Utc>,
    pub input: String,
}

/// Full detail returned by `get_run` (spec.md §6).
#[derive(Debug, Clone, Serialize)]
pub struct RunDetail {
    pub run_id: String,
    pub status: RunStatus,
    pub mode: Mode,
    pub started_at: DateTime<Utc>,
    pub input: String,
    pub epoch: u32,
    pub final_report: Option<String>,
    pub quality: Option<QualityMetrics>,
    pub error: Option<String>,
}

struct RunRecord {
    input: String,
    mode: Mode,
    started_at: DateTime<Utc>,
    mutable: Mutex<RunRecordMutable>,
}

struct RunRecordMutable {
    status: RunStatus,
    epoch: u32,
    final_report: Option<String>,
    quality: Option<QualityMetrics>,
    error: Option<String>,
}

/// Shared state behind `RunController`'s cheap `Clone`. Spawned run tasks
/// hold their own `Arc<Inner>` so `start_run` can return before the run
/// finishes.
struct Inner {
    config: RunConfig,
    llms: LlmRegistry,
    cancellation: CancellationRegistry,
    checkpointer: Arc<dyn Checkpointer>,
    source_registry: Arc<SourceRegistry>,
    search_cache: Arc<SearchCache>,
    reliability: Arc<ProviderReliability>,
    orchestrator: Arc<MultiSearchOrchestrator>,
    hydrator: Arc<ContentHydrator>,
    context: Arc<ContextManager>,
    runs: DashMap<String, RunRecord>,
}

/// Top-level run-lifecycle façade (spec.md §4.14). One instance per
/// service; cheap to clone (`Arc` internally) so HTTP handlers can each
/// hold their own handle to the same running service.
#[derive(Clone)]
pub struct RunController {
    inner: Arc<Inner>,
}

impl RunController {
    /// `crawler` is optional (spec.md §8 boundary: crawler disabled still
    /// yields sparse-excerpt results). `checkpointer` defaults to an
    /// in-memory, degrading store when `None` — durable persistence (and
    /// therefore `resume_run`) requires passing one explicitly (e.g. the
    /// `postgres-checkpointer` feature's backend).
    #[must_use]
    pub fn new(
        config: RunConfig,
        providers: ProviderRegistry,
        llms: LlmRegistry,
        crawler: Option<Arc<dyn Crawler>>,
        checkpointer: Option<Arc<dyn Checkpointer>>,
    ) -> Self {
        let providers = providers.filtered(&config.search_providers);
        let source_registry = Arc::new(SourceRegistry::new());
        let search_cache = Arc::new(SearchCache::new(
            config.search_cache_max_size,
            Duration::from_secs(config.search_cache_ttl_seconds),
        ));
        let reliability = Arc::new(ProviderReliability::new(
            config.tool_retry_max_attempts,
            config.tool_retry_backoff,
            config.circuit_breaker_failure_threshold,
            Duration::from_secs(config.circuit_breaker_cooldown_seconds),
        ));
        let orchestrator = Arc::new(MultiSearchOrchestrator::new(
            providers,
            source_registry.clone(),
            search_cache.clone(),
            reliability.clone(),
            OrchestratorSettings {
                strategy: config.search_strategy,
                results_per_query: config.deepsearch_results_per_query,
                min_results: config.search_min_results,
                search_timeout: Duration::from_secs(config.search_timeout_seconds),
                rank_weight_relevance: config.rank_weight_relevance,
                rank_weight_freshness: config.rank_weight_freshness,
                rank_weight_provider_prior: config.rank_weight_provider_prior,
                freshness_half_life_days: config.freshness_half_life_days,
            },
        ));
        let hydrator = Arc::new(ContentHydrator::new(
            if config.deepsearch_enable_crawler { crawler } else { None },
            config.hydrator_sparse_threshold,
            config.hydrator_concurrency,
            Duration::from_secs(config.crawler_timeout_seconds),
        ));
        let context = Arc::new(ContextManager::new(
            config.context_max_tokens,
            config.context_truncation_strategy,
            config.context_keep_recent,
        ));
        let checkpointer: Arc<dyn Checkpointer> =
            checkpointer.unwrap_or_else(|| Arc::new(DegradingCheckpointer::new(MemoryCheckpointer::new())));

        Self {
            inner: Arc::new(Inner {
                config,
                llms,
                cancellation: CancellationRegistry::new(),
                checkpointer,
                source_registry,
                search_cache,
                reliability,
                orchestrator,
                hydrator,
                context,
                runs: DashMap::new(),
            }),
        }
    }

    #[must_use]
    pub fn source_registry(&self) -> &Arc<SourceRegistry> {
        &self.inner.source_registry
    }

    #[must_use]
    pub fn search_cache(&self) -> &Arc<SearchCache> {
        &self.inner.search_cache
    }

    fn resolve_model(&self, requested: Option<&str>) -> Result<(String, Arc<dyn ChatModel>), RunError> {
        if let Some(id) = requested {
            return self
                .inner
                .llms
                .get(id)
                .map(|model| (id.to_string(), model))
                .ok_or_else(|| RunError::ModelNotFound { model: id.to_string() });
        }
        self.inner
            .llms
            .default_model()
            .ok_or_else(|| RunError::ModelNotFound { model: "<no model registered>".to_string() })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_workflow(&self, model_name: &str, model: Arc<dyn ChatModel>, deepsearch_mode: Option<DeepSearchMode>) -> WorkflowGraph {
        let config = &self.inner.config;
        let llm_timeout = Duration::from_secs(config.llm_timeout_seconds);
        let planner = Arc::new(QueryPlanner::new(model.clone(), model_name, self.inner.reliability.clone(), llm_timeout));
        let writer = Arc::new(Writer::new(model.clone(), model_name, self.inner.reliability.clone(), llm_timeout));
        let claim_verifier = Arc::new(ClaimVerifier::new(
            model.clone(),
            model_name,
            config.claim_verifier_max_calls_per_report,
            self.inner.reliability.clone(),
            llm_timeout,
        ));
        let evaluator = Arc::new(EvidenceEvaluator::new(
            claim_verifier,
            config.citation_gate_min_coverage,
            config.citation_gate_min_freshness,
            config.freshness_window_days,
            config.max_revisions,
        ));
        let deepsearch = Arc::new(DeepSearchEngine::new(
            planner.clone(),
            self.inner.orchestrator.clone(),
            self.inner.hydrator.clone(),
            writer.clone(),
            evaluator.clone(),
            model.clone(),
            model_name,
            self.inner.context.clone(),
            DeepSearchSettings {
                max_epochs: config.deepsearch_max_epochs,
                query_num: config.deepsearch_query_num,
                results_per_query: config.deepsearch_results_per_query,
                max_seconds: config.deepsearch_max_seconds,
                tree_branch_width: config.deepsearch_tree_branch_width,
                tree_max_depth: config.deepsearch_tree_max_depth,
                mode: deepsearch_mode.unwrap_or(config.deepsearch_mode),
                freshness_window_days: config.freshness_window_days,
                min_coverage: config.citation_gate_min_coverage,
                min_freshness: config.citation_gate_min_freshness,
                max_revisions: config.max_revisions,
                tree_relevance_threshold: config.deepsearch_tree_relevance_threshold,
            },
        ));

        WorkflowGraph::new(
            model.clone(),
            model_name,
            planner,
            self.inner.orchestrator.clone(),
            self.inner.hydrator.clone(),
            writer,
            evaluator,
            deepsearch,
            self.inner.context.clone(),
            WorkflowSettings {
                query_num: config.deepsearch_query_num,
                results_per_query: config.deepsearch_results_per_query,
                freshness_window_days: config.freshness_window_days,
                agent_query_num: config.deepsearch_query_num,
            },
            self.inner.reliability.clone(),
            llm_timeout,
        )
    }

    /// Allocates a run ID and cancel token, initializes `RunState`, and
    /// drives `WorkflowGraph` to completion in a background task. Returns
    /// immediately with the run ID and its event stream; cleanup (marking
    /// the run record terminal, releasing the cancel token) happens exactly
    /// once on every exit path — success, error, cancellation, or panic —
    /// via `catch_unwind` around the driven future (spec.md §4.14).
    #[instrument(skip(self, options), fields(run_id = tracing::field::Empty))]
    pub async fn start_run(
        &self,
        input: impl Into<String>,
        options: StartOptions,
    ) -> Result<(String, broadcast::Receiver<Event>), RunError> {
        let input = input.into();
        let (model_name, model) = self.resolve_model(options.model.as_deref())?;

        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", &run_id.as_str());

        let token = self.inner.cancellation.issue(run_id.clone());
        let budget = Budget::new(self.inner.config.deepsearch_max_tokens, self.inner.config.deepsearch_max_seconds);
        let mut state = RunState::new(run_id.clone(), input.clone(), run_id.clone(), budget);

        let events = Arc::new(EventBus::new(run_id.clone(), 1024).with_checkpointer(self.inner.checkpointer.clone()));
        let receiver = events.subscribe();

        self.inner.runs.insert(
            run_id.clone(),
            RunRecord {
                input: input.clone(),
                mode: options.mode.unwrap_or(Mode::Web),
                started_at: Utc::now(),
                mutable: Mutex::new(RunRecordMutable {
                    status: RunStatus::Running,
                    epoch: 0,
                    final_report: None,
                    quality: None,
                    error: None,
                }),
            },
        );

        let graph = Arc::new(self.build_workflow(&model_name, model, options.deepsearch_mode));
        let mode_override = options.mode;
        let inner = self.inner.clone();
        let run_id_task = run_id.clone();

        tokio::spawn(async move {
            let checkpointer = inner.checkpointer.clone();
            let fut = async {
                graph.run(&mut state, mode_override, &token, &events, checkpointer.as_ref()).await
            };
            let outcome = std::panic::AssertUnwindSafe(fut).catch_unwind().await;

            let (status, error) = match outcome {
                Ok(Ok(())) => (RunStatus::Completed, None),
                Ok(Err(WorkflowError::Cancelled { .. })) => (RunStatus::Cancelled, None),
                Ok(Err(err)) => {
                    warn!(run_id = %run_id_task, error = %err, "run finished with an error");
                    (RunStatus::Failed, Some(err.to_string()))
                }
                Err(panic) => {
                    let reason = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "run task panicked".to_string());
                    error!(run_id = %run_id_task, reason, "run task panicked");
                    (RunStatus::Failed, Some(reason))
                }
            };

            if let Some(record) = inner.runs.get(&run_id_task) {
                let mut mutable = record.mutable.lock();
                mutable.status = status;
                mutable.epoch = state.epoch;
                mutable.final_report = state.final_report.clone();
                mutable.quality = Some(state.quality.clone());
                mutable.error = error;
            }
            inner.cancellation.complete(&run_id_task);
            info!(run_id = %run_id_task, ?status, "run finished");
        });

        Ok((run_id, receiver))
    }

    /// Requests cancellation of `run_id`. A no-op (returning the run's
    /// current status, not an error) if the run has already finished;
    /// `UnknownRunCancel`-worthy in spirit but the controller still answers
    /// with whatever it knows, per spec.md §5 "attempting to cancel a
    /// completed run is a no-op". Unknown run IDs are a hard error.
    pub fn cancel_run(&self, run_id: &str, reason: impl Into<String>) -> Result<RunStatus, RunError> {
        let Some(record) = self.inner.runs.get(run_id) else {
            return Err(RunError::UnknownRunCancel { run_id: run_id.to_string() });
        };
        self.inner.cancellation.cancel(run_id, reason);
        Ok(record.mutable.lock().status)
    }

    /// Resumes a run from its latest checkpoint. Requires the configured
    /// checkpointer to actually have a checkpoint for `run_id` — an
    /// in-memory store that was never written to (e.g. a freshly restarted
    /// process) behaves identically to one with no durable backing.
    pub async fn resume_run(
        &self,
        run_id: &str,
        options: StartOptions,
    ) -> Result<(String, broadcast::Receiver<Event>), RunError> {
        let checkpoint: RunCheckpoint = self.inner.checkpointer.get_latest(run_id).await?;
        let (model_name, model) = self.resolve_model(options.model.as_deref())?;

        let start_node = Node::from_str(&checkpoint.next_node).unwrap_or(Node::Router);
        let mut state = checkpoint.state;
        let token = self.inner.cancellation.issue(run_id.to_string());

        let events = Arc::new(EventBus::new(run_id.to_string(), 1024).with_checkpointer(self.inner.checkpointer.clone()));
        let receiver = events.subscribe();
        events.publish(EventKind::Status, serde_json::json!({"resumed_from": checkpoint.next_node}));

        if let Some(record) = self.inner.runs.get(run_id) {
            let mut mutable = record.mutable.lock();
            mutable.status = RunStatus::Running;
        } else {
            self.inner.runs.insert(
                run_id.to_string(),
                RunRecord {
                    input: state.input.clone(),
                    mode: state.mode,
                    started_at: Utc::now(),
                    mutable: Mutex::new(RunRecordMutable {
                        status: RunStatus::Running,
                        epoch: state.epoch,
                        final_report: None,
                        quality: None,
                        error: None,
                    }),
                },
            );
        }

        let graph = Arc::new(self.build_workflow(&model_name, model, options.deepsearch_mode));
        let mode_override = options.mode;
        let inner = self.inner.clone();
        let run_id_task = run_id.to_string();

        tokio::spawn(async move {
            let checkpointer = inner.checkpointer.clone();
            let fut = async {
                graph.run_from(start_node, &mut state, mode_override, &token, &events, checkpointer.as_ref()).await
            };
            let outcome = std::panic::AssertUnwindSafe(fut).catch_unwind().await;

            let (status, error) = match outcome {
                Ok(Ok(())) => (RunStatus::Completed, None),
                Ok(Err(WorkflowError::Cancelled { .. })) => (RunStatus::Cancelled, None),
                Ok(Err(err)) => (RunStatus::Failed, Some(err.to_string())),
                Err(panic) => {
                    let reason = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "run task panicked".to_string());
                    (RunStatus::Failed, Some(reason))
                }
            };

            if let Some(record) = inner.runs.get(&run_id_task) {
                let mut mutable = record.mutable.lock();
                mutable.status = status;
                mutable.epoch = state.epoch;
                mutable.final_report = state.final_report.clone();
                mutable.quality = Some(state.quality.clone());
                mutable.error = error;
            }
            inner.cancellation.complete(&run_id_task);
        });

        Ok((run_id.to_string(), receiver))
    }

    /// Lists every run the controller has a read-model for, most recent
    /// first.
    #[must_use]
    pub fn list_runs(&self) -> Vec<RunSummary> {
        let mut out: Vec<RunSummary> = self
            .inner
            .runs
            .iter()
            .map(|entry| {
                let mutable = entry.mutable.lock();
                RunSummary {
                    run_id: entry.key().clone(),
                    status: mutable.status,
                    mode: entry.mode,
                    started_at: entry.started_at,
                    input: entry.input.clone(),
                }
            })
            .collect();
        out.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        out
    }

    /// Full detail for a single run.
    pub fn get_run(&self, run_id: &str) -> Result<RunDetail, RunError> {
        let record = self.inner.runs.get(run_id).ok_or_else(|| RunError::RunNotFound { run_id: run_id.to_string() })?;
        let mutable = record.mutable.lock();
        Ok(RunDetail {
            run_id: run_id.to_string(),
            status: mutable.status,
            mode: record.mode,
            started_at: record.started_at,
            input: record.input.clone(),
            epoch: mutable.epoch,
            final_report: mutable.final_report.clone(),
            quality: mutable.quality.clone(),
            error: mutable.error.clone(),
        })
    }
}
