//! `DeepSearchEngine`: the iterative epoch loop — plan, search, hydrate,
//! summarize, gate — plus the writer/evaluator revise loop that follows it
//! (spec.md §4.10). Budget- and cancellation-aware; checkpoints at every
//! epoch boundary so a run can resume without repeating completed work.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cancellation::{Checkpoint, Token};
use crate::checkpoint::{Checkpointer, RunCheckpoint};
use crate::context::ContextManager;
use crate::error::{OrchestratorError, WorkflowError};
use crate::evaluator::EvidenceEvaluator;
use crate::events::{EventBus, EventKind};
use crate::hydrator::ContentHydrator;
use crate::orchestrator::MultiSearchOrchestrator;
use crate::planner::QueryPlanner;
use crate::providers::ChatModel;
use crate::types::{EpochSummary, Message, RunState, Source, Verdict};
use crate::writer::Writer;

/// Deep-search branching strategy (spec.md §4.10 "Mode selector").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeepSearchMode {
    /// Picks `tree` or `linear` per-run based on the topic and the first
    /// epoch's results.
    Auto,
    /// Branches on the top-M results per epoch, to a bounded depth.
    Tree,
    /// The plain plan/search/hydrate/summarize/gate loop, no branching.
    Linear,
}

impl Default for DeepSearchMode {
    fn default() -> Self {
        DeepSearchMode::Auto
    }
}

fn comparative_topic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(compare|vs\.?|versus|top\s*\d+|list of|difference between)\b").expect("valid regex"))
}

/// Tunables the engine needs at construction time; everything else comes
/// from `RunConfig` per call.
#[derive(Debug, Clone, Copy)]
pub struct DeepSearchSettings {
    pub max_epochs: u32,
    pub query_num: usize,
    pub results_per_query: usize,
    pub max_seconds: f64,
    pub tree_branch_width: usize,
    pub tree_max_depth: u32,
    pub mode: DeepSearchMode,
    pub freshness_window_days: f64,
    pub min_coverage: f64,
    pub min_freshness: f64,
    pub max_revisions: u32,
    /// Relevance threshold above which a first-epoch result counts as a
    /// "high-relevance root" for the `auto` mode selector (spec.md §4.10);
    /// varies by deployment, so it is a constructor parameter rather than a
    /// baked-in constant.
    pub tree_relevance_threshold: f64,
}

/// Outcome of a single engine run, merged back into `RunState` by the
/// caller's single write point.
pub struct DeepSearchOutcome {
    pub report: String,
    pub verdict: Verdict,
}

/// The iterative research core (spec.md §4.10). Constructed once per
/// service and shared across runs; all per-run state lives in the
/// `RunState` passed into `run`.
pub struct DeepSearchEngine {
    planner: Arc<QueryPlanner>,
    orchestrator: Arc<MultiSearchOrchestrator>,
    hydrator: Arc<ContentHydrator>,
    writer: Arc<Writer>,
    evaluator: Arc<EvidenceEvaluator>,
    summarizer_model: Arc<dyn ChatModel>,
    summarizer_model_name: String,
    context: Arc<ContextManager>,
    settings: DeepSearchSettings,
}

impl DeepSearchEngine {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        planner: Arc<QueryPlanner>,
        orchestrator: Arc<MultiSearchOrchestrator>,
        hydrator: Arc<ContentHydrator>,
        writer: Arc<Writer>,
        evaluator: Arc<EvidenceEvaluator>,
        summarizer_model: Arc<dyn ChatModel>,
        summarizer_model_name: impl Into<String>,
        context: Arc<ContextManager>,
        settings: DeepSearchSettings,
    ) -> Self {
        Self {
            planner,
            orchestrator,
            hydrator,
            writer,
            evaluator,
            summarizer_model,
            summarizer_model_name: summarizer_model_name.into(),
            context,
            settings,
        }
    }

    /// Runs the epoch loop to completion (or cancellation/budget exhaustion)
    /// against `state`, which this call owns as its single write point.
    /// `profile` selects the provider subset per spec.md §4.5.
    #[instrument(skip_all, fields(run_id = %state.run_id))]
    pub async fn run(
        &self,
        state: &mut RunState,
        profile: &str,
        token: &Token,
        events: &EventBus,
        checkpointer: &dyn Checkpointer,
    ) -> Result<(), WorkflowError> {
        if !self.orchestrator.has_providers() {
            return Err(WorkflowError::Orchestrator(OrchestratorError::NoProviders));
        }
        if self.settings.max_epochs == 0 {
            // Boundary case (spec.md §8): the loop body never runs, so there
            // is no summary to write from; return immediately rather than
            // composing from an empty research base.
            warn!(run_id = %state.run_id, "deepsearch_max_epochs=0, returning with empty summary");
            state.final_report = Some(String::new());
            state.verdict = Some(Verdict::Abort);
            events.publish(EventKind::Quality, serde_json::json!({"verdict": "abort", "reason": "max_epochs_zero"}));
            return Ok(());
        }

        let start = Instant::now();
        let current_year = chrono::Utc::now().format("%Y").to_string().parse::<i32>().unwrap_or(2026);
        let mut selected_urls: BTreeSet<String> = state.sources.keys().cloned().collect();
        let mut queries_issued: Vec<String> = state.artifacts.queries_issued.clone();
        let mut mode_decided: Option<DeepSearchMode> = match self.settings.mode {
            DeepSearchMode::Auto => None,
            fixed => Some(fixed),
        };

        while state.epoch < self.settings.max_epochs {
            if token.is_cancelled() {
                return Err(WorkflowError::Cancelled { checkpoint: Checkpoint::AfterEpoch.as_str().to_string() });
            }
            self.charge_time(state, &start);
            if state.budget.exceeded() {
                return self.finalize_on_budget_exceeded(state, events).await;
            }

            if token.is_cancelled() {
                return Err(WorkflowError::Cancelled { checkpoint: Checkpoint::BeforeLlmCall.as_str().to_string() });
            }
            let queries = self.planner.plan(&state.input, self.settings.query_num, state.epoch, &queries_issued).await?;
            self.charge_tokens(state, &queries.iter().map(|q| q.text.as_str()).collect::<Vec<_>>().join(" "));
            queries_issued.extend(queries.iter().map(|q| q.text.clone()));
            state.artifacts.queries_issued = queries_issued.clone();
            state.plan = queries.clone();
            events.publish(
                EventKind::Plan,
                serde_json::json!({"epoch": state.epoch, "queries": queries.iter().map(|q| &q.text).collect::<Vec<_>>()}),
            );

            if token.is_cancelled() {
                return Err(WorkflowError::Cancelled { checkpoint: Checkpoint::AfterSearch.as_str().to_string() });
            }
            for q in &queries {
                events.publish(EventKind::ToolStart, serde_json::json!({"tool": "search", "query": q.text}));
            }
            let freshness = Some(self.settings.freshness_window_days);
            // Fan the epoch's sub-queries out concurrently instead of
            // awaiting each search in turn.
            let searches = queries.iter().map(|q| {
                let text = q.text.clone();
                let dimension = q.dimension;
                async move {
                    let result = self.orchestrator.search(&text, profile, freshness, token).await;
                    (text, dimension, result)
                }
            });
            let search_results = futures::future::join_all(searches).await;

            let mut new_results = Vec::new();
            for (query_text, dimension, result) in search_results {
                match result {
                    Ok(hits) => {
                        events.publish(EventKind::ToolResult, serde_json::json!({"tool": "search", "count": hits.len()}));
                        new_results.extend(hits.into_iter().map(|mut s| {
                            s.dimension.get_or_insert(dimension);
                            s
                        }));
                    }
                    Err(crate::error::OrchestratorError::Cancelled) => {
                        return Err(WorkflowError::Cancelled { checkpoint: Checkpoint::AfterSearch.as_str().to_string() });
                    }
                    Err(err) => {
                        warn!(error = %err, query = %query_text, "sub-query search failed, continuing with remaining queries");
                        events.publish(EventKind::ToolError, serde_json::json!({"tool": "search", "error": err.to_string()}));
                    }
                }
            }

            new_results.retain(|r| !selected_urls.contains(&r.source_id));
            dedup_by_source_id(&mut new_results);
            new_results.truncate(self.settings.results_per_query.max(1) * queries.len().max(1));
            let mut chosen: Vec<Source> = new_results.into_iter().take(self.settings.results_per_query).collect();

            if mode_decided.is_none() {
                let high_relevance = chosen.iter().filter(|s| s.relevance_score >= self.settings.tree_relevance_threshold).count();
                mode_decided = Some(self.resolve_auto_mode(&state.input, high_relevance));
            }
            if mode_decided == Some(DeepSearchMode::Tree) {
                self.explore_tree_branches(state, &mut chosen, profile, token, events).await;
            }

            for source in &chosen {
                selected_urls.insert(source.source_id.clone());
            }

            if token.is_cancelled() {
                return Err(WorkflowError::Cancelled { checkpoint: Checkpoint::AfterSearch.as_str().to_string() });
            }
            self.hydrator.hydrate(&mut chosen, token).await;
            for source in &chosen {
                state.upsert_source(source.clone());
            }

            if token.is_cancelled() {
                return Err(WorkflowError::Cancelled { checkpoint: Checkpoint::BeforeLlmCall.as_str().to_string() });
            }
            let summary = self.summarize(&state.input, state.epoch, &chosen, &state.summaries).await;
            self.charge_tokens(state, &summary.text);
            let sufficient = summary.sufficient;
            state.summaries.push(summary);

            self.charge_time(state, &start);
            self.checkpoint_epoch(state, checkpointer).await;
            events.publish(EventKind::Status, serde_json::json!({"epoch": state.epoch, "sufficient": sufficient}));

            if token.is_cancelled() {
                return Err(WorkflowError::Cancelled { checkpoint: Checkpoint::AfterEpoch.as_str().to_string() });
            }
            if sufficient {
                break;
            }
            state.epoch += 1;
            if state.budget.exceeded() {
                return self.finalize_on_budget_exceeded(state, events).await;
            }
        }

        self.compose_and_gate(state, current_year, events, checkpointer, &mut queries_issued).await
    }

    /// Composes the report, evaluates it, and loops through `refine_plan` up
    /// to `max_revisions` times, per spec.md §4.10's tail pseudocode.
    async fn compose_and_gate(
        &self,
        state: &mut RunState,
        current_year: i32,
        events: &EventBus,
        checkpointer: &dyn Checkpointer,
        queries_issued: &mut Vec<String>,
    ) -> Result<(), WorkflowError> {
        loop {
            let selected_ids: Vec<String> = state.sources.keys().cloned().collect();
            let composition = self.writer.compose(&state.input, &state.summaries, &state.sources, &selected_ids, &self.context).await?;
            self.charge_tokens(state, &composition.report);
            state.draft_report = Some(composition.report.clone());
            state.citation_index = composition.citation_index.clone();

            let metrics = self
                .evaluator
                .evaluate(&composition.report, &state.input, current_year, &state.plan, &state.sources, &composition.citation_index)
                .await;
            let time_sensitive = crate::evaluator::is_time_sensitive(&state.input, current_year);
            let verdict = self.evaluator.gate(&metrics, time_sensitive, state.revisions);
            state.quality = metrics.clone();
            state.artifacts.quality_summary = Some(metrics);
            events.publish(
                EventKind::Quality,
                serde_json::json!({"verdict": format!("{verdict:?}"), "citation_coverage": state.quality.citation_coverage}),
            );

            match verdict {
                Verdict::Pass | Verdict::Abort => {
                    state.final_report = Some(composition.report);
                    state.verdict = Some(verdict);
                    self.checkpoint_epoch(state, checkpointer).await;
                    return Ok(());
                }
                Verdict::Revise if state.revisions < self.settings.max_revisions => {
                    let refined = self.planner.refine(&state.input, &state.quality.gaps, self.settings.query_num, state.epoch, queries_issued).await?;
                    queries_issued.extend(refined.iter().map(|q| q.text.clone()));
                    state.plan = refined;
                    state.revisions += 1;
                    if state.budget.exceeded() {
                        return self.finalize_on_budget_exceeded(state, events).await;
                    }
                }
                Verdict::Revise => {
                    // max_revisions reached; `gate` already coerces this to
                    // `Pass` internally but guard here too for callers that
                    // construct a verdict directly.
                    state.final_report = Some(composition.report);
                    state.verdict = Some(Verdict::Pass);
                    return Ok(());
                }
            }
        }
    }

    async fn summarize(&self, topic: &str, epoch: u32, chosen: &[Source], prior: &[EpochSummary]) -> EpochSummary {
        let prior_text = prior.iter().map(|s| format!("Epoch {}: {}", s.epoch, s.text)).collect::<Vec<_>>().join("\n");
        let evidence = chosen.iter().map(|s| format!("- {}: {}", s.title, s.excerpt)).collect::<Vec<_>>().join("\n");
        let prompt = format!(
            "Topic: \"{topic}\"\nPrior research so far:\n{prior_text}\n\nNew evidence this epoch:\n{evidence}\n\n\
             Write a concise distilled summary of what this epoch's evidence adds. End with a line exactly \
             \"SUFFICIENT: yes\" if the research so far fully answers the topic, or \"SUFFICIENT: no\" otherwise."
        );
        let messages = vec![Message::user(prompt)];
        let content = match self.summarizer_model.chat(&self.summarizer_model_name, &messages, 0.0).await {
            Ok(r) => r.content,
            Err(err) => {
                warn!(error = %err, "summarizer call failed, recording an empty summary for this epoch");
                String::new()
            }
        };
        let sufficient = content.to_lowercase().contains("sufficient: yes");
        EpochSummary { epoch, text: content, sufficient, source_ids: chosen.iter().map(|s| s.source_id.clone()).collect() }
    }

    fn resolve_auto_mode(&self, topic: &str, first_epoch_high_relevance_count: usize) -> DeepSearchMode {
        if comparative_topic_re().is_match(topic) || first_epoch_high_relevance_count > self.settings.tree_branch_width {
            DeepSearchMode::Tree
        } else {
            DeepSearchMode::Linear
        }
    }

    /// Branches on the top `tree_branch_width` results, issuing one
    /// follow-up query per branch per depth level (spec.md §4.10 `tree`
    /// mode), recording the parent/child relationship into
    /// `artifacts.research_tree`.
    async fn explore_tree_branches(&self, state: &mut RunState, chosen: &mut Vec<Source>, profile: &str, token: &Token, events: &EventBus) {
        let roots: Vec<Source> = chosen.iter().take(self.settings.tree_branch_width).cloned().collect();
        let mut frontier = roots;
        for _depth in 0..self.settings.tree_max_depth {
            if token.is_cancelled() || frontier.is_empty() {
                break;
            }
            for parent in &frontier {
                let branch_query = format!("{} details", parent.title);
                events.publish(EventKind::ToolStart, serde_json::json!({"tool": "search", "query": branch_query, "branch_of": parent.source_id}));
            }
            // Branches at the same depth don't depend on each other; search
            // them concurrently instead of one parent at a time.
            let branch_searches = frontier.iter().map(|parent| {
                let branch_query = format!("{} details", parent.title);
                let parent_id = parent.source_id.clone();
                let parent_dimension = parent.dimension;
                async move {
                    let result = self.orchestrator.search(&branch_query, profile, None, token).await;
                    (parent_id, parent_dimension, result)
                }
            });
            let branch_results = futures::future::join_all(branch_searches).await;

            let mut next_frontier = Vec::new();
            for (parent_id, parent_dimension, result) in branch_results {
                match result {
                    Ok(hits) => {
                        let hits: Vec<Source> = hits
                            .into_iter()
                            .map(|mut h| {
                                h.dimension = h.dimension.or(parent_dimension);
                                h
                            })
                            .collect();
                        let children: Vec<String> = hits.iter().map(|h| h.source_id.clone()).collect();
                        state.artifacts.research_tree.entry(parent_id).or_default().extend(children);
                        for hit in hits {
                            if !chosen.iter().any(|c| c.source_id == hit.source_id) {
                                chosen.push(hit.clone());
                            }
                            next_frontier.push(hit);
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "tree-mode branch search failed, skipping this branch");
                    }
                }
            }
            frontier = next_frontier.into_iter().take(self.settings.tree_branch_width).collect();
        }
    }

    async fn finalize_on_budget_exceeded(&self, state: &mut RunState, events: &EventBus) -> Result<(), WorkflowError> {
        info!(run_id = %state.run_id, "budget exceeded, finalizing with partial report");
        state.quality.budget_exceeded = true;
        if state.draft_report.is_none() {
            let selected_ids: Vec<String> = state.sources.keys().cloned().collect();
            match self.writer.compose(&state.input, &state.summaries, &state.sources, &selected_ids, &self.context).await {
                Ok(composition) => {
                    state.draft_report = Some(composition.report.clone());
                    state.citation_index = composition.citation_index;
                }
                Err(err) => {
                    warn!(error = %err, "writer failed while finalizing a budget-exceeded run");
                }
            }
        }
        state.final_report = state.draft_report.clone().or_else(|| Some(String::new()));
        state.verdict = Some(Verdict::Abort);
        events.publish(EventKind::Quality, serde_json::json!({"verdict": "abort", "budget_exceeded": true}));
        Ok(())
    }

    async fn checkpoint_epoch(&self, state: &RunState, checkpointer: &dyn Checkpointer) {
        let checkpoint = RunCheckpoint {
            run_id: state.run_id.clone(),
            next_node: format!("deepsearch_epoch_{}", state.epoch + 1),
            state: state.clone(),
            seq: u64::from(state.epoch),
            created_at: chrono::Utc::now(),
        };
        if let Err(err) = checkpointer.put(checkpoint).await {
            warn!(run_id = %state.run_id, error = %err, "epoch checkpoint write failed");
        }
    }

    fn charge_time(&self, state: &mut RunState, start: &Instant) {
        let elapsed = start.elapsed().as_secs_f64();
        let delta = elapsed - state.budget.wall_seconds_used;
        if delta > 0.0 {
            state.budget.add_seconds(delta);
        }
    }

    /// Approximates token spend for budgeting purposes using the shared
    /// tokenizer. The sub-components this engine calls (planner, writer,
    /// summarizer) don't surface raw provider usage counters at their call
    /// boundaries, so this is the single place token spend is charged —
    /// keeping `sum(tokens_used_per_call) == budget.tokens_used` true by
    /// construction (spec.md §8).
    fn charge_tokens(&self, state: &mut RunState, text: &str) {
        state.budget.add_tokens(self.context.count_tokens(text) as u64);
    }
}

fn dedup_by_source_id(sources: &mut Vec<Source>) {
    let mut seen = BTreeSet::new();
    sources.retain(|s| seen.insert(s.source_id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim_verifier::ClaimVerifier;
    use crate::config::BackoffKind;
    use crate::context::TruncationStrategy;
    use crate::providers::test_support::{StubChatModel, StubProvider};
    use crate::providers::{ProviderRegistry, RawHit};
    use crate::reliability::ProviderReliability;
    use crate::search_cache::SearchCache;
    use crate::source_registry::SourceRegistry;
    use crate::types::Budget;
    use std::time::Duration;

    fn hit(url: &str) -> RawHit {
        RawHit { url: url.to_string(), title: "t".into(), snippet: "s".into(), published_at: None, relevance: Some(0.9) }
    }

    fn engine(sufficient_after_one_epoch: bool, min_coverage: f64) -> (DeepSearchEngine, crate::cancellation::CancellationRegistry) {
        let reliability = Arc::new(ProviderReliability::new(1, BackoffKind::Constant, 5, Duration::from_secs(30)));
        let mut providers = ProviderRegistry::new();
        providers.register(Arc::new(StubProvider::new("exa", vec![hit("https://example.com/a"), hit("https://example.com/b")])));
        let orchestrator = Arc::new(MultiSearchOrchestrator::new(
            providers,
            Arc::new(SourceRegistry::new()),
            Arc::new(SearchCache::new(64, Duration::from_secs(60))),
            reliability.clone(),
            crate::orchestrator::OrchestratorSettings {
                strategy: crate::orchestrator::SearchStrategy::Parallel,
                results_per_query: 5,
                min_results: 1,
                search_timeout: Duration::from_secs(5),
                rank_weight_relevance: 0.5,
                rank_weight_freshness: 0.3,
                rank_weight_provider_prior: 0.2,
                freshness_half_life_days: 30.0,
            },
        ));
        let plan_model = Arc::new(StubChatModel::new("m", "[temporal] when did it happen\n[causal] why did it happen"));
        let planner = Arc::new(QueryPlanner::new(plan_model, "m", reliability.clone(), Duration::from_secs(5)));
        let hydrator = Arc::new(ContentHydrator::new(None, 200, 5, Duration::from_secs(5)));
        let sufficiency_marker = if sufficient_after_one_epoch { "SUFFICIENT: yes" } else { "SUFFICIENT: no" };
        let summarizer_model = Arc::new(StubChatModel::new("m", format!("distilled summary. {sufficiency_marker}")));
        let write_model = Arc::new(StubChatModel::new("m", "Report body [1] [2]."));
        let writer = Arc::new(Writer::new(write_model, "m", reliability.clone(), Duration::from_secs(5)));
        let verifier_model = Arc::new(StubChatModel::new("m", "supported"));
        let verifier = Arc::new(ClaimVerifier::new(verifier_model, "m", 20, reliability.clone(), Duration::from_secs(5)));
        let evaluator = Arc::new(EvidenceEvaluator::new(verifier, min_coverage, 0.4, 30.0, 2));
        let context = Arc::new(ContextManager::new(50_000, TruncationStrategy::Smart, 10));
        let settings = DeepSearchSettings {
            max_epochs: 3,
            query_num: 2,
            results_per_query: 5,
            max_seconds: 300.0,
            tree_branch_width: 2,
            tree_max_depth: 1,
            mode: DeepSearchMode::Linear,
            freshness_window_days: 30.0,
            min_coverage,
            min_freshness: 0.4,
            max_revisions: 2,
            tree_relevance_threshold: 0.75,
        };
        let cancel = crate::cancellation::CancellationRegistry::new();
        (DeepSearchEngine::new(planner, orchestrator, hydrator, writer, evaluator, summarizer_model, "m", context, settings), cancel)
    }

    #[tokio::test]
    async fn completes_in_one_epoch_when_summary_sufficient() {
        let (engine, cancel) = engine(true, 0.0);
        let token = cancel.issue("run-1");
        let mut state = RunState::new("run-1", "topic", "run-1", Budget::new(1_000_000, 300.0));
        let events = EventBus::new("run-1", 64);
        let checkpointer = crate::checkpoint::MemoryCheckpointer::new();
        engine.run(&mut state, "general", &token, &events, &checkpointer).await.unwrap();
        assert_eq!(state.epoch, 0);
        assert_eq!(state.summaries.len(), 1);
        assert!(state.final_report.is_some());
        assert_eq!(state.verdict, Some(Verdict::Pass));
    }

    #[tokio::test]
    async fn runs_every_epoch_when_never_sufficient() {
        let (engine, cancel) = engine(false, 0.0);
        let token = cancel.issue("run-1");
        let mut state = RunState::new("run-1", "topic", "run-1", Budget::new(1_000_000, 300.0));
        let events = EventBus::new("run-1", 64);
        let checkpointer = crate::checkpoint::MemoryCheckpointer::new();
        engine.run(&mut state, "general", &token, &events, &checkpointer).await.unwrap();
        assert_eq!(state.epoch, 2);
        assert_eq!(state.summaries.len(), 3);
    }

    #[tokio::test]
    async fn no_providers_errors_before_any_llm_call() {
        let reliability = Arc::new(ProviderReliability::new(1, BackoffKind::Constant, 5, Duration::from_secs(1)));
        let orchestrator = Arc::new(MultiSearchOrchestrator::new(
            ProviderRegistry::new(),
            Arc::new(SourceRegistry::new()),
            Arc::new(SearchCache::new(10, Duration::from_secs(60))),
            reliability.clone(),
            crate::orchestrator::OrchestratorSettings {
                strategy: crate::orchestrator::SearchStrategy::Parallel,
                results_per_query: 5,
                min_results: 1,
                search_timeout: Duration::from_secs(5),
                rank_weight_relevance: 0.5,
                rank_weight_freshness: 0.3,
                rank_weight_provider_prior: 0.2,
                freshness_half_life_days: 30.0,
            },
        ));
        let plan_model = Arc::new(StubChatModel::new("m", "should never be called"));
        let planner = Arc::new(QueryPlanner::new(plan_model, "m", reliability.clone(), Duration::from_secs(5)));
        let hydrator = Arc::new(ContentHydrator::new(None, 200, 5, Duration::from_secs(5)));
        let writer = Arc::new(Writer::new(Arc::new(StubChatModel::new("m", "x")), "m", reliability.clone(), Duration::from_secs(5)));
        let verifier = Arc::new(ClaimVerifier::new(Arc::new(StubChatModel::new("m", "supported")), "m", 20, reliability.clone(), Duration::from_secs(5)));
        let evaluator = Arc::new(EvidenceEvaluator::new(verifier, 0.6, 0.4, 30.0, 2));
        let context = Arc::new(ContextManager::new(50_000, TruncationStrategy::Smart, 10));
        let settings = DeepSearchSettings {
            max_epochs: 3,
            query_num: 2,
            results_per_query: 5,
            max_seconds: 300.0,
            tree_branch_width: 2,
            tree_max_depth: 1,
            mode: DeepSearchMode::Linear,
            freshness_window_days: 30.0,
            min_coverage: 0.6,
            min_freshness: 0.4,
            max_revisions: 2,
            tree_relevance_threshold: 0.75,
        };
        let engine = DeepSearchEngine::new(planner, orchestrator, hydrator, writer, evaluator, Arc::new(StubChatModel::new("m", "x")), "m", context, settings);
        let cancel = crate::cancellation::CancellationRegistry::new();
        let token = cancel.issue("run-1");
        let mut state = RunState::new("run-1", "topic", "run-1", Budget::new(1_000_000, 300.0));
        let events = EventBus::new("run-1", 64);
        let checkpointer = crate::checkpoint::MemoryCheckpointer::new();
        let err = engine.run(&mut state, "general", &token, &events, &checkpointer).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Orchestrator(OrchestratorError::NoProviders)));
    }

    #[tokio::test]
    async fn max_epochs_zero_returns_empty_report_and_abort() {
        let (mut engine, cancel) = engine(false, 0.0);
        engine.settings.max_epochs = 0;
        let token = cancel.issue("run-1");
        let mut state = RunState::new("run-1", "topic", "run-1", Budget::new(1_000_000, 300.0));
        let events = EventBus::new("run-1", 64);
        let checkpointer = crate::checkpoint::MemoryCheckpointer::new();
        engine.run(&mut state, "general", &token, &events, &checkpointer).await.unwrap();
        assert_eq!(state.verdict, Some(Verdict::Abort));
        assert_eq!(state.final_report, Some(String::new()));
        assert!(state.summaries.is_empty());
    }

    #[tokio::test]
    async fn budget_exceeded_finalizes_with_partial_report_and_abort() {
        let (engine, cancel) = engine(false, 0.0);
        let token = cancel.issue("run-1");
        // seconds_cap of 0 is exceeded immediately after the first epoch's
        // elapsed time is charged.
        let mut state = RunState::new("run-1", "topic", "run-1", Budget::new(1_000_000, 0.0));
        let events = EventBus::new("run-1", 64);
        let checkpointer = crate::checkpoint::MemoryCheckpointer::new();
        engine.run(&mut state, "general", &token, &events, &checkpointer).await.unwrap();
        assert_eq!(state.verdict, Some(Verdict::Abort));
        assert!(state.quality.budget_exceeded);
        assert!(state.final_report.is_some());
    }

    #[tokio::test]
    async fn cancellation_before_dispatch_stops_the_run() {
        let (engine, cancel) = engine(false, 0.0);
        let token = cancel.issue("run-1");
        cancel.cancel("run-1", "stop");
        let mut state = RunState::new("run-1", "topic", "run-1", Budget::new(1_000_000, 300.0));
        let events = EventBus::new("run-1", 64);
        let checkpointer = crate::checkpoint::MemoryCheckpointer::new();
        let err = engine.run(&mut state, "general", &token, &events, &checkpointer).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn low_coverage_triggers_revise_and_increments_revisions() {
        // min_coverage of 1.1 is unreachable, forcing at least one revise.
        let (engine, cancel) = engine(true, 1.1);
        let token = cancel.issue("run-1");
        let mut state = RunState::new("run-1", "topic", "run-1", Budget::new(1_000_000, 300.0));
        let events = EventBus::new("run-1", 64);
        let checkpointer = crate::checkpoint::MemoryCheckpointer::new();
        engine.run(&mut state, "general", &token, &events, &checkpointer).await.unwrap();
        // max_revisions=2 eventually coerces to Pass.
        assert_eq!(state.revisions, 2);
        assert_eq!(state.verdict, Some(Verdict::Pass));
    }

    #[test]
    fn resolve_auto_mode_picks_tree_for_comparative_topics() {
        let (engine, _cancel) = engine(true, 0.0);
        assert_eq!(engine.resolve_auto_mode("compare Postgres vs MySQL", 0), DeepSearchMode::Tree);
        assert_eq!(engine.resolve_auto_mode("history of tea", 0), DeepSearchMode::Linear);
    }

    #[test]
    fn dedup_by_source_id_keeps_first_occurrence() {
        let mut sources = vec![
            Source {
                source_id: "a".into(),
                url: "https://example.com/a".into(),
                raw_url: "https://example.com/a".into(),
                title: "first".into(),
                excerpt: "e".into(),
                full_text: None,
                provider: "exa".into(),
                providers: vec!["exa".into()],
                published_at: None,
                freshness_days: None,
                relevance_score: 0.5,
                rank_score: 0.5,
                dimension: None,
            },
            Source {
                source_id: "a".into(),
                url: "https://example.com/a".into(),
                raw_url: "https://example.com/a".into(),
                title: "second".into(),
                excerpt: "e".into(),
                full_text: None,
                provider: "tavily".into(),
                providers: vec!["tavily".into()],
                published_at: None,
                freshness_days: None,
                relevance_score: 0.5,
                rank_score: 0.5,
                dimension: None,
            },
        ];
        dedup_by_source_id(&mut sources);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "first");
    }
}
