//! `WorkflowGraph`: the typed node state machine routing a run through
//! direct answer, web research, deep research, agent, or clarify branches
//! (spec.md §4.11).

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::cancellation::{Checkpoint, Token};
use crate::checkpoint::{Checkpointer, RunCheckpoint};
use crate::context::ContextManager;
use crate::deepsearch::DeepSearchEngine;
use crate::error::WorkflowError;
use crate::events::{EventBus, EventKind};
use crate::hydrator::ContentHydrator;
use crate::orchestrator::{detect_profile, MultiSearchOrchestrator};
use crate::planner::QueryPlanner;
use crate::providers::{reliable_chat, ChatModel};
use crate::reliability::ProviderReliability;
use crate::types::{Message, Mode, RunState, Verdict};
use crate::writer::Writer;

/// A node in the workflow state machine (spec.md §4.11's table). `End` is
/// not listed in the table but is the terminal state `human_review` always
/// exits to once a run has nothing further to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Router,
    DirectAnswer,
    WebPlan,
    RefinePlan,
    ParallelSearch,
    Writer,
    Evaluator,
    DeepSearch,
    Agent,
    Clarify,
    HumanReview,
    End,
}

impl Node {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Node::Router => "router",
            Node::DirectAnswer => "direct_answer",
            Node::WebPlan => "web_plan",
            Node::RefinePlan => "refine_plan",
            Node::ParallelSearch => "parallel_search",
            Node::Writer => "writer",
            Node::Evaluator => "evaluator",
            Node::DeepSearch => "deepsearch",
            Node::Agent => "agent",
            Node::Clarify => "clarify",
            Node::HumanReview => "human_review",
            Node::End => "end",
        }
    }

    /// Inverse of [`Node::as_str`], used by `RunController::resume_run` to
    /// restore the next-to-execute node recorded in a checkpoint.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "router" => Node::Router,
            "direct_answer" => Node::DirectAnswer,
            "web_plan" => Node::WebPlan,
            "refine_plan" => Node::RefinePlan,
            "parallel_search" => Node::ParallelSearch,
            "writer" => Node::Writer,
            "evaluator" => Node::Evaluator,
            "deepsearch" => Node::DeepSearch,
            "agent" => Node::Agent,
            "clarify" => Node::Clarify,
            "human_review" => Node::HumanReview,
            "end" => Node::End,
            _ => return None,
        })
    }
}

/// The router's classification result: a mode label with a confidence in
/// `[0, 1]`. Below 0.5 the graph defaults to `web` (spec.md §4.11).
struct Classification {
    mode: Mode,
    confidence: f64,
}

#[derive(Deserialize)]
struct RouterResponse {
    mode: String,
    confidence: f64,
}

/// Tunables the graph needs that aren't part of any single component's own
/// settings struct.
pub struct WorkflowSettings {
    pub query_num: usize,
    pub results_per_query: usize,
    pub freshness_window_days: f64,
    pub agent_query_num: usize,
}

/// Binds every research component into the node state machine described by
/// spec.md §4.11's transition table. One instance per service; `run` drives
/// a single `RunState` to completion, checkpointing at every node boundary
/// (spec.md §4.13) and publishing one event group per transition.
pub struct WorkflowGraph {
    router_model: Arc<dyn ChatModel>,
    router_model_name: String,
    planner: Arc<QueryPlanner>,
    orchestrator: Arc<MultiSearchOrchestrator>,
    hydrator: Arc<ContentHydrator>,
    writer: Arc<Writer>,
    evaluator: Arc<crate::evaluator::EvidenceEvaluator>,
    deepsearch: Arc<DeepSearchEngine>,
    context: Arc<ContextManager>,
    settings: WorkflowSettings,
    reliability: Arc<ProviderReliability>,
    llm_timeout: Duration,
}

impl WorkflowGraph {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        router_model: Arc<dyn ChatModel>,
        router_model_name: impl Into<String>,
        planner: Arc<QueryPlanner>,
        orchestrator: Arc<MultiSearchOrchestrator>,
        hydrator: Arc<ContentHydrator>,
        writer: Arc<Writer>,
        evaluator: Arc<crate::evaluator::EvidenceEvaluator>,
        deepsearch: Arc<DeepSearchEngine>,
        context: Arc<ContextManager>,
        settings: WorkflowSettings,
        reliability: Arc<ProviderReliability>,
        llm_timeout: Duration,
    ) -> Self {
        Self {
            router_model,
            router_model_name: router_model_name.into(),
            planner,
            orchestrator,
            hydrator,
            writer,
            evaluator,
            deepsearch,
            context,
            settings,
            reliability,
            llm_timeout,
        }
    }

    /// Drives `state` from `router` to a terminal node. `mode_override`, if
    /// given, is honored by the router with confidence 1.0 (spec.md §4.11).
    #[instrument(skip_all, fields(run_id = %state.run_id))]
    pub async fn run(
        &self,
        state: &mut RunState,
        mode_override: Option<Mode>,
        token: &Token,
        events: &EventBus,
        checkpointer: &dyn Checkpointer,
    ) -> Result<(), WorkflowError> {
        self.run_from(Node::Router, state, mode_override, token, events, checkpointer).await
    }

    /// Like [`WorkflowGraph::run`] but starts at an arbitrary node rather
    /// than always re-entering at `router`. Used by `RunController::resume_run`
    /// to continue from the next-to-execute node recorded in the latest
    /// checkpoint (spec.md §4.13).
    #[instrument(skip_all, fields(run_id = %state.run_id))]
    pub async fn run_from(
        &self,
        start: Node,
        state: &mut RunState,
        mode_override: Option<Mode>,
        token: &Token,
        events: &EventBus,
        checkpointer: &dyn Checkpointer,
    ) -> Result<(), WorkflowError> {
        let mut node = start;
        loop {
            if token.is_cancelled() {
                events.publish(EventKind::Cancelled, serde_json::json!({"node": node.as_str()}));
                return Err(WorkflowError::Cancelled { checkpoint: Checkpoint::AfterEpoch.as_str().to_string() });
            }

            let next = self.execute(node, state, mode_override, token, events, checkpointer).await?;
            self.checkpoint_node(state, next, checkpointer).await;

            if node == Node::HumanReview && next == Node::End {
                events.publish(EventKind::Done, serde_json::json!({}));
                return Ok(());
            }
            node = next;
        }
    }

    async fn execute(
        &self,
        node: Node,
        state: &mut RunState,
        mode_override: Option<Mode>,
        token: &Token,
        events: &EventBus,
        checkpointer: &dyn Checkpointer,
    ) -> Result<Node, WorkflowError> {
        match node {
            Node::Router => self.run_router(state, mode_override, events).await,
            Node::DirectAnswer => self.run_direct_answer(state, events).await,
            Node::WebPlan => self.run_web_plan(state, token, events).await,
            Node::RefinePlan => self.run_refine_plan(state, token, events).await,
            Node::ParallelSearch => self.run_parallel_search(state, token, events).await,
            Node::Writer => self.run_writer(state, events).await,
            Node::Evaluator => self.run_evaluator(state, events).await,
            Node::DeepSearch => self.run_deepsearch(state, token, events, checkpointer).await,
            Node::Agent => self.run_agent(state, token, events).await,
            Node::Clarify => self.run_clarify(state, events).await,
            Node::HumanReview => Ok(Node::End),
            Node::End => Ok(Node::End),
        }
    }

    async fn run_router(&self, state: &mut RunState, mode_override: Option<Mode>, events: &EventBus) -> Result<Node, WorkflowError> {
        let classification = match mode_override {
            Some(mode) => Classification { mode, confidence: 1.0 },
            None => self.classify(&state.input).await,
        };
        let mode = if classification.confidence < 0.5 { Mode::Web } else { classification.mode };
        state.mode = mode;
        events.publish(EventKind::Status, serde_json::json!({"node": "router", "mode": mode.to_string(), "confidence": classification.confidence}));

        Ok(match mode {
            Mode::Direct => Node::DirectAnswer,
            Mode::Web => Node::WebPlan,
            Mode::Agent => Node::Agent,
            Mode::Deep => Node::DeepSearch,
            Mode::Clarify => Node::Clarify,
        })
    }

    /// Classifies the input via the router model. Any LLM or parse failure
    /// degrades to `web` at confidence 0 rather than failing the run
    /// (spec.md §7 `ClassificationError` "router fallback to web").
    async fn classify(&self, input: &str) -> Classification {
        let prompt = format!(
            "Classify this research request into exactly one mode: direct (a simple factual/arithmetic question \
             answerable without search), web (a single round of web research suffices), agent (requires dynamic \
             tool use), deep (requires multi-epoch iterative research), or clarify (the request is too ambiguous \
             to act on without a follow-up question). Respond with JSON: {{\"mode\": \"...\", \"confidence\": 0.0-1.0}}.\n\n\
             Request: \"{input}\""
        );
        let messages = vec![Message::user(prompt)];
        let response = match reliable_chat(&self.reliability, self.llm_timeout, &self.router_model, &self.router_model_name, &messages, 0.0).await {
            Ok(r) => r,
            Err(err) => {
                warn!(error = %err, "router classification call failed, defaulting to web");
                return Classification { mode: Mode::Web, confidence: 0.0 };
            }
        };
        parse_classification(&response.content)
    }

    async fn run_direct_answer(&self, state: &mut RunState, events: &EventBus) -> Result<Node, WorkflowError> {
        let messages = vec![
            Message::system("Answer directly and concisely. No research is needed for this request."),
            Message::user(state.input.clone()),
        ];
        let fit = self.context.fit(&messages)?;
        let report = match self.router_model.chat(&self.router_model_name, &fit.messages, 0.0).await {
            Ok(r) => r.content,
            Err(err) => {
                warn!(error = %err, "direct-answer LLM call failed");
                return Err(WorkflowError::FatalInternal(format!("direct answer call failed: {err}")));
            }
        };
        state.draft_report = Some(report.clone());
        state.final_report = Some(report);
        state.verdict = Some(Verdict::Pass);
        events.publish(EventKind::Completion, serde_json::json!({"node": "direct_answer"}));
        Ok(Node::HumanReview)
    }

    async fn run_web_plan(&self, state: &mut RunState, _token: &Token, events: &EventBus) -> Result<Node, WorkflowError> {
        let queries = self.planner.plan(&state.input, self.settings.query_num, state.epoch, &state.artifacts.queries_issued).await?;
        state.artifacts.queries_issued.extend(queries.iter().map(|q| q.text.clone()));
        state.plan = queries;
        events.publish(EventKind::Plan, serde_json::json!({"node": "web_plan", "count": state.plan.len()}));
        Ok(Node::ParallelSearch)
    }

    async fn run_refine_plan(&self, state: &mut RunState, _token: &Token, events: &EventBus) -> Result<Node, WorkflowError> {
        let gaps = state.quality.gaps.clone();
        let refined = self
            .planner
            .refine(&state.input, &gaps, self.settings.query_num, state.epoch, &state.artifacts.queries_issued)
            .await?;
        state.artifacts.queries_issued.extend(refined.iter().map(|q| q.text.clone()));
        state.plan = refined;
        state.revisions += 1;
        events.publish(EventKind::Plan, serde_json::json!({"node": "refine_plan", "revisions": state.revisions}));
        Ok(Node::ParallelSearch)
    }

    async fn run_parallel_search(&self, state: &mut RunState, token: &Token, events: &EventBus) -> Result<Node, WorkflowError> {
        if !self.orchestrator.has_providers() {
            return Err(crate::error::OrchestratorError::NoProviders.into());
        }
        let profile = detect_profile(&state.input);
        let freshness = Some(self.settings.freshness_window_days);
        for q in &state.plan {
            events.publish(EventKind::ToolStart, serde_json::json!({"tool": "search", "query": q.text}));
        }
        // Dispatch every sub-query's search concurrently (spec.md §4.11
        // "parallel_search") rather than one at a time; `join_all` polls all
        // of them together instead of awaiting each in turn.
        let searches = state.plan.iter().map(|q| {
            let text = q.text.clone();
            let dimension = q.dimension;
            async move {
                let result = self.orchestrator.search(&text, profile, freshness, token).await;
                (text, dimension, result)
            }
        });
        let results = futures::future::join_all(searches).await;

        let mut collected = Vec::new();
        for (query_text, dimension, result) in results {
            match result {
                Ok(hits) => {
                    events.publish(EventKind::ToolResult, serde_json::json!({"tool": "search", "count": hits.len()}));
                    collected.extend(hits.into_iter().map(|mut s| {
                        s.dimension.get_or_insert(dimension);
                        s
                    }));
                }
                Err(crate::error::OrchestratorError::Cancelled) => {
                    return Err(WorkflowError::Cancelled { checkpoint: Checkpoint::AfterSearch.as_str().to_string() });
                }
                Err(err) => {
                    warn!(error = %err, query = %query_text, "web-mode sub-query search failed, continuing");
                    events.publish(EventKind::ToolError, serde_json::json!({"tool": "search", "error": err.to_string()}));
                }
            }
        }
        collected.truncate(self.settings.results_per_query * state.plan.len().max(1));
        self.hydrator.hydrate(&mut collected, token).await;
        for source in collected {
            state.upsert_source(source);
        }
        Ok(Node::Writer)
    }

    async fn run_writer(&self, state: &mut RunState, events: &EventBus) -> Result<Node, WorkflowError> {
        let selected_ids: Vec<String> = state.sources.keys().cloned().collect();
        let composition = self.writer.compose(&state.input, &state.summaries, &state.sources, &selected_ids, &self.context).await?;
        state.draft_report = Some(composition.report);
        state.citation_index = composition.citation_index;
        events.publish(EventKind::Artifact, serde_json::json!({"node": "writer"}));
        Ok(Node::Evaluator)
    }

    async fn run_evaluator(&self, state: &mut RunState, events: &EventBus) -> Result<Node, WorkflowError> {
        let current_year = chrono::Utc::now().format("%Y").to_string().parse::<i32>().unwrap_or(2026);
        let draft = state.draft_report.clone().unwrap_or_default();
        let metrics = self
            .evaluator
            .evaluate(&draft, &state.input, current_year, &state.plan, &state.sources, &state.citation_index)
            .await;
        let time_sensitive = crate::evaluator::is_time_sensitive(&state.input, current_year);
        let verdict = self.evaluator.gate(&metrics, time_sensitive, state.revisions);
        state.quality = metrics.clone();
        state.artifacts.quality_summary = Some(metrics);
        events.publish(EventKind::Quality, serde_json::json!({"verdict": format!("{verdict:?}")}));

        match verdict {
            Verdict::Pass | Verdict::Abort => {
                state.final_report = state.draft_report.clone();
                state.verdict = Some(verdict);
                Ok(Node::HumanReview)
            }
            Verdict::Revise => Ok(Node::RefinePlan),
        }
    }

    async fn run_deepsearch(
        &self,
        state: &mut RunState,
        token: &Token,
        events: &EventBus,
        checkpointer: &dyn Checkpointer,
    ) -> Result<Node, WorkflowError> {
        let profile = detect_profile(&state.input);
        self.deepsearch.run(state, profile, token, events, checkpointer).await?;
        Ok(Node::HumanReview)
    }

    /// Out-of-core branch (spec.md §9 Open Questions: "treat `agent` as an
    /// out-of-core branch that may reuse the search orchestrator; do not
    /// guess its exact semantics beyond that"). Implemented as a single
    /// plan/search/write pass with no revise loop, distinct from `web`
    /// mode's full evaluator gate.
    async fn run_agent(&self, state: &mut RunState, token: &Token, events: &EventBus) -> Result<Node, WorkflowError> {
        if !self.orchestrator.has_providers() {
            return Err(crate::error::OrchestratorError::NoProviders.into());
        }
        let queries = self.planner.plan(&state.input, self.settings.agent_query_num, state.epoch, &[]).await?;
        state.plan = queries.clone();
        let profile = detect_profile(&state.input);
        let mut collected = Vec::new();
        for q in &queries {
            match self.orchestrator.search(&q.text, profile, None, token).await {
                Ok(hits) => collected.extend(hits),
                Err(err) => warn!(error = %err, "agent-mode search failed, continuing"),
            }
        }
        self.hydrator.hydrate(&mut collected, token).await;
        for source in collected {
            state.upsert_source(source);
        }
        let selected_ids: Vec<String> = state.sources.keys().cloned().collect();
        let composition = self.writer.compose(&state.input, &state.summaries, &state.sources, &selected_ids, &self.context).await?;
        state.draft_report = Some(composition.report.clone());
        state.final_report = Some(composition.report);
        state.citation_index = composition.citation_index;
        state.verdict = Some(Verdict::Pass);
        events.publish(EventKind::Completion, serde_json::json!({"node": "agent"}));
        Ok(Node::HumanReview)
    }

    /// Asks a clarifying question rather than producing a report. Terminal
    /// at `human_review`: resuming with the user's answer is a fresh
    /// `start_run` call with `mode_override` set, not modeled as an
    /// in-graph transition back to `planner` (spec.md §9 Open Questions
    /// decision, recorded in the design ledger).
    async fn run_clarify(&self, state: &mut RunState, events: &EventBus) -> Result<Node, WorkflowError> {
        let prompt = format!(
            "The following research request is ambiguous or underspecified: \"{}\". \
             Write one concise clarifying question to ask the user before research can proceed.",
            state.input
        );
        let messages = vec![Message::user(prompt)];
        let question = match self.router_model.chat(&self.router_model_name, &messages, 0.0).await {
            Ok(r) => r.content,
            Err(err) => {
                warn!(error = %err, "clarify LLM call failed, falling back to a generic prompt");
                "Could you clarify what you'd like researched?".to_string()
            }
        };
        state.final_report = Some(question);
        state.verdict = Some(Verdict::Pass);
        events.publish(EventKind::Interrupt, serde_json::json!({"node": "clarify"}));
        Ok(Node::HumanReview)
    }

    async fn checkpoint_node(&self, state: &RunState, next: Node, checkpointer: &dyn Checkpointer) {
        let checkpoint = RunCheckpoint {
            run_id: state.run_id.clone(),
            next_node: next.as_str().to_string(),
            state: state.clone(),
            seq: u64::from(state.epoch),
            created_at: chrono::Utc::now(),
        };
        if let Err(err) = checkpointer.put(checkpoint).await {
            warn!(run_id = %state.run_id, error = %err, "node checkpoint write failed");
        }
    }
}

fn parse_classification(text: &str) -> Classification {
    if let Some(json_start) = text.find('{') {
        if let Ok(parsed) = serde_json::from_str::<RouterResponse>(&text[json_start..]) {
            if let Some(mode) = parse_mode(&parsed.mode) {
                return Classification { mode, confidence: parsed.confidence.clamp(0.0, 1.0) };
            }
        }
    }
    // Unparseable or unrecognized: a keyword scan is more forgiving than a
    // strict JSON parse for models that ignore formatting instructions.
    let lower = text.to_lowercase();
    for (keyword, mode) in [("deep", Mode::Deep), ("clarify", Mode::Clarify), ("agent", Mode::Agent), ("direct", Mode::Direct), ("web", Mode::Web)] {
        if lower.contains(keyword) {
            return Classification { mode, confidence: 0.6 };
        }
    }
    Classification { mode: Mode::Web, confidence: 0.0 }
}

fn parse_mode(s: &str) -> Option<Mode> {
    match s.to_lowercase().as_str() {
        "direct" => Some(Mode::Direct),
        "web" => Some(Mode::Web),
        "agent" => Some(Mode::Agent),
        "deep" => Some(Mode::Deep),
        "clarify" => Some(Mode::Clarify),
        _ => None,
    }
}
