//! Shared data model: `RunState`, `Source`, `SubQuery`, `QualityMetrics`, and
//! the small supporting types threaded through every node of the workflow
//! graph.

use std::collections::BTreeMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Chat role for messages exchanged with the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn in the LLM dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Routing decision produced by the router node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Direct,
    Web,
    Agent,
    Deep,
    Clarify,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mode::Direct => "direct",
            Mode::Web => "web",
            Mode::Agent => "agent",
            Mode::Deep => "deep",
            Mode::Clarify => "clarify",
        };
        f.write_str(s)
    }
}

/// Evaluator outcome for a draft report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Revise,
    Abort,
}

/// Status of a single planned sub-query as it moves through the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubQueryStatus {
    Pending,
    InFlight,
    Done,
    Failed,
}

/// A research dimension a sub-query targets. See `spec.md` §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Temporal,
    Comparative,
    Causal,
    Definitional,
    Quantitative,
}

pub const ALL_DIMENSIONS: [Dimension; 5] = [
    Dimension::Temporal,
    Dimension::Comparative,
    Dimension::Causal,
    Dimension::Definitional,
    Dimension::Quantitative,
];

/// A single planned research query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubQuery {
    pub text: String,
    pub dimension: Dimension,
    pub issued_epoch: u32,
    pub status: SubQueryStatus,
}

/// A deduplicated piece of evidence gathered by the orchestrator or hydrator.
///
/// Immutable once inserted into `RunState::sources` — later writers may
/// replace it wholesale via `SourceRegistry` merge logic, but no in-place
/// mutation happens after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub source_id: String,
    pub url: String,
    pub raw_url: String,
    pub title: String,
    pub excerpt: String,
    pub full_text: Option<String>,
    pub provider: String,
    /// Union of every provider tag that surfaced this source across merges.
    pub providers: Vec<String>,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub freshness_days: Option<f64>,
    pub relevance_score: f64,
    pub rank_score: f64,
    /// The plan dimension of the sub-query this source was retrieved for, if
    /// known at the point it was collected (spec.md §4.8); `None` for
    /// sources whose origin query isn't tracked (e.g. tree-mode branches
    /// with no inherited dimension). Used by the evaluator's per-dimension
    /// `query_coverage`.
    pub dimension: Option<Dimension>,
}

/// Per-epoch distilled research summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochSummary {
    pub epoch: u32,
    pub text: String,
    pub sufficient: bool,
    pub source_ids: Vec<String>,
}

/// Coverage, citation, freshness, and consistency scoring for a draft report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub query_coverage: f64,
    pub citation_coverage: f64,
    pub freshness_ratio: f64,
    pub consistency: f64,
    pub unsupported_claims: u32,
    /// Set when `verdict == Abort` due to budget exhaustion; surfaced to the
    /// caller via the `quality` event per spec.md §8 scenario 5.
    pub budget_exceeded: bool,
    /// Dimensions the evaluator judged under-covered, consumed by
    /// `QueryPlanner::refine`.
    pub gaps: Vec<Dimension>,
}

/// Aggregated token/time spend and caps for a single run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Budget {
    pub tokens_used: u64,
    pub wall_seconds_used: f64,
    pub tokens_cap: u64,
    pub seconds_cap: f64,
}

impl Budget {
    pub fn new(tokens_cap: u64, seconds_cap: f64) -> Self {
        Self { tokens_used: 0, wall_seconds_used: 0.0, tokens_cap, seconds_cap }
    }

    pub fn exceeded(&self) -> bool {
        self.tokens_used > self.tokens_cap || self.wall_seconds_used > self.seconds_cap
    }

    pub fn add_tokens(&mut self, n: u64) {
        self.tokens_used = self.tokens_used.saturating_add(n);
    }

    pub fn add_seconds(&mut self, s: f64) {
        self.wall_seconds_used += s;
    }
}

/// Structured, persisted by-products of a run, intended for inspection and
/// resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artifacts {
    /// Flattened research tree: maps a parent source id (or the synthetic
    /// root `"__root__"`) to the child source ids discovered while exploring
    /// it. Populated by `tree` deep-search mode; empty under `linear`.
    pub research_tree: BTreeMap<String, Vec<String>>,
    pub queries_issued: Vec<String>,
    pub quality_summary: Option<QualityMetrics>,
}

/// The workflow state threaded through every node. Owned by a single run;
/// node bodies receive it by value and return the next state — see
/// `crate::workflow` for the single-writer merge discipline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub input: String,
    pub mode: Mode,
    pub messages: Vec<Message>,
    pub plan: Vec<SubQuery>,
    /// Keyed by `source_id`; insertion goes exclusively through
    /// `SourceRegistry` so the no-duplicate-id invariant always holds.
    pub sources: BTreeMap<String, Source>,
    pub summaries: Vec<EpochSummary>,
    pub draft_report: Option<String>,
    pub final_report: Option<String>,
    /// Maps a citation number offered to the writer (`[N]`) to the
    /// `source_id` it refers to. Set by the writer node, read by the
    /// evaluator; see `crate::writer::Composition`.
    pub citation_index: BTreeMap<u32, String>,
    pub quality: QualityMetrics,
    pub verdict: Option<Verdict>,
    pub epoch: u32,
    pub revisions: u32,
    pub budget: Budget,
    pub cancel_token_id: String,
    pub artifacts: Artifacts,
}

impl RunState {
    pub fn new(run_id: impl Into<String>, input: impl Into<String>, cancel_token_id: impl Into<String>, budget: Budget) -> Self {
        Self {
            run_id: run_id.into(),
            input: input.into(),
            mode: Mode::Web,
            messages: Vec::new(),
            plan: Vec::new(),
            sources: BTreeMap::new(),
            summaries: Vec::new(),
            draft_report: None,
            final_report: None,
            citation_index: BTreeMap::new(),
            quality: QualityMetrics::default(),
            verdict: None,
            epoch: 0,
            revisions: 0,
            budget,
            cancel_token_id: cancel_token_id.into(),
            artifacts: Artifacts::default(),
        }
    }

    /// Inserts (or replaces, on a dedup merge) a source and returns whether
    /// it was newly inserted. Call sites go through `SourceRegistry` for
    /// canonicalization before reaching this; this is the single write
    /// point into `sources` to uphold the no-duplicate-`source_id` invariant.
    pub fn upsert_source(&mut self, source: Source) -> bool {
        let is_new = !self.sources.contains_key(&source.source_id);
        self.sources.insert(source.source_id.clone(), source);
        is_new
    }

    /// Every `source_id` referenced by an inline `[N]`-style citation in the
    /// final (or draft) report, in citation order — used to check the
    /// no-dangling-citations testable property.
    pub fn cited_source_ids(&self, citation_index: &BTreeMap<u32, String>) -> Vec<String> {
        let text = self.final_report.as_deref().or(self.draft_report.as_deref()).unwrap_or("");
        crate::evaluator::extract_citation_numbers(text)
            .into_iter()
            .filter_map(|n| citation_index.get(&n).cloned())
            .collect()
    }
}

/// Time captured at run start, used only for display/telemetry — budgeting
/// uses `Instant`/elapsed seconds, not wall-clock timestamps.
pub fn now_iso8601() -> String {
    let now: chrono::DateTime<chrono::Utc> = SystemTime::now().into();
    now.to_rfc3339()
}
