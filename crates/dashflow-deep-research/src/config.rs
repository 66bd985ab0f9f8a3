//! `RunConfig`: every option recognized per spec.md §6, read once at run
//! start. Mid-run changes never affect an in-flight run — `RunController`
//! clones the config into the run and nothing downstream reaches back out
//! to a live config source.

use serde::{Deserialize, Serialize};

use crate::context::TruncationStrategy;
use crate::deepsearch::DeepSearchMode;
use crate::orchestrator::SearchStrategy;

/// Backoff shape used by `ProviderReliability` retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    Exponential,
    Linear,
    Constant,
}

impl Default for BackoffKind {
    fn default() -> Self {
        BackoffKind::Exponential
    }
}

/// Top-level configuration, read at run start and passed whole to
/// `RunController`. The out-of-scope config-file loader is responsible for
/// producing one of these; this crate does no file I/O for config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    // --- Deep search loop ---
    pub deepsearch_max_epochs: u32,
    pub deepsearch_query_num: usize,
    pub deepsearch_results_per_query: usize,
    pub deepsearch_max_seconds: f64,
    pub deepsearch_max_tokens: u64,
    pub deepsearch_enable_crawler: bool,
    pub deepsearch_mode: DeepSearchMode,
    /// `tree` mode branch fan-out: top-M results explored per epoch.
    pub deepsearch_tree_branch_width: usize,
    /// `tree` mode bound on exploration depth.
    pub deepsearch_tree_max_depth: u32,
    /// Relevance score above which `auto` mode treats a first-epoch result
    /// as a "high-relevance root" worth branching from.
    pub deepsearch_tree_relevance_threshold: f64,

    // --- Citation gate / evaluator ---
    pub citation_gate_min_coverage: f64,
    pub citation_gate_min_freshness: f64,
    pub max_revisions: u32,
    /// Half-life (days) used by the freshness-decay ranking formula; the
    /// source varied on this default, so it is exposed rather than inferred
    /// (spec.md §9 Open Questions).
    pub freshness_half_life_days: f64,
    /// Window (days) within which a cited source counts as "fresh" for the
    /// `freshness_ratio` metric.
    pub freshness_window_days: f64,
    pub claim_verifier_max_calls_per_report: u32,

    // --- Search orchestration ---
    pub search_providers: Vec<String>,
    pub search_strategy: SearchStrategy,
    pub search_cache_ttl_seconds: u64,
    pub search_cache_max_size: usize,
    /// Minimum results before `fallback` strategy stops trying providers.
    pub search_min_results: usize,
    pub rank_weight_relevance: f64,
    pub rank_weight_freshness: f64,
    pub rank_weight_provider_prior: f64,

    // --- Content hydration ---
    pub hydrator_sparse_threshold: usize,
    pub hydrator_concurrency: usize,

    // --- Context management ---
    pub context_max_tokens: usize,
    pub context_truncation_strategy: TruncationStrategy,
    pub context_keep_recent: usize,

    // --- Reliability ---
    pub tool_retry_max_attempts: u32,
    pub tool_retry_backoff: BackoffKind,
    pub circuit_breaker_failure_threshold: u32,
    pub circuit_breaker_cooldown_seconds: u64,

    // --- Timeouts (spec.md §5) ---
    pub search_timeout_seconds: u64,
    pub llm_timeout_seconds: u64,
    pub crawler_timeout_seconds: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            deepsearch_max_epochs: 3,
            deepsearch_query_num: 5,
            deepsearch_results_per_query: 5,
            deepsearch_max_seconds: 300.0,
            deepsearch_max_tokens: 100_000,
            deepsearch_enable_crawler: true,
            deepsearch_mode: DeepSearchMode::Auto,
            deepsearch_tree_branch_width: 3,
            deepsearch_tree_max_depth: 2,
            deepsearch_tree_relevance_threshold: 0.75,

            citation_gate_min_coverage: 0.6,
            citation_gate_min_freshness: 0.4,
            max_revisions: 2,
            freshness_half_life_days: 30.0,
            freshness_window_days: 30.0,
            claim_verifier_max_calls_per_report: 20,

            search_providers: Vec::new(),
            search_strategy: SearchStrategy::Fallback,
            search_cache_ttl_seconds: 900,
            search_cache_max_size: 1024,
            search_min_results: 3,
            rank_weight_relevance: 0.5,
            rank_weight_freshness: 0.3,
            rank_weight_provider_prior: 0.2,

            hydrator_sparse_threshold: 200,
            hydrator_concurrency: 5,

            context_max_tokens: 128_000,
            context_truncation_strategy: TruncationStrategy::Smart,
            context_keep_recent: 10,

            tool_retry_max_attempts: 3,
            tool_retry_backoff: BackoffKind::Exponential,
            circuit_breaker_failure_threshold: 5,
            circuit_breaker_cooldown_seconds: 30,

            search_timeout_seconds: 10,
            llm_timeout_seconds: 120,
            crawler_timeout_seconds: 20,
        }
    }
}
