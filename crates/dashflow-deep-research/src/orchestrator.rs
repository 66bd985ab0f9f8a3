//! `MultiSearchOrchestrator`: fans a query out across registered search
//! providers, merges/dedupes via `SourceRegistry`, and ranks the result
//! (spec.md §4.5).

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cancellation::Token;
use crate::error::OrchestratorError;
use crate::providers::{ProviderRegistry, RawHit};
use crate::reliability::ProviderReliability;
use crate::search_cache::{freshness_bucket, CacheKey, SearchCache};
use crate::source_registry::SourceRegistry;
use crate::types::Source;

/// How `MultiSearchOrchestrator` fans a query across a profile's provider
/// subset (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Call every enabled provider in the profile concurrently and merge
    /// every hit that comes back.
    Parallel,
    /// Call providers in order, stopping once `search_min_results` distinct
    /// sources have been collected.
    Fallback,
}

/// Tunables the orchestrator needs at construction time; everything else
/// comes from `RunConfig` per call.
pub struct OrchestratorSettings {
    pub strategy: SearchStrategy,
    pub results_per_query: usize,
    pub min_results: usize,
    pub search_timeout: Duration,
    pub rank_weight_relevance: f64,
    pub rank_weight_freshness: f64,
    pub rank_weight_provider_prior: f64,
    pub freshness_half_life_days: f64,
}

/// Fans a query out across registered providers, merges hits through
/// `SourceRegistry`, and returns a deterministically ranked `Vec<Source>`.
pub struct MultiSearchOrchestrator {
    providers: ProviderRegistry,
    registry: Arc<SourceRegistry>,
    cache: Arc<SearchCache>,
    reliability: Arc<ProviderReliability>,
    settings: OrchestratorSettings,
}

impl MultiSearchOrchestrator {
    #[must_use]
    pub fn new(
        providers: ProviderRegistry,
        registry: Arc<SourceRegistry>,
        cache: Arc<SearchCache>,
        reliability: Arc<ProviderReliability>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self { providers, registry, cache, reliability, settings }
    }

    /// Runs `query` against the provider subset resolved for `profile`,
    /// merging and ranking the result. Checks `token` before dispatch, after
    /// each provider call, and before returning (spec.md §4.1).
    #[instrument(skip(self, token), fields(query, profile))]
    pub async fn search(
        &self,
        query: &str,
        profile: &str,
        freshness_window_days: Option<f64>,
        token: &Token,
    ) -> Result<Vec<Source>, OrchestratorError> {
        if token.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }
        if self.providers.is_empty() {
            return Err(OrchestratorError::NoProviders);
        }

        let mut subset = self.providers.providers_for_profile(profile);
        if subset.is_empty() {
            return Err(OrchestratorError::NoProviders);
        }
        // Profile is advisory: if every provider in the resolved subset is
        // circuit-open, degrade to the full enabled set rather than fail
        // the search outright (spec.md §4.5).
        if subset.iter().all(|p| self.reliability.circuit_state(p) == crate::reliability::CircuitState::Open) {
            warn!(profile, "every provider in profile is circuit-open, degrading to default subset");
            subset = self.providers.enabled();
        }

        let bucket = freshness_bucket(freshness_window_days);
        let mut merged: Vec<Source> = Vec::new();
        let mut any_succeeded = false;

        match self.settings.strategy {
            SearchStrategy::Parallel => {
                let mut futs = Vec::new();
                for provider_id in &subset {
                    let cache_key = CacheKey::new(provider_id.clone(), query, profile, bucket.clone());
                    if let Some(cached) = self.cache.get(&cache_key) {
                        merged.extend(cached);
                        any_succeeded = true;
                        continue;
                    }
                    futs.push(self.fetch_one(provider_id.clone(), query.to_string(), cache_key));
                }
                if token.is_cancelled() {
                    return Err(OrchestratorError::Cancelled);
                }
                // `join_all` polls every future to completion concurrently
                // rather than one at a time, giving the "dispatch to all
                // selected providers concurrently" fan-out spec.md §4.5
                // requires.
                for result in futures::future::join_all(futs).await {
                    match result {
                        Ok(hits) => {
                            any_succeeded = true;
                            merged.extend(hits);
                        }
                        Err(err) => warn!(error = %err, "provider call failed during parallel fan-out"),
                    }
                }
            }
            SearchStrategy::Fallback => {
                for provider_id in &subset {
                    if token.is_cancelled() {
                        return Err(OrchestratorError::Cancelled);
                    }
                    let distinct = count_distinct(&merged);
                    if distinct >= self.settings.min_results {
                        break;
                    }
                    let cache_key = CacheKey::new(provider_id.clone(), query, profile, bucket.clone());
                    if let Some(cached) = self.cache.get(&cache_key) {
                        merged.extend(cached);
                        any_succeeded = true;
                        continue;
                    }
                    match self.fetch_one(provider_id.clone(), query.to_string(), cache_key).await {
                        Ok(hits) => {
                            any_succeeded = true;
                            merged.extend(hits);
                        }
                        Err(err) => warn!(error = %err, provider = %provider_id, "provider call failed during fallback"),
                    }
                }
            }
        }

        if token.is_cancelled() {
            return Err(OrchestratorError::Cancelled);
        }

        if !any_succeeded {
            return Err(OrchestratorError::AllProvidersUnavailable { profile: profile.to_string() });
        }

        let deduped = self.dedup(merged);
        let ranked = self.rank(deduped);
        info!(count = ranked.len(), "search completed");
        Ok(ranked)
    }

    async fn fetch_one(
        &self,
        provider_id: String,
        query: String,
        cache_key: CacheKey,
    ) -> Result<Vec<Source>, OrchestratorError> {
        let Some(provider) = self.providers.get(&provider_id) else {
            return Err(OrchestratorError::AllProvidersUnavailable { profile: provider_id });
        };
        let results_per_query = self.settings.results_per_query;
        let hits = self
            .reliability
            .call(&provider_id, self.settings.search_timeout, || {
                let provider = provider.clone();
                let query = query.clone();
                async move { provider.search(&query, results_per_query, &[]).await }
            })
            .await
            .map_err(OrchestratorError::from)?;

        let sources: Vec<Source> = hits.into_iter().map(|hit| self.hit_to_source(hit, &provider_id)).collect();
        self.cache.put(cache_key, sources.clone());
        Ok(sources)
    }

    fn hit_to_source(&self, hit: RawHit, provider_id: &str) -> Source {
        let registered = self.registry.register(&hit.url);
        let freshness_days = hit.published_at.map(|t| (chrono::Utc::now() - t).num_seconds() as f64 / 86_400.0);
        let relevance = hit.relevance.unwrap_or(0.5);
        Source {
            source_id: registered.source_id,
            url: registered.canonical_url,
            raw_url: hit.url,
            title: hit.title,
            excerpt: hit.snippet,
            full_text: None,
            provider: provider_id.to_string(),
            providers: vec![provider_id.to_string()],
            published_at: hit.published_at,
            freshness_days,
            relevance_score: relevance,
            rank_score: 0.0,
            dimension: None,
        }
    }

    /// Merges same-`source_id` hits from different providers into one
    /// `Source`, unioning `providers` and keeping the highest relevance seen.
    fn dedup(&self, sources: Vec<Source>) -> Vec<Source> {
        use std::collections::BTreeMap;
        let mut by_id: BTreeMap<String, Source> = BTreeMap::new();
        for source in sources {
            by_id
                .entry(source.source_id.clone())
                .and_modify(|existing| {
                    for p in &source.providers {
                        if !existing.providers.contains(p) {
                            existing.providers.push(p.clone());
                        }
                    }
                    if source.relevance_score > existing.relevance_score {
                        existing.relevance_score = source.relevance_score;
                    }
                })
                .or_insert(source);
        }
        by_id.into_values().collect()
    }

    /// Computes `rank_score` and returns sources sorted descending by score,
    /// tie-broken by relevance then lexical `source_id` (spec.md §4.5).
    fn rank(&self, mut sources: Vec<Source>) -> Vec<Source> {
        let half_life = self.settings.freshness_half_life_days.max(0.01);
        for source in &mut sources {
            let freshness = match source.freshness_days {
                Some(days) => (-days.max(0.0) / half_life).exp(),
                None => 0.0,
            };
            // Corroboration across multiple providers counts as a stronger prior.
            let provider_prior = if source.providers.len() > 1 { 1.0 } else { 0.5 };
            source.rank_score = self.settings.rank_weight_relevance * source.relevance_score
                + self.settings.rank_weight_freshness * freshness
                + self.settings.rank_weight_provider_prior * provider_prior;
        }
        sources.sort_by(|a, b| {
            b.rank_score
                .partial_cmp(&a.rank_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.relevance_score.partial_cmp(&a.relevance_score).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.source_id.cmp(&b.source_id))
        });
        sources
    }

    /// Whether any provider is registered. Checked eagerly by
    /// `WorkflowGraph`/`DeepSearchEngine` before the first LLM call so
    /// `search_providers=[]` fails fast with `no_providers` rather than
    /// burning a planning round first (spec.md §8 boundary behavior).
    #[must_use]
    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }
}

fn count_distinct(sources: &[Source]) -> usize {
    use std::collections::HashSet;
    sources.iter().map(|s| s.source_id.as_str()).collect::<HashSet<_>>().len()
}

/// Heuristic domain-profile detection from a topic string, used by
/// `WorkflowGraph` and `DeepSearchEngine` to pick the provider subset
/// (spec.md §4.5's `profile` argument) when the caller hasn't pinned one.
#[must_use]
pub fn detect_profile(topic: &str) -> &'static str {
    let lower = topic.to_lowercase();
    const ACADEMIC: &[&str] = &["paper", "study", "research", "arxiv", "pubmed", "journal", "peer-reviewed"];
    const NEWS: &[&str] = &["news", "today", "breaking", "headline", "this week"];
    if ACADEMIC.iter().any(|k| lower.contains(k)) {
        "academic"
    } else if NEWS.iter().any(|k| lower.contains(k)) {
        "news"
    } else {
        "general"
    }
}
