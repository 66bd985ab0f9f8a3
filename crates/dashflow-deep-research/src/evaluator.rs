//! `EvidenceEvaluator`: computes `QualityMetrics` for a draft report and
//! applies the citation gate that decides `pass`/`revise`/`abort`
//! (spec.md §4.9).

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::claim_verifier::{ClaimCheck, ClaimVerdict, ClaimVerifier};
use crate::types::{Dimension, QualityMetrics, Source, SubQuery, Verdict};

fn citation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(\d+)\]").expect("valid regex"))
}

fn time_sensitive_keywords_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(latest|recent|current|newest|updated|today|this year|trend)\b").expect("valid regex"))
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid regex"))
}

/// Every `[N]`-style citation number appearing in `text`, in order of
/// first appearance. Used both by `RunState::cited_source_ids` and by the
/// evaluator's citation-coverage computation.
#[must_use]
pub fn extract_citation_numbers(text: &str) -> Vec<u32> {
    citation_re().captures_iter(text).filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok()).collect()
}

/// Whether `topic`/`draft` should be judged against the freshness gate,
/// per spec.md §4.9's keyword-or-current-year heuristic.
#[must_use]
pub fn is_time_sensitive(topic: &str, current_year: i32) -> bool {
    if time_sensitive_keywords_re().is_match(topic) {
        return true;
    }
    year_re().captures_iter(topic).any(|c| {
        c.get(0).and_then(|m| m.as_str().parse::<i32>().ok()).map(|y| y >= current_year).unwrap_or(false)
    })
}

/// Heuristic claim-sentence extraction: sentences containing a digit, a
/// capitalized multi-word run (named entity proxy), a comparative
/// adjective, or a time reference are treated as factual claims worth
/// citation-checking.
#[must_use]
pub fn extract_claim_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| {
            s.chars().any(|c| c.is_ascii_digit())
                || comparative_re().is_match(s)
                || named_entity_re().is_match(s)
                || time_sensitive_keywords_re().is_match(s)
        })
        .collect()
}

fn comparative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(more|less|greater|higher|lower|faster|slower|better|worse|largest|smallest)\b").expect("valid regex")
    })
}

fn named_entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").expect("valid regex"))
}

pub struct EvidenceEvaluator {
    claim_verifier: Arc<ClaimVerifier>,
    min_coverage: f64,
    min_freshness: f64,
    freshness_window_days: f64,
    max_revisions: u32,
}

impl EvidenceEvaluator {
    #[must_use]
    pub fn new(
        claim_verifier: Arc<ClaimVerifier>,
        min_coverage: f64,
        min_freshness: f64,
        freshness_window_days: f64,
        max_revisions: u32,
    ) -> Self {
        Self { claim_verifier, min_coverage, min_freshness, freshness_window_days, max_revisions }
    }

    /// Evaluates `draft` against `plan` and `sources`. `citation_index` maps
    /// a citation number to the `source_id` it refers to (built by the
    /// writer when it emits the draft).
    pub async fn evaluate(
        &self,
        draft: &str,
        topic: &str,
        current_year: i32,
        plan: &[SubQuery],
        sources: &BTreeMap<String, Source>,
        citation_index: &BTreeMap<u32, String>,
    ) -> QualityMetrics {
        let cited_numbers = extract_citation_numbers(draft);
        let cited_source_ids: Vec<String> = cited_numbers.iter().filter_map(|n| citation_index.get(n).cloned()).collect();

        let query_coverage = self.query_coverage(plan, &cited_source_ids, sources);

        let claims = extract_claim_sentences(draft);
        let checks: Vec<ClaimCheck<'_>> = claims
            .iter()
            .map(|claim| {
                let excerpts: Vec<&str> = cited_source_ids
                    .iter()
                    .filter_map(|id| sources.get(id))
                    .map(|s| s.excerpt.as_str())
                    .collect();
                ClaimCheck { claim, cited_excerpts: excerpts }
            })
            .collect();

        let citation_coverage = if claims.is_empty() {
            1.0
        } else {
            // A claim only counts as cited if at least one of its citation
            // numbers resolves to a known source, not merely if it contains
            // something shaped like a citation.
            let cited_claims = claims
                .iter()
                .filter(|c| extract_citation_numbers(c).iter().any(|n| citation_index.contains_key(n)))
                .count();
            cited_claims as f64 / claims.len() as f64
        };

        let verdicts = self.claim_verifier.verify_all(&checks).await;
        let unsupported_claims = verdicts.iter().filter(|v| **v == ClaimVerdict::Unsupported).count() as u32;
        let contradicted = verdicts.iter().filter(|v| **v == ClaimVerdict::Contradicted).count();
        let consistency = if verdicts.is_empty() { 1.0 } else { 1.0 - (contradicted as f64 / verdicts.len() as f64) };

        let time_sensitive = is_time_sensitive(topic, current_year);
        let freshness_ratio = if time_sensitive {
            self.freshness_ratio(&cited_source_ids, sources)
        } else {
            1.0
        };

        let gaps = self.coverage_gaps(plan, &cited_source_ids, sources);

        let mut metrics = QualityMetrics {
            query_coverage,
            citation_coverage,
            freshness_ratio,
            consistency,
            unsupported_claims,
            budget_exceeded: false,
            gaps,
        };
        metrics.gaps.sort();
        metrics
    }

    /// Citation gate: decides `pass`/`revise` from the computed metrics. A
    /// run at `max_revisions` always passes (with the caller expected to
    /// log a warning).
    #[must_use]
    pub fn gate(&self, metrics: &QualityMetrics, time_sensitive: bool, revisions: u32) -> Verdict {
        if revisions >= self.max_revisions {
            return Verdict::Pass;
        }
        if metrics.citation_coverage < self.min_coverage {
            return Verdict::Revise;
        }
        if time_sensitive && metrics.freshness_ratio < self.min_freshness {
            return Verdict::Revise;
        }
        Verdict::Pass
    }

    /// Fraction of the plan's distinct dimensions that have at least one
    /// cited source tagged with that dimension. Each dimension is checked
    /// independently against the sources actually cited for it, rather than
    /// a single run-wide "was anything cited at all" flag, so a plan that
    /// targets several dimensions and gets citations for only some of them
    /// scores a true fraction rather than collapsing to 0.0 or 1.0.
    fn query_coverage(&self, plan: &[SubQuery], cited_source_ids: &[String], sources: &BTreeMap<String, Source>) -> f64 {
        if plan.is_empty() {
            return 1.0;
        }
        let dims_in_plan: std::collections::BTreeSet<Dimension> = plan.iter().map(|q| q.dimension).collect();
        let cited: Vec<&Source> = cited_source_ids.iter().filter_map(|id| sources.get(id)).collect();
        let covered_dims = dims_in_plan.iter().filter(|d| cited.iter().any(|s| s.dimension == Some(**d))).count();
        covered_dims as f64 / dims_in_plan.len() as f64
    }

    /// Dimensions the plan targeted but that have no cited, surviving
    /// source backing them — consumed by `QueryPlanner::refine`.
    fn coverage_gaps(&self, plan: &[SubQuery], cited_source_ids: &[String], sources: &BTreeMap<String, Source>) -> Vec<Dimension> {
        let cited: Vec<&Source> = cited_source_ids.iter().filter_map(|id| sources.get(id)).collect();
        plan.iter()
            .map(|q| q.dimension)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .filter(|d| !cited.iter().any(|s| s.dimension == Some(*d)))
            .collect()
    }

    fn freshness_ratio(&self, cited_source_ids: &[String], sources: &BTreeMap<String, Source>) -> f64 {
        let cited: Vec<&Source> = cited_source_ids.iter().filter_map(|id| sources.get(id)).collect();
        if cited.is_empty() {
            return 0.0;
        }
        let fresh = cited
            .iter()
            .filter(|s| s.freshness_days.map(|d| d <= self.freshness_window_days).unwrap_or(false))
            .count();
        fresh as f64 / cited.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackoffKind;
    use crate::providers::test_support::StubChatModel;
    use crate::reliability::ProviderReliability;
    use crate::types::{Dimension, SubQueryStatus};
    use std::time::Duration;

    fn evaluator(max_revisions: u32) -> EvidenceEvaluator {
        let model = Arc::new(StubChatModel::new("m", "supported"));
        let reliability = Arc::new(ProviderReliability::new(1, BackoffKind::Constant, 5, Duration::from_secs(30)));
        let verifier = Arc::new(ClaimVerifier::new(model, "m", 20, reliability, Duration::from_secs(5)));
        EvidenceEvaluator::new(verifier, 0.6, 0.4, 30.0, max_revisions)
    }

    fn src(id: &str, freshness_days: Option<f64>) -> Source {
        Source {
            source_id: id.to_string(),
            url: format!("https://example.com/{id}"),
            raw_url: format!("https://example.com/{id}"),
            title: id.to_string(),
            excerpt: "the value was 42 in 2024".to_string(),
            full_text: None,
            provider: "exa".to_string(),
            providers: vec!["exa".to_string()],
            published_at: None,
            freshness_days,
            relevance_score: 0.5,
            rank_score: 0.5,
            dimension: None,
        }
    }

    #[test]
    fn extract_citation_numbers_finds_all_in_order() {
        assert_eq!(extract_citation_numbers("a [1] b [3] c [2]"), vec![1, 3, 2]);
        assert_eq!(extract_citation_numbers("no citations here"), Vec::<u32>::new());
    }

    #[test]
    fn time_sensitive_detects_keywords_and_current_year() {
        assert!(is_time_sensitive("what is the latest news on X", 2026));
        assert!(is_time_sensitive("events in 2026", 2026));
        assert!(!is_time_sensitive("history of ancient Rome", 2026));
    }

    #[test]
    fn extract_claim_sentences_finds_numeric_and_entity_sentences() {
        let text = "The value was 42. John Smith said hello. Plain filler sentence without signal.";
        let claims = extract_claim_sentences(text);
        assert!(claims.iter().any(|c| c.contains("42")));
        assert!(claims.iter().any(|c| c.contains("John Smith")));
    }

    #[tokio::test]
    async fn evaluate_computes_metrics_end_to_end() {
        let eval = evaluator(2);
        let mut sources = BTreeMap::new();
        sources.insert("a".to_string(), src("a", Some(5.0)));
        let mut citation_index = BTreeMap::new();
        citation_index.insert(1, "a".to_string());
        let plan = vec![SubQuery { text: "q".into(), dimension: Dimension::Temporal, issued_epoch: 0, status: SubQueryStatus::Done }];
        let draft = "The value was 42 in 2024 [1].";
        let metrics = eval.evaluate(draft, "latest value", 2026, &plan, &sources, &citation_index).await;
        assert!(metrics.citation_coverage > 0.0);
        assert_eq!(metrics.unsupported_claims, 0);
    }

    #[test]
    fn gate_revises_below_coverage_threshold() {
        let eval = evaluator(5);
        let metrics = QualityMetrics { citation_coverage: 0.1, freshness_ratio: 1.0, ..Default::default() };
        assert_eq!(eval.gate(&metrics, false, 0), Verdict::Revise);
    }

    #[test]
    fn gate_passes_at_max_revisions_regardless_of_metrics() {
        let eval = evaluator(2);
        let metrics = QualityMetrics { citation_coverage: 0.0, freshness_ratio: 0.0, ..Default::default() };
        assert_eq!(eval.gate(&metrics, true, 2), Verdict::Pass);
    }

    #[test]
    fn gate_revises_on_stale_time_sensitive_sources() {
        let eval = evaluator(5);
        let metrics = QualityMetrics { citation_coverage: 0.9, freshness_ratio: 0.1, ..Default::default() };
        assert_eq!(eval.gate(&metrics, true, 0), Verdict::Revise);
    }

    #[test]
    fn gate_passes_when_not_time_sensitive_despite_low_freshness() {
        let eval = evaluator(5);
        let metrics = QualityMetrics { citation_coverage: 0.9, freshness_ratio: 0.0, ..Default::default() };
        assert_eq!(eval.gate(&metrics, false, 0), Verdict::Pass);
    }
}
