//! `ClaimVerifier`: checks whether a cited source's excerpt actually
//! supports the claim it's attached to, and flags cited sources that
//! contradict each other on the same claim. Supplements `EvidenceEvaluator`
//! (spec.md §4.9's `consistency` and `unsupported_claims` metrics) with an
//! LLM-oracle semantic check, capped per report to bound cost.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::providers::{reliable_chat, ChatModel};
use crate::reliability::ProviderReliability;

/// A single claim sentence paired with the source excerpts cited for it.
pub struct ClaimCheck<'a> {
    pub claim: &'a str,
    pub cited_excerpts: Vec<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimVerdict {
    Supported,
    Unsupported,
    Contradicted,
}

#[derive(Deserialize)]
struct OracleResponse {
    verdict: String,
}

/// LLM-backed claim/evidence consistency oracle, rate-limited per report.
pub struct ClaimVerifier {
    model: Arc<dyn ChatModel>,
    model_name: String,
    max_calls_per_report: u32,
    reliability: Arc<ProviderReliability>,
    llm_timeout: Duration,
}

impl ClaimVerifier {
    #[must_use]
    pub fn new(
        model: Arc<dyn ChatModel>,
        model_name: impl Into<String>,
        max_calls_per_report: u32,
        reliability: Arc<ProviderReliability>,
        llm_timeout: Duration,
    ) -> Self {
        Self { model, model_name: model_name.into(), max_calls_per_report, reliability, llm_timeout }
    }

    /// Verifies a batch of claims, stopping (and reporting the remainder as
    /// `Supported` — i.e. un-penalized, not flagged) once the per-report
    /// call cap is reached, per spec.md §4.9's cost-bounding note in
    /// SPEC_FULL.md §B.
    pub async fn verify_all(&self, checks: &[ClaimCheck<'_>]) -> Vec<ClaimVerdict> {
        let calls_made = AtomicU32::new(0);
        let mut out = Vec::with_capacity(checks.len());
        for check in checks {
            if calls_made.load(Ordering::SeqCst) >= self.max_calls_per_report {
                out.push(ClaimVerdict::Supported);
                continue;
            }
            calls_made.fetch_add(1, Ordering::SeqCst);
            out.push(self.verify_one(check).await);
        }
        out
    }

    async fn verify_one(&self, check: &ClaimCheck<'_>) -> ClaimVerdict {
        if check.cited_excerpts.is_empty() {
            return ClaimVerdict::Unsupported;
        }
        let prompt = build_prompt(check);
        let messages = vec![crate::types::Message::user(prompt)];
        let response = match reliable_chat(&self.reliability, self.llm_timeout, &self.model, &self.model_name, &messages, 0.0).await {
            Ok(r) => r,
            Err(err) => {
                warn!(error = %err, "claim verifier LLM call failed, treating claim as unsupported");
                return ClaimVerdict::Unsupported;
            }
        };
        parse_verdict(&response.content)
    }
}

fn build_prompt(check: &ClaimCheck<'_>) -> String {
    format!(
        "Claim: \"{}\"\nCited evidence:\n{}\n\nDoes the evidence support the claim, contradict it, or is it unsupported? \
         Respond with one word: supported, contradicted, or unsupported.",
        check.claim,
        check.cited_excerpts.iter().enumerate().map(|(i, e)| format!("[{}] {}", i + 1, e)).collect::<Vec<_>>().join("\n")
    )
}

fn parse_verdict(text: &str) -> ClaimVerdict {
    let lower = text.to_lowercase();
    if lower.contains("contradict") {
        ClaimVerdict::Contradicted
    } else if lower.contains("unsupported") {
        ClaimVerdict::Unsupported
    } else if lower.contains("supported") {
        ClaimVerdict::Supported
    } else {
        ClaimVerdict::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackoffKind;
    use crate::providers::test_support::StubChatModel;

    fn verifier(model: Arc<dyn ChatModel>, max_calls_per_report: u32) -> ClaimVerifier {
        let reliability = Arc::new(ProviderReliability::new(1, BackoffKind::Constant, 5, Duration::from_secs(30)));
        ClaimVerifier::new(model, "m", max_calls_per_report, reliability, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn supported_claim_is_recognized() {
        let model = Arc::new(StubChatModel::new("m", "supported"));
        let verifier = verifier(model, 10);
        let checks = vec![ClaimCheck { claim: "X happened in 2020", cited_excerpts: vec!["X happened in 2020 per records"] }];
        let verdicts = verifier.verify_all(&checks).await;
        assert_eq!(verdicts[0], ClaimVerdict::Supported);
    }

    #[tokio::test]
    async fn contradicted_claim_is_recognized() {
        let model = Arc::new(StubChatModel::new("m", "the evidence contradicts this claim"));
        let verifier = verifier(model, 10);
        let checks = vec![ClaimCheck { claim: "X is true", cited_excerpts: vec!["X is false"] }];
        let verdicts = verifier.verify_all(&checks).await;
        assert_eq!(verdicts[0], ClaimVerdict::Contradicted);
    }

    #[tokio::test]
    async fn claim_with_no_citations_is_unsupported_without_llm_call() {
        let model = Arc::new(StubChatModel::new("m", "supported"));
        let verifier = verifier(model, 10);
        let checks = vec![ClaimCheck { claim: "uncited claim", cited_excerpts: vec![] }];
        let verdicts = verifier.verify_all(&checks).await;
        assert_eq!(verdicts[0], ClaimVerdict::Unsupported);
    }

    #[tokio::test]
    async fn stops_calling_llm_after_cap_reached() {
        let model = Arc::new(StubChatModel::new("m", "supported"));
        let verifier = verifier(model, 1);
        let checks = vec![
            ClaimCheck { claim: "a", cited_excerpts: vec!["evidence a"] },
            ClaimCheck { claim: "b", cited_excerpts: vec!["evidence b"] },
        ];
        let verdicts = verifier.verify_all(&checks).await;
        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts[1], ClaimVerdict::Supported);
    }
}
