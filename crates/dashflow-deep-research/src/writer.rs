//! `Writer`: composes the cited, multi-section draft report from epoch
//! summaries and selected sources (spec.md §4.10, §4.11 writer node).
//!
//! Citation numbering is assigned here, not parsed from the LLM response:
//! the prompt hands the model a numbered source list and trusts it to cite
//! with those numbers, so the `citation_index` the evaluator checks against
//! is always consistent with what was actually offered as evidence.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::context::ContextManager;
use crate::error::WriterError;
use crate::providers::{reliable_chat, ChatModel};
use crate::reliability::ProviderReliability;
use crate::types::{EpochSummary, Message, Source};

pub struct Writer {
    model: Arc<dyn ChatModel>,
    model_name: String,
    reliability: Arc<ProviderReliability>,
    llm_timeout: Duration,
}

/// A composed draft plus the citation-number -> `source_id` mapping used to
/// offer evidence to the model and later checked by `EvidenceEvaluator`.
pub struct Composition {
    pub report: String,
    pub citation_index: BTreeMap<u32, String>,
}

impl Writer {
    #[must_use]
    pub fn new(model: Arc<dyn ChatModel>, model_name: impl Into<String>, reliability: Arc<ProviderReliability>, llm_timeout: Duration) -> Self {
        Self { model, model_name: model_name.into(), reliability, llm_timeout }
    }

    /// Composes a report for `topic` from `summaries`, offering every source
    /// in `selected_ids` (in the given order) as numbered evidence `[1..N]`.
    /// Applies `context` truncation before the call so a long research
    /// history never blows the model's context window.
    pub async fn compose(
        &self,
        topic: &str,
        summaries: &[EpochSummary],
        sources: &BTreeMap<String, Source>,
        selected_ids: &[String],
        context: &ContextManager,
    ) -> Result<Composition, WriterError> {
        let mut citation_index = BTreeMap::new();
        let mut evidence = String::new();
        for (i, id) in selected_ids.iter().enumerate() {
            let n = (i + 1) as u32;
            citation_index.insert(n, id.clone());
            if let Some(source) = sources.get(id) {
                evidence.push_str(&format!("[{n}] {} — {}\n", source.title, source.excerpt));
            }
        }

        let summary_text = summaries.iter().map(|s| format!("Epoch {}: {}", s.epoch, s.text)).collect::<Vec<_>>().join("\n");

        let prompt = format!(
            "Write a cited report answering \"{topic}\" using only the numbered evidence below. \
             Cite every factual claim inline with its bracketed number, e.g. [2]. \
             Do not invent a citation number that isn't listed.\n\n\
             Research summaries:\n{summary_text}\n\nEvidence:\n{evidence}"
        );

        let system = Message::system("You are a careful research writer who never states a fact without citing the evidence number that supports it.");
        let messages = vec![system, Message::user(prompt)];
        let fit = context.fit(&messages).map_err(|e| WriterError::LlmFailed { reason: e.to_string() })?;

        let response = reliable_chat(&self.reliability, self.llm_timeout, &self.model, &self.model_name, &fit.messages, 0.0)
            .await
            .map_err(|e| WriterError::LlmFailed { reason: e.to_string() })?;

        Ok(Composition { report: response.content, citation_index })
    }
}
