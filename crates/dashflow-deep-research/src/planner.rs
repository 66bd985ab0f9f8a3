//! `QueryPlanner`: generates diverse, non-redundant sub-queries for an
//! epoch, and refines the plan around evaluator-identified gaps
//! (spec.md §4.8).

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::PlannerError;
use crate::providers::{reliable_chat, ChatModel};
use crate::reliability::ProviderReliability;
use crate::types::{Dimension, SubQuery, SubQueryStatus, ALL_DIMENSIONS};

pub struct QueryPlanner {
    model: Arc<dyn ChatModel>,
    model_name: String,
    reliability: Arc<ProviderReliability>,
    llm_timeout: Duration,
}

impl QueryPlanner {
    #[must_use]
    pub fn new(model: Arc<dyn ChatModel>, model_name: impl Into<String>, reliability: Arc<ProviderReliability>, llm_timeout: Duration) -> Self {
        Self { model, model_name: model_name.into(), reliability, llm_timeout }
    }

    /// Produces up to `n` sub-queries spanning `ALL_DIMENSIONS`, skipping
    /// any that duplicate (case-insensitive exact match or substring) a
    /// query already in `avoid`.
    pub async fn plan(
        &self,
        topic: &str,
        n: usize,
        epoch: u32,
        avoid: &[String],
    ) -> Result<Vec<SubQuery>, PlannerError> {
        let prompt = build_plan_prompt(topic, n, avoid);
        let messages = vec![crate::types::Message::user(prompt)];
        let response = reliable_chat(&self.reliability, self.llm_timeout, &self.model, &self.model_name, &messages, 0.0)
            .await
            .map_err(|e| PlannerError::LlmFailed { reason: e.to_string() })?;

        let parsed = parse_queries(&response.content);
        if parsed.is_empty() {
            warn!(topic, "planner output could not be parsed, falling back to a single default query");
            return Ok(vec![SubQuery {
                text: topic.to_string(),
                dimension: Dimension::Definitional,
                issued_epoch: epoch,
                status: SubQueryStatus::Pending,
            }]);
        }

        Ok(self.dedup_and_assign(parsed, epoch, n, avoid))
    }

    /// Refinement mode: preferentially targets dimensions the evaluator
    /// flagged as under-covered.
    pub async fn refine(&self, topic: &str, gaps: &[Dimension], n: usize, epoch: u32, avoid: &[String]) -> Result<Vec<SubQuery>, PlannerError> {
        if gaps.is_empty() {
            return self.plan(topic, n, epoch, avoid).await;
        }
        let prompt = build_refine_prompt(topic, gaps, n, avoid);
        let messages = vec![crate::types::Message::user(prompt)];
        let response = reliable_chat(&self.reliability, self.llm_timeout, &self.model, &self.model_name, &messages, 0.0)
            .await
            .map_err(|e| PlannerError::LlmFailed { reason: e.to_string() })?;

        let parsed = parse_queries(&response.content);
        if parsed.is_empty() {
            return self.plan(topic, n, epoch, avoid).await;
        }
        Ok(self.dedup_and_assign(parsed, epoch, n, avoid))
    }

    fn dedup_and_assign(&self, parsed: Vec<(String, Dimension)>, epoch: u32, n: usize, avoid: &[String]) -> Vec<SubQuery> {
        let avoid_lower: Vec<String> = avoid.iter().map(|s| s.to_lowercase()).collect();
        let mut seen: Vec<String> = Vec::new();
        let mut out = Vec::new();

        for (text, dimension) in parsed {
            let lower = text.to_lowercase();
            let is_dup = avoid_lower.iter().any(|a| a == &lower || a.contains(&lower) || lower.contains(a))
                || seen.iter().any(|s| s == &lower || s.contains(&lower) || lower.contains(s));
            if is_dup {
                continue;
            }
            seen.push(lower);
            out.push(SubQuery { text, dimension, issued_epoch: epoch, status: SubQueryStatus::Pending });
            if out.len() >= n {
                break;
            }
        }
        out
    }
}

fn build_plan_prompt(topic: &str, n: usize, avoid: &[String]) -> String {
    let dims = ALL_DIMENSIONS.iter().map(|d| format!("{d:?}")).collect::<Vec<_>>().join(", ");
    format!(
        "Generate {n} diverse research sub-queries for the topic \"{topic}\", spanning these dimensions: {dims}. \
         Avoid duplicating: {avoid:?}. Respond with one query per line, each prefixed by its dimension in brackets, \
         e.g. [temporal] when did X happen."
    )
}

fn build_refine_prompt(topic: &str, gaps: &[Dimension], n: usize, avoid: &[String]) -> String {
    let gap_names = gaps.iter().map(|d| format!("{d:?}")).collect::<Vec<_>>().join(", ");
    format!(
        "The current research on \"{topic}\" under-covers these dimensions: {gap_names}. \
         Generate {n} sub-queries that target them. Avoid duplicating: {avoid:?}. \
         Respond with one query per line, each prefixed by its dimension in brackets."
    )
}

/// Parses `[dimension] query text` lines out of an LLM response. Lines that
/// don't match the expected shape are skipped rather than failing the whole
/// parse.
fn parse_queries(text: &str) -> Vec<(String, Dimension)> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix('[')?;
            let (tag, query) = rest.split_once(']')?;
            let dimension = parse_dimension(tag.trim())?;
            let query = query.trim();
            if query.is_empty() {
                return None;
            }
            Some((query.to_string(), dimension))
        })
        .collect()
}

fn parse_dimension(tag: &str) -> Option<Dimension> {
    match tag.to_lowercase().as_str() {
        "temporal" => Some(Dimension::Temporal),
        "comparative" => Some(Dimension::Comparative),
        "causal" => Some(Dimension::Causal),
        "definitional" => Some(Dimension::Definitional),
        "quantitative" => Some(Dimension::Quantitative),
        _ => None,
    }
}
