//! `ContextManager`: token counting and message-list truncation so a draft
//! or revision prompt never exceeds the configured context budget
//! (spec.md §4.7). Mirrors `dashflow-context::ContextManager`, adapted to
//! this crate's own `Message`/`Role` types and the three truncation
//! strategies spec.md names.

use tiktoken_rs::{get_bpe_from_model, CoreBPE};

use crate::error::ContextError;
use crate::types::{Message, Role};

/// How `ContextManager::fit` sheds messages once the budget is exceeded
/// (spec.md §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationStrategy {
    /// Keep the system message and the most recent `keep_recent` messages;
    /// drop the oldest non-system messages first.
    Smart,
    /// Drop the oldest non-system message, one at a time, until it fits.
    Fifo,
    /// Keep the system message and the last message, dropping the middle
    /// from the oldest end first.
    Middle,
}

/// Result of a `fit` call.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub messages: Vec<Message>,
    pub token_count: usize,
    pub messages_dropped: usize,
    pub truncation_note: Option<String>,
}

/// Token-budget-aware truncation for the message list sent to an LLM.
pub struct ContextManager {
    max_tokens: usize,
    strategy: TruncationStrategy,
    keep_recent: usize,
    encoder: Option<CoreBPE>,
}

impl ContextManager {
    #[must_use]
    pub fn new(max_tokens: usize, strategy: TruncationStrategy, keep_recent: usize) -> Self {
        Self { max_tokens, strategy, keep_recent, encoder: get_bpe_from_model("gpt-4").ok() }
    }

    #[must_use]
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Token count for one piece of text. Falls back to a 4-chars-per-token
    /// estimate if the tokenizer could not be loaded.
    #[must_use]
    pub fn count_tokens(&self, text: &str) -> usize {
        match &self.encoder {
            Some(enc) => enc.encode_with_special_tokens(text).len(),
            None => text.len().div_ceil(4),
        }
    }

    fn count_message(&self, message: &Message) -> usize {
        self.count_tokens(&message.content) + 4
    }

    #[must_use]
    pub fn count_messages(&self, messages: &[Message]) -> usize {
        messages.iter().map(|m| self.count_message(m)).sum::<usize>() + 3
    }

    /// Fits `messages` into the configured budget, truncating per the
    /// configured strategy if needed. Never drops the system message or the
    /// last user message outright; if the last user message alone exceeds
    /// the budget its *content* is truncated from the end and a note is
    /// attached (spec.md §4.7 edge case).
    pub fn fit(&self, messages: &[Message]) -> Result<FitResult, ContextError> {
        if let Some(idx) = Self::system_index(messages) {
            let system_tokens = self.count_message(&messages[idx]);
            if system_tokens > self.max_tokens {
                return Err(ContextError::MessageTooLarge { index: idx, tokens: system_tokens, budget: self.max_tokens });
            }
        }

        let total = self.count_messages(messages);
        if total <= self.max_tokens {
            return Ok(FitResult { messages: messages.to_vec(), token_count: total, messages_dropped: 0, truncation_note: None });
        }

        let result = match self.strategy {
            TruncationStrategy::Smart => self.truncate_smart(messages),
            TruncationStrategy::Fifo => self.truncate_fifo(messages),
            TruncationStrategy::Middle => self.truncate_middle(messages),
        };
        self.enforce_last_user_fits(result)
    }

    fn system_index(messages: &[Message]) -> Option<usize> {
        messages.iter().position(|m| m.role == Role::System)
    }

    fn truncate_smart(&self, messages: &[Message]) -> FitResult {
        let system_idx = Self::system_index(messages);
        let last_idx = messages.len().saturating_sub(1);
        let mut kept_indices: Vec<usize> = Vec::new();
        if let Some(idx) = system_idx {
            kept_indices.push(idx);
        }
        // The designated last user message is never dropped outright, even
        // if it alone would blow the budget; `enforce_last_user_fits`
        // truncates its content instead of losing it.
        if Some(last_idx) != system_idx {
            kept_indices.push(last_idx);
        }

        let mut budget = self.max_tokens;
        for &idx in &kept_indices {
            budget = budget.saturating_sub(self.count_message(&messages[idx]));
        }

        let non_system: Vec<usize> = (0..messages.len()).filter(|&i| Some(i) != system_idx && i != last_idx).collect();
        let extra_recent = self.keep_recent.saturating_sub(1);
        let recent = non_system.iter().rev().take(extra_recent).copied().collect::<Vec<_>>();
        let mut recent_sorted = recent.clone();
        recent_sorted.sort_unstable();

        let mut accepted: Vec<usize> = Vec::new();
        let mut used = 0usize;
        for &idx in recent_sorted.iter().rev() {
            let tokens = self.count_message(&messages[idx]);
            if used + tokens <= budget {
                accepted.push(idx);
                used += tokens;
            } else {
                break;
            }
        }
        accepted.reverse();
        kept_indices.extend(accepted);
        kept_indices.sort_unstable();
        kept_indices.dedup();

        self.build_result(messages, kept_indices)
    }

    fn truncate_fifo(&self, messages: &[Message]) -> FitResult {
        let system_idx = Self::system_index(messages);
        let mut kept_indices: Vec<usize> = (0..messages.len()).collect();

        loop {
            let used: usize = kept_indices.iter().map(|&i| self.count_message(&messages[i])).sum::<usize>() + 3;
            if used <= self.max_tokens || kept_indices.len() <= 1 {
                break;
            }
            let drop_pos = kept_indices.iter().position(|&i| Some(i) != system_idx);
            match drop_pos {
                Some(pos) => {
                    kept_indices.remove(pos);
                }
                None => break,
            }
        }

        self.build_result(messages, kept_indices)
    }

    fn truncate_middle(&self, messages: &[Message]) -> FitResult {
        if messages.len() <= 2 {
            return self.truncate_fifo(messages);
        }
        let system_idx = Self::system_index(messages);
        let last_idx = messages.len() - 1;

        let mut kept_indices: Vec<usize> = Vec::new();
        if let Some(idx) = system_idx {
            kept_indices.push(idx);
        }
        kept_indices.push(last_idx);

        let mut budget = self.max_tokens;
        for &idx in &kept_indices {
            budget = budget.saturating_sub(self.count_message(&messages[idx]));
        }

        let middle_start = if system_idx == Some(0) { 1 } else { 0 };
        let middle: Vec<usize> = (middle_start..last_idx).filter(|&i| Some(i) != system_idx).collect();

        let mut accepted: Vec<usize> = Vec::new();
        let mut used = 0usize;
        for &idx in middle.iter().rev() {
            let tokens = self.count_message(&messages[idx]);
            if used + tokens <= budget {
                accepted.push(idx);
                used += tokens;
            } else {
                break;
            }
        }
        accepted.reverse();
        kept_indices.extend(accepted);
        kept_indices.sort_unstable();
        kept_indices.dedup();

        self.build_result(messages, kept_indices)
    }

    fn build_result(&self, messages: &[Message], kept_indices: Vec<usize>) -> FitResult {
        let kept: Vec<Message> = kept_indices.iter().map(|&i| messages[i].clone()).collect();
        let token_count = self.count_messages(&kept);
        FitResult { messages_dropped: messages.len() - kept.len(), token_count, messages: kept, truncation_note: None }
    }

    /// If, even after dropping every other message, the last user message
    /// alone still exceeds the budget, truncate its text from the end and
    /// attach a note rather than fail the whole fit.
    fn enforce_last_user_fits(&self, result: FitResult) -> Result<FitResult, ContextError> {
        let Some(last) = result.messages.last() else {
            return Ok(result);
        };
        let last_tokens = self.count_message(last);
        if last_tokens <= self.max_tokens {
            return Ok(result);
        }

        let mut messages = result.messages;
        let idx = messages.len() - 1;
        let keep_chars = (self.max_tokens.saturating_sub(8)) * 4;
        let original = messages[idx].content.clone();
        let truncated: String = original.chars().take(keep_chars).collect();
        messages[idx] = Message { role: messages[idx].role, content: truncated };
        let token_count = self.count_messages(&messages);
        Ok(FitResult {
            token_count,
            messages_dropped: result.messages_dropped,
            messages,
            truncation_note: Some(format!(
                "last message truncated from {} to {keep_chars} characters to fit the {}-token budget",
                original.chars().count(),
                self.max_tokens
            )),
        })
    }
}
