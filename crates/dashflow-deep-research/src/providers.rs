//! Outbound collaborator interfaces (spec.md §6 "Outbound") and the
//! explicit startup-populated registries that replace decorator-style tool
//! registration (spec.md §9 Design Notes, SPEC_FULL.md §B).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ProviderError;
use crate::reliability::ProviderReliability;

/// A single raw hit returned by a search provider, before canonicalization.
#[derive(Debug, Clone)]
pub struct RawHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub published_at: Option<DateTime<Utc>>,
    pub relevance: Option<f64>,
}

/// Identity of a search provider, supplied at registration. A plain string
/// (rather than a closed enum) so new providers register without touching
/// this crate, per spec.md §6's "Provider identity is an enum value
/// supplied at registration" and the registry Design Note.
pub type ProviderId = String;

/// A search backend. Implementations wrap a concrete vendor (Exa, Tavily,
/// Brave, Serper, arXiv, PubMed, ...); `MultiSearchOrchestrator` only ever
/// talks to this trait.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        max_results: usize,
        profile_hints: &[String],
    ) -> Result<Vec<RawHit>, ProviderError>;
}

/// Chat completion result (spec.md §6 outbound LLM interface).
#[derive(Debug, Clone, Default)]
pub struct ChatResult {
    pub content: String,
    pub finish_reason: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub tool_calls: Vec<Value>,
}

/// An LLM backend. `temperature = 0.0` is expected to be honored
/// deterministically by conforming implementations (spec.md §4.8).
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn id(&self) -> &str;

    async fn chat(
        &self,
        model: &str,
        messages: &[crate::types::Message],
        temperature: f32,
    ) -> Result<ChatResult, ProviderError>;
}

/// Issues one `chat` call through `reliability`'s timeout/retry/circuit
/// breaker (spec.md §5: "every external I/O has a timeout ... Timeout ->
/// retry (per ProviderReliability) or failure" applies to the LLM provider
/// class the same as search). `model_name` doubles as the reliability
/// circuit key, so a given backend's LLM calls share one breaker regardless
/// of which component issued them.
pub async fn reliable_chat(
    reliability: &ProviderReliability,
    timeout: std::time::Duration,
    model: &Arc<dyn ChatModel>,
    model_name: &str,
    messages: &[crate::types::Message],
    temperature: f32,
) -> Result<ChatResult, ProviderError> {
    reliability.call(model_name, timeout, || async { model.chat(model_name, messages, temperature).await }).await
}

/// Fetched page content (spec.md §6 outbound crawler interface).
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub text: String,
    pub status: u16,
    pub final_url: String,
}

/// A crawler backend used by `ContentHydrator` to enrich sparse excerpts.
#[async_trait]
pub trait Crawler: Send + Sync {
    async fn fetch(&self, url: &str, timeout: std::time::Duration) -> Result<FetchResult, ProviderError>;
}

/// Maps a `profile` (e.g. `academic`, `news`, `general`) to an ordered
/// provider subset (spec.md §4.5). Unknown profiles fall back to `general`.
#[derive(Debug, Clone, Default)]
pub struct ProfileRouting {
    profiles: HashMap<String, Vec<String>>,
}

impl ProfileRouting {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_profile(mut self, name: impl Into<String>, providers: Vec<String>) -> Self {
        self.profiles.insert(name.into(), providers);
        self
    }

    /// Resolves a profile to its provider subset, falling back to
    /// `general` (and, if that is also absent, every registered provider
    /// the caller passes as `all_providers`) when the profile is unknown.
    #[must_use]
    pub fn resolve<'a>(&'a self, profile: &str, all_providers: &'a [String]) -> &'a [String] {
        if let Some(providers) = self.profiles.get(profile) {
            return providers;
        }
        if let Some(general) = self.profiles.get("general") {
            return general;
        }
        all_providers
    }
}

/// Explicit, startup-populated registry of search providers. Enabling a new
/// provider is a `register` call, not a code change to the orchestrator
/// (SPEC_FULL.md §B).
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn SearchProvider>>,
    order: Vec<String>,
    routing: ProfileRouting,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn SearchProvider>) {
        let id = provider.id().to_string();
        if !self.providers.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.providers.insert(id, provider);
    }

    #[must_use]
    pub fn with_routing(mut self, routing: ProfileRouting) -> Self {
        self.routing = routing;
        self
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn SearchProvider>> {
        self.providers.get(id).cloned()
    }

    /// Enabled providers in registration order.
    #[must_use]
    pub fn enabled(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Restricts this registry to exactly `ids`, in that order, dropping
    /// anything registered but not named. Backs `RunConfig::search_providers`
    /// (spec.md §6): a non-empty list selects and orders the active subset,
    /// and an empty list yields an empty registry so the first search fails
    /// fast with `no_providers` (spec.md §8) rather than silently falling
    /// back to every registered provider.
    #[must_use]
    pub fn filtered(&self, ids: &[String]) -> Self {
        let mut out = Self { providers: HashMap::new(), order: Vec::new(), routing: self.routing.clone() };
        for id in ids {
            if let Some(provider) = self.providers.get(id) {
                out.register(provider.clone());
            }
        }
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolves a profile to its provider subset, degrading to `general`
    /// (or every enabled provider) per spec.md §4.5.
    #[must_use]
    pub fn providers_for_profile(&self, profile: &str) -> Vec<String> {
        self.routing.resolve(profile, &self.order).to_vec()
    }
}

/// Explicit registry of chat-model backends, mirroring `ProviderRegistry`.
#[derive(Default, Clone)]
pub struct LlmRegistry {
    models: HashMap<String, Arc<dyn ChatModel>>,
    order: Vec<String>,
}

impl LlmRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: Arc<dyn ChatModel>) {
        let id = model.id().to_string();
        if !self.models.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.models.insert(id, model);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn ChatModel>> {
        self.models.get(id).cloned()
    }

    /// The first-registered model, used as the implicit default when a run
    /// doesn't request one by id.
    #[must_use]
    pub fn default_model(&self) -> Option<(String, Arc<dyn ChatModel>)> {
        let id = self.order.first()?;
        self.models.get(id).map(|m| (id.clone(), m.clone()))
    }
}

/// Deterministic stubs for search providers, chat models, and crawlers.
/// Compiled in for unit tests automatically; gated behind the
/// `test-support` feature for external consumers (this crate's own
/// `tests/` integration suite included) so production builds never carry
/// the stubs.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Deterministic stub search provider for unit/integration tests.
    pub struct StubProvider {
        id: String,
        pub hits: Vec<RawHit>,
        pub fail_times: Mutex<u32>,
        pub calls: AtomicUsize,
    }

    impl StubProvider {
        pub fn new(id: impl Into<String>, hits: Vec<RawHit>) -> Self {
            Self { id: id.into(), hits, fail_times: Mutex::new(0), calls: AtomicUsize::new(0) }
        }

        pub fn failing(id: impl Into<String>, times: u32) -> Self {
            Self { id: id.into(), hits: Vec::new(), fail_times: Mutex::new(times), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        fn id(&self) -> &str {
            &self.id
        }

        async fn search(
            &self,
            _query: &str,
            max_results: usize,
            _profile_hints: &[String],
        ) -> Result<Vec<RawHit>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut remaining = self.fail_times.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ProviderError::Transport { provider: self.id.clone(), reason: "stub failure".into() });
            }
            Ok(self.hits.iter().take(max_results).cloned().collect())
        }
    }

    /// Deterministic stub chat model: always returns a fixed response.
    pub struct StubChatModel {
        id: String,
        pub response: String,
    }

    impl StubChatModel {
        pub fn new(id: impl Into<String>, response: impl Into<String>) -> Self {
            Self { id: id.into(), response: response.into() }
        }
    }

    #[async_trait]
    impl ChatModel for StubChatModel {
        fn id(&self) -> &str {
            &self.id
        }

        async fn chat(
            &self,
            _model: &str,
            _messages: &[crate::types::Message],
            _temperature: f32,
        ) -> Result<ChatResult, ProviderError> {
            Ok(ChatResult {
                content: self.response.clone(),
                finish_reason: "stop".to_string(),
                prompt_tokens: 10,
                completion_tokens: 10,
                tool_calls: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::StubProvider;
    use super::*;

    #[tokio::test]
    async fn provider_registry_registers_and_resolves() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubProvider::new("exa", vec![])));
        registry.register(Arc::new(StubProvider::new("tavily", vec![])));
        assert_eq!(registry.enabled(), vec!["exa".to_string(), "tavily".to_string()]);
        assert!(registry.get("exa").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn profile_routing_falls_back_to_general() {
        let routing = ProfileRouting::new()
            .with_profile("academic", vec!["pubmed".to_string(), "arxiv".to_string()])
            .with_profile("general", vec!["exa".to_string(), "tavily".to_string()]);
        let all = vec!["exa".to_string(), "tavily".to_string(), "pubmed".to_string()];
        assert_eq!(routing.resolve("academic", &all), &["pubmed".to_string(), "arxiv".to_string()]);
        assert_eq!(routing.resolve("unknown_profile", &all), &["exa".to_string(), "tavily".to_string()]);
    }

    #[test]
    fn profile_routing_falls_back_to_all_when_no_general() {
        let routing = ProfileRouting::new();
        let all = vec!["exa".to_string()];
        assert_eq!(routing.resolve("unknown", &all), &["exa".to_string()]);
    }

    #[tokio::test]
    async fn llm_registry_registers_and_resolves() {
        use test_support::StubChatModel;
        let mut registry = LlmRegistry::new();
        registry.register(Arc::new(StubChatModel::new("gpt-4o", "hello")));
        let model = registry.get("gpt-4o").expect("registered");
        let result = model.chat("gpt-4o", &[], 0.0).await.unwrap();
        assert_eq!(result.content, "hello");
        assert!(registry.get("missing").is_none());
    }
}
