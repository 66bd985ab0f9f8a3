//! `ContentHydrator`: fetches fuller page content for sparse search hits
//! (spec.md §4.6).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::cancellation::Token;
use crate::providers::Crawler;
use crate::types::Source;

pub struct ContentHydrator {
    crawler: Option<Arc<dyn Crawler>>,
    sparse_threshold: usize,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl ContentHydrator {
    #[must_use]
    pub fn new(crawler: Option<Arc<dyn Crawler>>, sparse_threshold: usize, concurrency: usize, timeout: Duration) -> Self {
        Self { crawler, sparse_threshold, semaphore: Arc::new(Semaphore::new(concurrency.max(1))), timeout }
    }

    /// Hydrates every source whose excerpt is shorter than the sparse
    /// threshold, in place. Failures are swallowed (the excerpt is left
    /// as-is) and logged. Each fetch runs as its own task so up to
    /// `concurrency` fetches are genuinely in flight at once, bounded by the
    /// semaphore permit acquired inside the task rather than serialized by
    /// holding one permit across an awaited loop body; cancellable both
    /// before dispatching a new fetch and between collecting finished ones
    /// (outstanding tasks are aborted once cancellation is observed).
    pub async fn hydrate(&self, sources: &mut [Source], token: &Token) {
        let Some(crawler) = self.crawler.clone() else {
            debug!("crawler disabled, skipping hydration");
            return;
        };

        let mut handles = Vec::new();
        for (index, source) in sources.iter().enumerate() {
            if token.is_cancelled() {
                break;
            }
            if source.excerpt.len() >= self.sparse_threshold {
                continue;
            }
            let crawler = crawler.clone();
            let semaphore = self.semaphore.clone();
            let url = source.url.clone();
            let timeout = self.timeout;
            handles.push((
                index,
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    match crawler.fetch(&url, timeout).await {
                        Ok(fetched) => Some(fetched.text),
                        Err(err) => {
                            warn!(url = %url, error = %err, "hydration fetch failed, keeping excerpt");
                            None
                        }
                    }
                }),
            ));
        }

        for (index, handle) in handles {
            if token.is_cancelled() {
                handle.abort();
                continue;
            }
            match handle.await {
                Ok(Some(text)) => sources[index].full_text = Some(text),
                Ok(None) => {}
                Err(err) if err.is_cancelled() => {}
                Err(err) => warn!(error = %err, "hydration task panicked"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::ProviderError;
    use crate::providers::FetchResult;

    struct StubCrawler {
        calls: AtomicUsize,
        fail_urls: Vec<String>,
    }

    #[async_trait]
    impl Crawler for StubCrawler {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_urls.contains(&url.to_string()) {
                return Err(ProviderError::Transport { provider: "crawler".into(), reason: "down".into() });
            }
            Ok(FetchResult { text: format!("full text for {url}"), status: 200, final_url: url.to_string() })
        }
    }

    fn source(id: &str, excerpt_len: usize) -> Source {
        Source {
            source_id: id.to_string(),
            url: format!("https://example.com/{id}"),
            raw_url: format!("https://example.com/{id}"),
            title: id.to_string(),
            excerpt: "x".repeat(excerpt_len),
            full_text: None,
            provider: "exa".to_string(),
            providers: vec!["exa".to_string()],
            published_at: None,
            freshness_days: None,
            relevance_score: 0.5,
            rank_score: 0.5,
            dimension: None,
        }
    }

    fn token() -> (crate::cancellation::CancellationRegistry, Token) {
        let reg = crate::cancellation::CancellationRegistry::new();
        let token = reg.issue("run-1");
        (reg, token)
    }

    #[tokio::test]
    async fn hydrates_sparse_sources_only() {
        let crawler = Arc::new(StubCrawler { calls: AtomicUsize::new(0), fail_urls: vec![] });
        let hydrator = ContentHydrator::new(Some(crawler.clone()), 10, 5, Duration::from_secs(1));
        let (_reg, token) = token();
        let mut sources = vec![source("sparse", 3), source("rich", 100)];
        hydrator.hydrate(&mut sources, &token).await;
        assert!(sources[0].full_text.is_some());
        assert!(sources[1].full_text.is_none());
        assert_eq!(crawler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn swallows_fetch_failures() {
        let crawler = Arc::new(StubCrawler { calls: AtomicUsize::new(0), fail_urls: vec!["https://example.com/sparse".to_string()] });
        let hydrator = ContentHydrator::new(Some(crawler), 10, 5, Duration::from_secs(1));
        let (_reg, token) = token();
        let mut sources = vec![source("sparse", 3)];
        hydrator.hydrate(&mut sources, &token).await;
        assert!(sources[0].full_text.is_none());
        assert_eq!(sources[0].excerpt, "x".repeat(3));
    }

    #[tokio::test]
    async fn disabled_crawler_skips_hydration() {
        let hydrator = ContentHydrator::new(None, 10, 5, Duration::from_secs(1));
        let (_reg, token) = token();
        let mut sources = vec![source("sparse", 3)];
        hydrator.hydrate(&mut sources, &token).await;
        assert!(sources[0].full_text.is_none());
    }

    #[tokio::test]
    async fn cancellation_stops_between_fetches() {
        let crawler = Arc::new(StubCrawler { calls: AtomicUsize::new(0), fail_urls: vec![] });
        let hydrator = ContentHydrator::new(Some(crawler.clone()), 10, 5, Duration::from_secs(1));
        let reg = crate::cancellation::CancellationRegistry::new();
        let token = reg.issue("run-1");
        reg.cancel("run-1", "stop");
        let mut sources = vec![source("a", 1), source("b", 1)];
        hydrator.hydrate(&mut sources, &token).await;
        assert_eq!(crawler.calls.load(Ordering::SeqCst), 0);
    }
}
