//! `SourceRegistry`: URL canonicalization and stable `source_id` assignment
//! (spec.md §4.2). Concurrent-safe; canonicalize+insert is one atomic
//! operation so the no-duplicate-`source_id` invariant (spec.md §3) always
//! holds across epochs and providers.

use std::sync::Arc;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use url::Url;

/// Tracking parameters stripped during canonicalization (spec.md §4.2).
const TRACKING_PARAM_PREFIXES: &[&str] = &["utm_"];
const TRACKING_PARAMS_EXACT: &[&str] = &["fbclid", "gclid", "ref", "ref_src"];

/// Lowercases scheme/host, strips `www.`, drops default ports and the
/// fragment, sorts query parameters, and strips the tracking allow-list.
/// Pure function: `canonicalize(canonicalize(u)) == canonicalize(u)`.
#[must_use]
pub fn canonicalize(raw_url: &str) -> String {
    let Ok(mut url) = Url::parse(raw_url) else {
        // Not a parseable URL (e.g. the provider handed us a bare string);
        // fall back to a trimmed/lowercased copy so we still get a stable
        // identity rather than failing the whole pipeline.
        return raw_url.trim().to_lowercase();
    };

    let scheme = url.scheme().to_lowercase();
    let _ = url.set_scheme(&scheme);

    if let Some(host) = url.host_str() {
        let mut host = host.to_lowercase();
        if let Some(stripped) = host.strip_prefix("www.") {
            host = stripped.to_string();
        }
        let _ = url.set_host(Some(&host));
    }

    // Default ports carry no identity information.
    let default_port = match scheme.as_str() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };
    if url.port() == default_port {
        let _ = url.set_port(None);
    }

    url.set_fragment(None);

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .filter(|(k, _)| !is_tracking_param(k))
        .collect();
    params.sort();

    if params.is_empty() {
        url.set_query(None);
    } else {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }

    url.to_string()
}

fn is_tracking_param(key: &str) -> bool {
    let lower = key.to_lowercase();
    TRACKING_PARAM_PREFIXES.iter().any(|p| lower.starts_with(p))
        || TRACKING_PARAMS_EXACT.contains(&lower.as_str())
}

/// Deterministic fingerprint of a canonical URL.
#[must_use]
pub fn source_id_for(canonical_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_url.as_bytes());
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

/// Canonicalizes URLs and hands back stable `source_id`s. Insertion is
/// idempotent: re-adding the same raw URL (even with different tracking
/// params or casing) returns the original ID.
#[derive(Default)]
pub struct SourceRegistry {
    // canonical_url -> source_id
    by_canonical: DashMap<String, Arc<str>>,
}

/// Outcome of registering a raw URL.
#[derive(Debug, Clone)]
pub struct Registered {
    pub source_id: String,
    pub canonical_url: String,
    /// `false` if this canonical URL was already known under a different
    /// (or the same) raw URL.
    pub is_new: bool,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalizes `raw_url` and assigns (or returns the existing)
    /// `source_id`. Single atomic operation via `DashMap::entry`.
    pub fn register(&self, raw_url: &str) -> Registered {
        let canonical = canonicalize(raw_url);
        let mut is_new = false;
        let id = self
            .by_canonical
            .entry(canonical.clone())
            .or_insert_with(|| {
                is_new = true;
                Arc::from(source_id_for(&canonical))
            })
            .clone();
        Registered { source_id: id.to_string(), canonical_url: canonical, is_new }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_canonical.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_canonical.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_scheme_and_host() {
        assert_eq!(canonicalize("HTTPS://Example.COM/Path"), "https://example.com/Path");
    }

    #[test]
    fn strips_www() {
        assert_eq!(canonicalize("https://www.example.com/x"), "https://example.com/x");
    }

    #[test]
    fn strips_default_ports() {
        assert_eq!(canonicalize("https://example.com:443/x"), "https://example.com/x");
        assert_eq!(canonicalize("http://example.com:80/x"), "http://example.com/x");
    }

    #[test]
    fn keeps_nondefault_ports() {
        assert_eq!(canonicalize("https://example.com:8443/x"), "https://example.com:8443/x");
    }

    #[test]
    fn drops_fragment() {
        assert_eq!(canonicalize("https://example.com/x#section"), "https://example.com/x");
    }

    #[test]
    fn sorts_query_params() {
        assert_eq!(
            canonicalize("https://example.com/x?b=2&a=1"),
            "https://example.com/x?a=1&b=2"
        );
    }

    #[test]
    fn strips_tracking_params() {
        assert_eq!(
            canonicalize("https://example.com/x?a=1&utm_source=tw&fbclid=abc&gclid=xyz&ref=home&ref_src=foo"),
            "https://example.com/x?a=1"
        );
    }

    #[test]
    fn strips_all_utm_variants() {
        assert_eq!(
            canonicalize("https://example.com/x?utm_medium=email&utm_campaign=x&utm_term=y&utm_content=z"),
            "https://example.com/x"
        );
    }

    #[test]
    fn idempotent() {
        let once = canonicalize("HTTPS://WWW.Example.com:443/Path?b=2&a=1&utm_source=x#frag");
        let twice = canonicalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn non_url_falls_back_gracefully() {
        let c = canonicalize("  not a url at all  ");
        assert_eq!(c, "not a url at all");
        // Still idempotent.
        assert_eq!(canonicalize(&c), c);
    }

    #[test]
    fn registry_insertion_is_idempotent() {
        let registry = SourceRegistry::new();
        let first = registry.register("https://example.com/a?utm_source=x");
        let second = registry.register("https://WWW.example.com/a");
        assert_eq!(first.source_id, second.source_id);
        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_distinct_urls_get_distinct_ids() {
        let registry = SourceRegistry::new();
        let a = registry.register("https://example.com/a");
        let b = registry.register("https://example.com/b");
        assert_ne!(a.source_id, b.source_id);
        assert_eq!(registry.len(), 2);
    }

    proptest::proptest! {
        #[test]
        fn canonicalize_is_idempotent_prop(
            scheme in proptest::sample::select(vec!["http", "https"]),
            host in "[a-z]{3,10}\\.(com|org|net)",
            path in "[a-z/]{0,10}",
        ) {
            let url = format!("{scheme}://{host}/{path}");
            let once = canonicalize(&url);
            let twice = canonicalize(&once);
            proptest::prop_assert_eq!(once, twice);
        }
    }
}
