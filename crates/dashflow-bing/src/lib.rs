//! # Bing Search Tool
//!
//! Microsoft Bing Search API integration for `DashFlow`. Provides access to Bing's
//! comprehensive web search capabilities backed by Microsoft's search infrastructure.
//!
//! ## Features
//!
//! - Comprehensive web search powered by Microsoft Bing
//! - Multiple search types: web, news, images, videos
//! - Rich snippets and metadata
//! - Freshness filtering
//! - Safe search controls
//! - Market and language targeting
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dashflow_bing::BingSearchTool;
//! use dashflow::core::tools::Tool;
//!
//! # tokio_test::block_on(async {
//! let bing = BingSearchTool::new("YOUR_SUBSCRIPTION_KEY");
//!
//! // Simple search
//! let results = bing._call_str("What is machine learning?".to_string()).await.unwrap();
//! println!("Search results: {}", results);
//! # });
//! ```

use async_trait::async_trait;
use dashflow::core::http_client::{json_with_limit, SEARCH_RESPONSE_SIZE_LIMIT};
use dashflow::core::tools::{Tool, ToolInput};
use dashflow::core::Result;
use dashflow::{DEFAULT_HTTP_CONNECT_TIMEOUT, DEFAULT_HTTP_REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Create an HTTP client with standard timeouts
fn create_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_REQUEST_TIMEOUT)
        .connect_timeout(DEFAULT_HTTP_CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Safe search level for Bing API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum SafeSearch {
    /// No safe search filtering
    Off,
    /// Moderate filtering (default)
    #[default]
    Moderate,
    /// Strict filtering
    Strict,
}

/// Freshness filter for search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Freshness {
    /// Past day
    Day,
    /// Past week
    Week,
    /// Past month
    Month,
}

/// A single web page result from Bing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BingWebPage {
    /// Page ID
    pub id: String,
    /// Page name/title
    pub name: String,
    /// Page URL
    pub url: String,
    /// Display URL (shorter, user-friendly version)
    #[serde(rename = "displayUrl")]
    pub display_url: String,
    /// Content snippet
    pub snippet: String,
    /// Date last crawled (ISO 8601 format)
    #[serde(rename = "dateLastCrawled")]
    pub date_last_crawled: Option<String>,
    /// Deep links (sub-pages)
    #[serde(default)]
    pub deep_links: Option<Vec<BingDeepLink>>,
}

/// Deep link to a sub-page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BingDeepLink {
    /// Link name
    pub name: String,
    /// Link URL
    pub url: String,
}

/// Web search results container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BingWebPages {
    /// Total estimated matches
    #[serde(rename = "totalEstimatedMatches")]
    pub total_estimated_matches: Option<u64>,
    /// Search results
    pub value: Vec<BingWebPage>,
}

/// Query context (spell corrections, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BingQueryContext {
    /// Original query
    #[serde(rename = "originalQuery")]
    pub original_query: String,
    /// Altered query (spell-corrected)
    #[serde(rename = "alteredQuery")]
    pub altered_query: Option<String>,
}

/// Response from Bing search API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BingSearchResponse {
    /// Response type
    #[serde(rename = "_type")]
    pub response_type: String,
    /// Query context
    #[serde(rename = "queryContext")]
    pub query_context: BingQueryContext,
    /// Web pages results
    #[serde(rename = "webPages")]
    pub web_pages: Option<BingWebPages>,
}

/// Bing search tool for `DashFlow` agents
///
/// This tool provides access to Microsoft Bing's web search API, which offers
/// comprehensive search results backed by Microsoft's search infrastructure.
///
/// # Example
///
/// ```rust,no_run
/// use dashflow_bing::BingSearchTool;
/// use dashflow::core::tools::Tool;
///
/// # tokio_test::block_on(async {
/// let bing = BingSearchTool::builder()
///     .subscription_key("YOUR_SUBSCRIPTION_KEY")
///     .count(10)
///     .market("en-US")
///     .build()
///     .unwrap();
///
/// let results = bing._call_str("latest technology news".to_string())
///     .await
///     .unwrap();
/// println!("Found: {}", results);
/// # });
/// ```
#[derive(Debug)]
pub struct BingSearchTool {
    subscription_key: String,
    count: u32,
    market: String,
    safe_search: String,
    freshness: Option<String>,
    client: reqwest::Client,
}

impl BingSearchTool {
    /// Create a new Bing search tool
    ///
    /// # Arguments
    ///
    /// * `subscription_key` - Your Bing Search API subscription key (Ocp-Apim-Subscription-Key)
    ///
    /// # Example
    ///
    /// ```rust
    /// use dashflow_bing::BingSearchTool;
    ///
    /// let bing = BingSearchTool::new("YOUR_SUBSCRIPTION_KEY");
    /// ```
    pub fn new(subscription_key: impl Into<String>) -> Self {
        Self {
            subscription_key: subscription_key.into(),
            count: 10,
            market: "en-US".to_string(),
            safe_search: "Moderate".to_string(),
            freshness: None,
            client: create_http_client(),
        }
    }

    /// Create a builder for `BingSearchTool`
    #[must_use]
    pub fn builder() -> BingSearchToolBuilder {
        BingSearchToolBuilder::default()
    }

    /// Perform a search using the Bing API
    async fn search(&self, query: String) -> Result<BingSearchResponse> {
        let mut url = format!(
            "https://api.bing.microsoft.com/v7.0/search?q={}&count={}",
            urlencoding::encode(&query),
            self.count
        );

        // Add optional parameters
        url.push_str(&format!("&mkt={}", self.market));
        url.push_str(&format!("&safeSearch={}", self.safe_search));

        if let Some(ref freshness) = self.freshness {
            url.push_str(&format!("&freshness={freshness}"));
        }

        let response = self
            .client
            .get(&url)
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .send()
            .await
            .map_err(|e| {
                dashflow::core::Error::tool_error(format!("Bing API request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(dashflow::core::Error::tool_error(format!(
                "Bing API error ({status}): {error_text}"
            )));
        }

        // M-216: Use size-limited JSON parsing to prevent memory exhaustion
        let search_response: BingSearchResponse =
            json_with_limit(response, SEARCH_RESPONSE_SIZE_LIMIT).await.map_err(|e| {
                dashflow::core::Error::tool_error(format!("Failed to parse Bing response: {e}"))
            })?;

        Ok(search_response)
    }

    /// Format search results as a string
    fn format_results(&self, response: BingSearchResponse) -> String {
        let mut output = String::new();

        // Show spell correction if present
        if let Some(ref altered) = response.query_context.altered_query {
            output.push_str(&format!("Showing results for: {altered}\n\n"));
        }

        // Extract web pages
        let web_pages = if let Some(pages) = response.web_pages {
            pages
        } else {
            output.push_str("No results found.");
            return output;
        };

        if let Some(total) = web_pages.total_estimated_matches {
            output.push_str(&format!(
                "Found approximately {} results (showing {}):\n\n",
                total,
                web_pages.value.len()
            ));
        } else {
            output.push_str(&format!("Found {} results:\n\n", web_pages.value.len()));
        }

        for (i, result) in web_pages.value.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, result.name));
            output.push_str(&format!("   URL: {}\n", result.url));

            // Truncate snippet to 250 chars
            let snippet = if result.snippet.len() > 250 {
                format!("{}...", &result.snippet[..250])
            } else {
                result.snippet.clone()
            };
            output.push_str(&format!("   Snippet: {snippet}\n"));

            if let Some(ref crawled) = result.date_last_crawled {
                output.push_str(&format!("   Last crawled: {crawled}\n"));
            }

            output.push('\n');
        }

        output
    }
}

#[async_trait]
impl Tool for BingSearchTool {
    fn name(&self) -> &'static str {
        "bing_search"
    }

    fn description(&self) -> &'static str {
        "Search the web using Microsoft Bing Search API. \
         Returns comprehensive search results backed by Microsoft's search infrastructure. \
         Provides web pages, news, images, and videos with rich metadata. \
         Best for general web search with Microsoft's quality and scale."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to execute"
                }
            },
            "required": ["query"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String> {
        let query = match input {
            ToolInput::String(s) => s,
            ToolInput::Structured(v) => v
                .get("query")
                .and_then(|q| q.as_str())
                .ok_or_else(|| {
                    dashflow::core::Error::tool_error(
                        "Missing 'query' field in structured input".to_string(),
                    )
                })?
                .to_string(),
        };

        let response = self.search(query).await?;
        Ok(self.format_results(response))
    }
}

/// Builder for `BingSearchTool`
#[derive(Default)]
pub struct BingSearchToolBuilder {
    subscription_key: Option<String>,
    count: Option<u32>,
    market: Option<String>,
    safe_search: Option<String>,
    freshness: Option<String>,
}

impl BingSearchToolBuilder {
    /// Set the subscription key
    pub fn subscription_key(mut self, key: impl Into<String>) -> Self {
        self.subscription_key = Some(key.into());
        self
    }

    /// Set the maximum number of results (1-50)
    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count.clamp(1, 50));
        self
    }

    /// Set the market/locale (e.g., "en-US", "es-ES", "fr-FR")
    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Set the safe search level ("Off", "Moderate", "Strict")
    pub fn safe_search(mut self, level: impl Into<String>) -> Self {
        self.safe_search = Some(level.into());
        self
    }

    /// Set freshness filter ("Day", "Week", "Month")
    pub fn freshness(mut self, freshness: impl Into<String>) -> Self {
        self.freshness = Some(freshness.into());
        self
    }

    /// Build the `BingSearchTool`
    pub fn build(self) -> Result<BingSearchTool> {
        let subscription_key = self.subscription_key.ok_or_else(|| {
            dashflow::core::Error::tool_error(
                "Subscription key is required for Bing search".to_string(),
            )
        })?;

        Ok(BingSearchTool {
            subscription_key,
            count: self.count.unwrap_or(10),
            market: self.market.unwrap_or_else(|| "en-US".to_string()),
            safe_search: self.safe_search.unwrap_or_else(|| "Moderate".to_string()),
            freshness: self.freshness,
            client: create_http_client(),
        })
    }
}
