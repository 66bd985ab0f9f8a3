//! # Google Custom Search Integration for DashFlow
//!
//! This crate provides Google Custom Search API integration for `DashFlow` Rust,
//! allowing agents to search the web using Google's search engine.
//!
//! ## Features
//!
//! - Web search using Google Custom Search JSON API
//! - Configurable result count and search options
//! - Image search support
//! - Site restriction for targeted searches
//! - Retriever implementation for RAG chains
//!
//! ## Setup
//!
//! 1. Create a Google Cloud project at <https://console.cloud.google.com>
//! 2. Enable the Custom Search JSON API
//! 3. Create API credentials and get your API key
//! 4. Create a Programmable Search Engine at <https://programmablesearchengine.google.com>
//! 5. Get your Search Engine ID (cx parameter)
//!
//! ## Usage
//!
//! ### Web Search Tool
//!
//! ```rust,no_run
//! use dashflow_google_search::GoogleSearchTool;
//! use dashflow::core::tools::Tool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Set environment variables
//! std::env::set_var("GOOGLE_API_KEY", "your-api-key");
//! std::env::set_var("GOOGLE_CSE_ID", "your-search-engine-id");
//!
//! let google = GoogleSearchTool::new()?;
//!
//! let results = google._call_str("rust programming language".to_string()).await?;
//! println!("{}", results);
//! # Ok(())
//! # }
//! ```
//!
//! ### Retriever for RAG
//!
//! ```rust,no_run
//! use dashflow_google_search::GoogleSearchRetriever;
//! use dashflow::core::retrievers::Retriever;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! std::env::set_var("GOOGLE_API_KEY", "your-api-key");
//! std::env::set_var("GOOGLE_CSE_ID", "your-search-engine-id");
//!
//! let retriever = GoogleSearchRetriever::new()?;
//!
//! let docs = retriever._get_relevant_documents("machine learning tutorials", None).await?;
//!
//! for doc in docs {
//!     println!("Title: {}", doc.metadata.get("title").unwrap());
//!     println!("URL: {}", doc.metadata.get("link").unwrap());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variables
//!
//! - `GOOGLE_API_KEY`: Required. Your Google Cloud API key
//! - `GOOGLE_CSE_ID`: Required. Your Programmable Search Engine ID
//!
//! ## Python Baseline
//!
//! This crate implements functionality from:
//! - `dashflow_community.utilities.google_search` - Google Search utility
//! - `dashflow_community.tools.google_search` - Google Search tool
//!
//! # See Also
//!
//! - [`Tool`] - The trait this tool implements
//! - [`Retriever`] - The retriever trait
//! - [`dashflow-tavily`](https://docs.rs/dashflow-tavily) - Alternative: Tavily AI-optimized search
//! - [`dashflow-webscrape`](https://docs.rs/dashflow-webscrape) - Web content extraction tool
//! - [Google Custom Search API](https://developers.google.com/custom-search/v1/overview) - Official docs

use async_trait::async_trait;
use dashflow::core::config::RunnableConfig;
use dashflow::core::documents::Document;
use dashflow::core::http_client::{json_with_limit, SEARCH_RESPONSE_SIZE_LIMIT};
use dashflow::core::config_loader::env_vars::{env_string, GOOGLE_API_KEY, GOOGLE_CSE_ID};
use dashflow::core::retrievers::Retriever;
use dashflow::core::tools::{Tool, ToolInput};
use dashflow::core::Result;
use dashflow::{DEFAULT_HTTP_CONNECT_TIMEOUT, DEFAULT_HTTP_REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

/// Create an HTTP client with standard timeouts
fn create_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_REQUEST_TIMEOUT)
        .connect_timeout(DEFAULT_HTTP_CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

const GOOGLE_SEARCH_API_BASE: &str = "https://www.googleapis.com/customsearch/v1";

/// A single search result from Google
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSearchResult {
    /// Result title
    pub title: String,
    /// Result URL
    pub link: String,
    /// Snippet/description
    pub snippet: String,
    /// Display link
    pub display_link: String,
    /// HTML snippet (if available)
    pub html_snippet: Option<String>,
    /// Formatted URL
    pub formatted_url: Option<String>,
}

/// Search type for Google Custom Search
#[derive(Debug, Clone, Copy, Default)]
pub enum SearchType {
    /// Web search (default)
    #[default]
    Web,
    /// Image search
    Image,
}

impl SearchType {
    fn as_str(&self) -> &str {
        match self {
            SearchType::Web => "web",
            SearchType::Image => "image",
        }
    }
}

/// Safe search level
#[derive(Debug, Clone, Copy, Default)]
pub enum SafeSearchLevel {
    /// No filtering
    Off,
    /// Moderate filtering (default)
    #[default]
    Medium,
    /// Strict filtering
    High,
}

impl SafeSearchLevel {
    fn as_str(&self) -> &str {
        match self {
            SafeSearchLevel::Off => "off",
            SafeSearchLevel::Medium => "medium",
            SafeSearchLevel::High => "high",
        }
    }
}

/// Google Custom Search tool for DashFlow agents
///
/// Searches the web using Google's Custom Search JSON API.
///
/// # Environment Variables
///
/// - `GOOGLE_API_KEY`: Required. Your Google Cloud API key
/// - `GOOGLE_CSE_ID`: Required. Your Programmable Search Engine ID
///
/// # Example
///
/// ```rust,no_run
/// use dashflow_google_search::GoogleSearchTool;
/// use dashflow::core::tools::Tool;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// std::env::set_var("GOOGLE_API_KEY", "your-api-key");
/// std::env::set_var("GOOGLE_CSE_ID", "your-search-engine-id");
///
/// let google = GoogleSearchTool::builder()
///     .num_results(5)
///     .safe_search(dashflow_google_search::SafeSearchLevel::High)
///     .build()?;
///
/// let results = google._call_str("rust programming".to_string()).await?;
/// println!("{}", results);
/// # Ok(())
/// # }
/// ```
pub struct GoogleSearchTool {
    /// Google API key
    api_key: String,
    /// Custom Search Engine ID
    cse_id: String,
    /// Number of results to return
    num_results: usize,
    /// Search type (web or image)
    search_type: SearchType,
    /// Safe search level
    safe_search: SafeSearchLevel,
    /// Restrict to specific site (optional)
    site_restrict: Option<String>,
    /// Language restriction (e.g., "lang_en")
    language: Option<String>,
    /// Country restriction (e.g., "countryUS")
    country: Option<String>,
    /// HTTP client
    client: reqwest::Client,
}

impl GoogleSearchTool {
    /// Create a new Google Search tool
    ///
    /// Reads API key and CSE ID from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are not set.
    pub fn new() -> Result<Self> {
        let api_key = env_string(GOOGLE_API_KEY).ok_or_else(|| {
            dashflow::core::Error::tool_error(format!(
                "{GOOGLE_API_KEY} environment variable not set. \
                Get your API key from https://console.cloud.google.com/",
            ))
        })?;

        let cse_id = env_string(GOOGLE_CSE_ID).ok_or_else(|| {
            dashflow::core::Error::tool_error(format!(
                "{GOOGLE_CSE_ID} environment variable not set. \
                Create a search engine at https://programmablesearchengine.google.com/",
            ))
        })?;

        Ok(Self {
            api_key,
            cse_id,
            num_results: 5,
            search_type: SearchType::default(),
            safe_search: SafeSearchLevel::default(),
            site_restrict: None,
            language: None,
            country: None,
            client: create_http_client(),
        })
    }

    /// Create a new Google Search tool with explicit credentials
    #[must_use]
    pub fn with_credentials(api_key: String, cse_id: String) -> Self {
        Self {
            api_key,
            cse_id,
            num_results: 5,
            search_type: SearchType::default(),
            safe_search: SafeSearchLevel::default(),
            site_restrict: None,
            language: None,
            country: None,
            client: create_http_client(),
        }
    }

    /// Create a builder for `GoogleSearchTool`
    pub fn builder() -> GoogleSearchToolBuilder {
        GoogleSearchToolBuilder::default()
    }

    /// Set the number of results to return
    #[must_use]
    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results.min(10); // Google API max is 10 per request
        self
    }

    /// Set the search type
    #[must_use]
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    /// Set the safe search level
    #[must_use]
    pub fn with_safe_search(mut self, level: SafeSearchLevel) -> Self {
        self.safe_search = level;
        self
    }

    /// Restrict search to a specific site
    #[must_use]
    pub fn with_site_restrict(mut self, site: String) -> Self {
        self.site_restrict = Some(site);
        self
    }

    /// Search Google and return results
    pub async fn search(&self, query: &str) -> Result<Vec<GoogleSearchResult>> {
        let mut url = format!(
            "{}?key={}&cx={}&q={}&num={}&safe={}",
            GOOGLE_SEARCH_API_BASE,
            self.api_key,
            self.cse_id,
            urlencoding::encode(query),
            self.num_results,
            self.safe_search.as_str()
        );

        // Add search type for image search
        if matches!(self.search_type, SearchType::Image) {
            url.push_str(&format!("&searchType={}", self.search_type.as_str()));
        }

        // Add site restriction if set
        if let Some(site) = &self.site_restrict {
            url.push_str(&format!("&siteSearch={}", urlencoding::encode(site)));
        }

        // Add language restriction if set
        if let Some(lang) = &self.language {
            url.push_str(&format!("&lr={}", urlencoding::encode(lang)));
        }

        // Add country restriction if set
        if let Some(country) = &self.country {
            url.push_str(&format!("&cr={}", urlencoding::encode(country)));
        }

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                dashflow::core::Error::http(format!("Google API request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(dashflow::core::Error::tool_error(format!(
                "Google API error ({}): {}",
                status, body
            )));
        }

        // M-216: Use size-limited JSON parsing to prevent memory exhaustion
        let data: serde_json::Value = json_with_limit(response, SEARCH_RESPONSE_SIZE_LIMIT)
            .await
            .map_err(|e| {
                dashflow::core::Error::tool_error(format!(
                    "Failed to parse Google API response: {e}"
                ))
            })?;

        // Check for API errors in the response
        if let Some(error) = data.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            return Err(dashflow::core::Error::tool_error(format!(
                "Google API error: {message}"
            )));
        }

        let items = data.get("items").and_then(|i| i.as_array());

        let results = items
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let title = item.get("title")?.as_str()?.to_string();
                        let link = item.get("link")?.as_str()?.to_string();
                        let snippet = item
                            .get("snippet")
                            .and_then(|s| s.as_str())
                            .unwrap_or("")
                            .to_string();
                        let display_link = item
                            .get("displayLink")
                            .and_then(|d| d.as_str())
                            .unwrap_or("")
                            .to_string();
                        let html_snippet = item
                            .get("htmlSnippet")
                            .and_then(|h| h.as_str())
                            .map(|s| s.to_string());
                        let formatted_url = item
                            .get("formattedUrl")
                            .and_then(|f| f.as_str())
                            .map(|s| s.to_string());

                        Some(GoogleSearchResult {
                            title,
                            link,
                            snippet,
                            display_link,
                            html_snippet,
                            formatted_url,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(results)
    }

    /// Format search results as a human-readable string
    fn format_results(&self, results: &[GoogleSearchResult], query: &str) -> String {
        if results.is_empty() {
            return format!("No results found for query: {query}");
        }

        let mut output = format!("Found {} results for query: {}\n\n", results.len(), query);

        for (i, result) in results.iter().enumerate() {
            output.push_str(&format!("Result {}:\n", i + 1));
            output.push_str(&format!("Title: {}\n", result.title));
            output.push_str(&format!("URL: {}\n", result.link));
            output.push_str(&format!("Snippet: {}\n", result.snippet));
            output.push('\n');
        }

        output
    }
}

#[async_trait]
impl Tool for GoogleSearchTool {
    fn name(&self) -> &'static str {
        "google_search"
    }

    fn description(&self) -> &'static str {
        "Search the web using Google. Returns titles, URLs, and snippets from search results. \
         Best for finding information on any topic, getting current information, \
         researching products, finding documentation, and general knowledge queries. \
         Input should be a search query (e.g., 'rust async programming', 'best pizza near me')."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
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

        let results = self.search(&query).await?;
        Ok(self.format_results(&results, &query))
    }
}

/// Builder for `GoogleSearchTool`
#[derive(Default)]
pub struct GoogleSearchToolBuilder {
    api_key: Option<String>,
    cse_id: Option<String>,
    num_results: Option<usize>,
    search_type: Option<SearchType>,
    safe_search: Option<SafeSearchLevel>,
    site_restrict: Option<String>,
    language: Option<String>,
    country: Option<String>,
}

impl GoogleSearchToolBuilder {
    /// Set the API key
    #[must_use]
    pub fn api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the Custom Search Engine ID
    #[must_use]
    pub fn cse_id(mut self, cse_id: String) -> Self {
        self.cse_id = Some(cse_id);
        self
    }

    /// Set the number of results to return (max 10)
    #[must_use]
    pub fn num_results(mut self, num_results: usize) -> Self {
        self.num_results = Some(num_results.min(10));
        self
    }

    /// Set the search type
    #[must_use]
    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    /// Set the safe search level
    #[must_use]
    pub fn safe_search(mut self, level: SafeSearchLevel) -> Self {
        self.safe_search = Some(level);
        self
    }

    /// Restrict search to a specific site
    #[must_use]
    pub fn site_restrict(mut self, site: String) -> Self {
        self.site_restrict = Some(site);
        self
    }

    /// Set language restriction (e.g., "lang_en")
    #[must_use]
    pub fn language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }

    /// Set country restriction (e.g., "countryUS")
    #[must_use]
    pub fn country(mut self, country: String) -> Self {
        self.country = Some(country);
        self
    }

    /// Build the `GoogleSearchTool`
    ///
    /// # Errors
    ///
    /// Returns an error if API key or CSE ID are not provided and not in environment.
    pub fn build(self) -> Result<GoogleSearchTool> {
        let api_key = self
            .api_key
            .or_else(|| env_string(GOOGLE_API_KEY))
            .ok_or_else(|| {
                dashflow::core::Error::tool_error(format!(
                    "{GOOGLE_API_KEY} not provided. Set it via builder or environment variable."
                ))
            })?;

        let cse_id = self
            .cse_id
            .or_else(|| env_string(GOOGLE_CSE_ID))
            .ok_or_else(|| {
                dashflow::core::Error::tool_error(format!(
                    "{GOOGLE_CSE_ID} not provided. Set it via builder or environment variable."
                ))
            })?;

        Ok(GoogleSearchTool {
            api_key,
            cse_id,
            num_results: self.num_results.unwrap_or(5).min(10),
            search_type: self.search_type.unwrap_or_default(),
            safe_search: self.safe_search.unwrap_or_default(),
            site_restrict: self.site_restrict,
            language: self.language,
            country: self.country,
            client: create_http_client(),
        })
    }
}

/// Google Search retriever for document retrieval
///
/// Wraps `GoogleSearchTool` and converts search results into Documents
/// suitable for use in retrieval chains and RAG applications.
///
/// # Example
///
/// ```rust,no_run
/// use dashflow_google_search::GoogleSearchRetriever;
/// use dashflow::core::retrievers::Retriever;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// std::env::set_var("GOOGLE_API_KEY", "your-api-key");
/// std::env::set_var("GOOGLE_CSE_ID", "your-search-engine-id");
///
/// let retriever = GoogleSearchRetriever::builder()
///     .num_results(5)
///     .build()?;
///
/// let docs = retriever._get_relevant_documents("rust programming", None).await?;
/// # Ok(())
/// # }
/// ```
pub struct GoogleSearchRetriever {
    /// Internal search tool
    tool: GoogleSearchTool,
}

impl GoogleSearchRetriever {
    /// Create a new `GoogleSearchRetriever`
    ///
    /// Reads credentials from environment variables.
    pub fn new() -> Result<Self> {
        Ok(Self {
            tool: GoogleSearchTool::new()?,
        })
    }

    /// Create a new `GoogleSearchRetriever` with explicit credentials
    #[must_use]
    pub fn with_credentials(api_key: String, cse_id: String) -> Self {
        Self {
            tool: GoogleSearchTool::with_credentials(api_key, cse_id),
        }
    }

    /// Create a builder for `GoogleSearchRetriever`
    pub fn builder() -> GoogleSearchRetrieverBuilder {
        GoogleSearchRetrieverBuilder::default()
    }

    /// Convert `GoogleSearchResult` to Document
    fn result_to_document(result: &GoogleSearchResult) -> Document {
        let mut metadata = HashMap::new();

        metadata.insert(
            "source".to_string(),
            serde_json::Value::String(result.link.clone()),
        );
        metadata.insert(
            "title".to_string(),
            serde_json::Value::String(result.title.clone()),
        );
        metadata.insert(
            "link".to_string(),
            serde_json::Value::String(result.link.clone()),
        );
        metadata.insert(
            "display_link".to_string(),
            serde_json::Value::String(result.display_link.clone()),
        );

        if let Some(formatted_url) = &result.formatted_url {
            metadata.insert(
                "formatted_url".to_string(),
                serde_json::Value::String(formatted_url.clone()),
            );
        }

        // Page content is the snippet
        let page_content = format!("{}\n\n{}", result.title, result.snippet);

        Document {
            page_content,
            metadata,
            id: Some(result.link.clone()),
        }
    }
}

#[async_trait]
impl Retriever for GoogleSearchRetriever {
    async fn _get_relevant_documents(
        &self,
        query: &str,
        _config: Option<&RunnableConfig>,
    ) -> Result<Vec<Document>> {
        let results = self.tool.search(query).await?;

        Ok(results.iter().map(Self::result_to_document).collect())
    }
}

/// Builder for `GoogleSearchRetriever`
#[derive(Default)]
pub struct GoogleSearchRetrieverBuilder {
    api_key: Option<String>,
    cse_id: Option<String>,
    num_results: Option<usize>,
    search_type: Option<SearchType>,
    safe_search: Option<SafeSearchLevel>,
    site_restrict: Option<String>,
}

impl GoogleSearchRetrieverBuilder {
    /// Set the API key
    #[must_use]
    pub fn api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the Custom Search Engine ID
    #[must_use]
    pub fn cse_id(mut self, cse_id: String) -> Self {
        self.cse_id = Some(cse_id);
        self
    }

    /// Set the number of results
    #[must_use]
    pub fn num_results(mut self, num_results: usize) -> Self {
        self.num_results = Some(num_results);
        self
    }

    /// Set the search type
    #[must_use]
    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    /// Set the safe search level
    #[must_use]
    pub fn safe_search(mut self, level: SafeSearchLevel) -> Self {
        self.safe_search = Some(level);
        self
    }

    /// Restrict search to a specific site
    #[must_use]
    pub fn site_restrict(mut self, site: String) -> Self {
        self.site_restrict = Some(site);
        self
    }

    /// Build the `GoogleSearchRetriever`
    pub fn build(self) -> Result<GoogleSearchRetriever> {
        let mut builder = GoogleSearchToolBuilder::default();

        if let Some(api_key) = self.api_key {
            builder = builder.api_key(api_key);
        }
        if let Some(cse_id) = self.cse_id {
            builder = builder.cse_id(cse_id);
        }
        if let Some(num_results) = self.num_results {
            builder = builder.num_results(num_results);
        }
        if let Some(search_type) = self.search_type {
            builder = builder.search_type(search_type);
        }
        if let Some(safe_search) = self.safe_search {
            builder = builder.safe_search(safe_search);
        }
        if let Some(site) = self.site_restrict {
            builder = builder.site_restrict(site);
        }

        Ok(GoogleSearchRetriever {
            tool: builder.build()?,
        })
    }
}
