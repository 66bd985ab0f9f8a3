//! # Google Serper Tool
//!
//! Google Serper API integration for `DashFlow`. Provides fast, affordable access to Google
//! search results through the Serper.dev API.
//!
//! ## Features
//!
//! - Fast Google search results via Serper.dev
//! - Affordable pricing (cheaper than official Google API)
//! - Multiple search types: web, images, news, places
//! - Rich snippets and knowledge graphs
//! - No rate limiting on paid plans
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dashflow_serper::SerperTool;
//! use dashflow::core::tools::Tool;
//!
//! # tokio_test::block_on(async {
//! let serper = SerperTool::new("YOUR_API_KEY");
//!
//! // Simple search
//! let results = serper._call_str("What is deep learning?".to_string()).await.unwrap();
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

/// Search type for Serper API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Web search (default)
    #[default]
    Search,
    /// News search
    News,
    /// Image search
    Images,
    /// Video search
    Videos,
    /// Places search
    Places,
}

/// A single organic search result from Serper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerperOrganic {
    /// Page title
    pub title: String,
    /// Page URL
    pub link: String,
    /// Content snippet
    pub snippet: String,
    /// Position in results
    pub position: u32,
    /// Sitelinks (sub-pages)
    #[serde(default)]
    pub sitelinks: Option<Vec<SerperSitelink>>,
}

/// Sitelink to a sub-page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerperSitelink {
    /// Link title
    pub title: String,
    /// Link URL
    pub link: String,
}

/// Knowledge graph result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerperKnowledgeGraph {
    /// Title
    pub title: String,
    /// Type (e.g., "Person", "Organization")
    #[serde(rename = "type")]
    pub result_type: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Website
    pub website: Option<String>,
}

/// Search parameters for Serper API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerperSearchParams {
    /// Search query
    pub q: String,
    /// Number of results (default: 10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,
    /// Geographic location (e.g., "United States", "us")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gl: Option<String>,
    /// Language (e.g., "en", "es")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hl: Option<String>,
}

/// Response from Serper search API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerperSearchResponse {
    /// Organic search results
    #[serde(default)]
    pub organic: Vec<SerperOrganic>,
    /// Knowledge graph (if present)
    #[serde(default)]
    pub knowledge_graph: Option<SerperKnowledgeGraph>,
    /// Answer box (direct answer)
    #[serde(default)]
    pub answer_box: Option<serde_json::Value>,
    /// Related searches
    #[serde(default)]
    pub related_searches: Option<Vec<serde_json::Value>>,
}

/// Google Serper search tool for `DashFlow` agents
///
/// This tool provides access to Google search results through the Serper.dev API,
/// which is faster and more affordable than the official Google Search API.
///
/// # Example
///
/// ```rust,no_run
/// use dashflow_serper::SerperTool;
/// use dashflow::core::tools::Tool;
///
/// # tokio_test::block_on(async {
/// let serper = SerperTool::builder()
///     .api_key("YOUR_API_KEY")
///     .num_results(10)
///     .location("United States")
///     .language("en")
///     .build()
///     .unwrap();
///
/// let results = serper._call_str("latest AI developments".to_string())
///     .await
///     .unwrap();
/// println!("Found: {}", results);
/// # });
/// ```
#[derive(Debug)]
pub struct SerperTool {
    api_key: String,
    num_results: u32,
    location: Option<String>,
    language: Option<String>,
    search_type: SearchType,
    client: reqwest::Client,
}

impl SerperTool {
    /// Create a new Serper search tool
    ///
    /// # Arguments
    ///
    /// * `api_key` - Your Serper API key (X-API-KEY)
    ///
    /// # Example
    ///
    /// ```rust
    /// use dashflow_serper::SerperTool;
    ///
    /// let serper = SerperTool::new("YOUR_API_KEY");
    /// ```
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            num_results: 10,
            location: None,
            language: None,
            search_type: SearchType::Search,
            client: create_http_client(),
        }
    }

    /// Create a builder for `SerperTool`
    #[must_use]
    pub fn builder() -> SerperToolBuilder {
        SerperToolBuilder::default()
    }

    /// Perform a search using the Serper API
    async fn search(&self, query: String) -> Result<SerperSearchResponse> {
        let endpoint = match self.search_type {
            SearchType::Search => "https://google.serper.dev/search",
            SearchType::News => "https://google.serper.dev/news",
            SearchType::Images => "https://google.serper.dev/images",
            SearchType::Videos => "https://google.serper.dev/videos",
            SearchType::Places => "https://google.serper.dev/places",
        };

        let params = SerperSearchParams {
            q: query,
            num: Some(self.num_results),
            gl: self.location.clone(),
            hl: self.language.clone(),
        };

        let response = self
            .client
            .post(endpoint)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&params)
            .send()
            .await
            .map_err(|e| {
                dashflow::core::Error::tool_error(format!("Serper API request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(dashflow::core::Error::tool_error(format!(
                "Serper API error ({status}): {error_text}"
            )));
        }

        // M-216: Use size-limited JSON parsing to prevent memory exhaustion
        let search_response: SerperSearchResponse =
            json_with_limit(response, SEARCH_RESPONSE_SIZE_LIMIT).await.map_err(|e| {
                dashflow::core::Error::tool_error(format!("Failed to parse Serper response: {e}"))
            })?;

        Ok(search_response)
    }

    /// Format search results as a string
    fn format_results(&self, response: SerperSearchResponse) -> String {
        let mut output = String::new();

        // Include knowledge graph if present
        if let Some(kg) = response.knowledge_graph {
            output.push_str("Knowledge Graph:\n");
            output.push_str(&format!("  Title: {}\n", kg.title));
            if let Some(result_type) = kg.result_type {
                output.push_str(&format!("  Type: {result_type}\n"));
            }
            if let Some(description) = kg.description {
                output.push_str(&format!("  Description: {description}\n"));
            }
            if let Some(website) = kg.website {
                output.push_str(&format!("  Website: {website}\n"));
            }
            output.push('\n');
        }

        // Include answer box if present
        if let Some(answer) = response.answer_box {
            output.push_str("Answer Box:\n");
            output.push_str(&format!("  {answer}\n\n"));
        }

        // Include organic results
        if response.organic.is_empty() {
            output.push_str("No results found.");
            return output;
        }

        output.push_str(&format!("Found {} results:\n\n", response.organic.len()));

        for result in &response.organic {
            output.push_str(&format!("{}. {}\n", result.position, result.title));
            output.push_str(&format!("   URL: {}\n", result.link));

            // Truncate snippet to 250 chars
            let snippet = if result.snippet.len() > 250 {
                format!("{}...", &result.snippet[..250])
            } else {
                result.snippet.clone()
            };
            output.push_str(&format!("   Snippet: {snippet}\n"));

            // Include sitelinks if present
            if let Some(sitelinks) = &result.sitelinks {
                if !sitelinks.is_empty() {
                    output.push_str("   Sitelinks:\n");
                    for (i, sitelink) in sitelinks.iter().take(3).enumerate() {
                        output.push_str(&format!(
                            "     {}: {} ({})\n",
                            i + 1,
                            sitelink.title,
                            sitelink.link
                        ));
                    }
                }
            }

            output.push('\n');
        }

        output
    }
}

#[async_trait]
impl Tool for SerperTool {
    fn name(&self) -> &'static str {
        "serper_search"
    }

    fn description(&self) -> &'static str {
        "Search Google using the Serper.dev API. \
         Fast and affordable access to Google search results with knowledge graphs, \
         answer boxes, and rich snippets. Returns comprehensive web search results \
         from Google's index. Best for general Google search queries."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to execute on Google"
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

/// Builder for `SerperTool`
#[derive(Default)]
pub struct SerperToolBuilder {
    api_key: Option<String>,
    num_results: Option<u32>,
    location: Option<String>,
    language: Option<String>,
    search_type: Option<SearchType>,
}

impl SerperToolBuilder {
    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the maximum number of results (1-100)
    #[must_use]
    pub fn num_results(mut self, num: u32) -> Self {
        self.num_results = Some(num.clamp(1, 100));
        self
    }

    /// Set the geographic location (e.g., "United States", "us")
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the language (e.g., "en", "es", "fr")
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the search type (search, news, images, videos, places)
    #[must_use]
    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    /// Build the `SerperTool`
    pub fn build(self) -> Result<SerperTool> {
        let api_key = self.api_key.ok_or_else(|| {
            dashflow::core::Error::tool_error("API key is required for Serper search".to_string())
        })?;

        Ok(SerperTool {
            api_key,
            num_results: self.num_results.unwrap_or(10),
            location: self.location,
            language: self.language,
            search_type: self.search_type.unwrap_or_default(),
            client: create_http_client(),
        })
    }
}
