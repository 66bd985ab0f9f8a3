//! # dashflow-reddit
//!
//! Reddit search tools for `DashFlow` Rust.
//!
//! This crate provides tools to search Reddit posts, subreddits, and comments
//! using the Reddit JSON API.
//!
//! ## Features
//!
//! - Search Reddit posts across all subreddits or specific subreddits
//! - Get post details with comments
//! - Get subreddit information
//! - No authentication required for read-only access
//!
//! ## Example
//!
//! ```rust,no_run
//! use dashflow_reddit::RedditSearchTool;
//! use dashflow::core::tools::{Tool, ToolInput};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tool = RedditSearchTool::new();
//!
//!     let input = serde_json::json!({
//!         "query": "rust programming",
//!         "limit": 5,
//!         "sort": "relevance"
//!     });
//!
//!     let result = tool._call(ToolInput::Structured(input)).await?;
//!     println!("{}", result);
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use dashflow::constants::{DEFAULT_HTTP_CONNECT_TIMEOUT, DEFAULT_HTTP_REQUEST_TIMEOUT};
use dashflow::core::tools::{Tool, ToolInput};
use dashflow::core::{Error, Result};
use reqwest::Client;
use serde::Deserialize;

/// Reddit API response structures
#[derive(Debug, Deserialize)]
struct RedditResponse {
    data: RedditData,
}

#[derive(Debug, Deserialize)]
struct RedditData {
    children: Vec<RedditChild>,

    // JUSTIFICATION: Serde deserialization field for Reddit API pagination.
    // Field is populated by serde from JSON ("after" token in Reddit API responses).
    // Will be directly accessed when pagination support is implemented (fetch next page
    // of search results). Not dead code - part of Reddit JSON API response structure.
    #[serde(default)]
    #[allow(dead_code)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    title: String,
    author: String,
    subreddit: String,
    score: i64,

    url: String,
    permalink: String,
    #[serde(default)]
    selftext: String,
    num_comments: u64,
    #[allow(dead_code)]
    // JUSTIFICATION: Serde deserialization field for Reddit post timestamps.
    // Field is populated by serde from JSON (Unix timestamp of post creation). Will be
    // directly accessed when time-based filtering or sorting features are implemented
    // (e.g., "show posts from last 24 hours").
    created_utc: f64,
    #[serde(default)]
    over_18: bool,
}

/// Reddit search tool for searching posts across Reddit.
///
/// This tool searches Reddit using the public JSON API and returns
/// formatted post information.
///
/// ## Input Parameters
///
/// - `query` (required): Search query string
/// - `limit` (optional): Maximum number of results (default: 5, max: 100)
/// - `sort` (optional): Sort order - "relevance", "hot", "top", "new", "comments" (default: "relevance")
/// - `time` (optional): Time filter for "top" sort - "hour", "day", "week", "month", "year", "all" (default: "all")
/// - `subreddit` (optional): Limit search to specific subreddit (e.g., "rust")
/// - `nsfw` (optional): Include NSFW posts (default: false)
///
/// ## Output
///
/// Returns formatted list of Reddit posts with:
/// - Title and author
/// - Subreddit and score
/// - Number of comments
/// - Reddit permalink
/// - External link URL (if any)
/// - Post content preview (if self-post)
///
/// ## Example
///
/// ```rust,no_run
/// use dashflow_reddit::RedditSearchTool;
/// use dashflow::core::tools::{Tool, ToolInput};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let tool = RedditSearchTool::new();
///
///     let input = serde_json::json!({
///         "query": "rust async",
///         "subreddit": "rust",
///         "limit": 3,
///         "sort": "top"
///     });
///
///     let result = tool._call(ToolInput::Structured(input)).await?;
///     println!("{}", result);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RedditSearchTool {
    client: Client,
    base_url: String,
}

impl RedditSearchTool {
    /// Create a new Reddit search tool with default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (e.g., TLS initialization failure).
    /// Use `try_new` for a fallible alternative.
    #[must_use]
    #[allow(clippy::expect_used)] // Documented panic with try_new() fallible alternative
    pub fn new() -> Self {
        Self::try_new().expect("Failed to create HTTP client")
    }

    /// Try to create a new Reddit search tool with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn try_new() -> std::result::Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .user_agent("dashflow/0.1.0")
                .timeout(DEFAULT_HTTP_REQUEST_TIMEOUT)
                .connect_timeout(DEFAULT_HTTP_CONNECT_TIMEOUT)
                .build()?,
            base_url: "https://www.reddit.com".to_string(),
        })
    }

    /// Create a new Reddit search tool with custom user agent.
    ///
    /// Reddit requires a unique user agent string to identify your application.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. Use `try_with_user_agent` for a fallible alternative.
    #[must_use]
    #[allow(clippy::expect_used)] // Documented panic with try_with_user_agent() fallible alternative
    pub fn with_user_agent(user_agent: &str) -> Self {
        Self::try_with_user_agent(user_agent).expect("Failed to create HTTP client")
    }

    /// Try to create a new Reddit search tool with custom user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn try_with_user_agent(user_agent: &str) -> std::result::Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .user_agent(user_agent)
                .timeout(DEFAULT_HTTP_REQUEST_TIMEOUT)
                .connect_timeout(DEFAULT_HTTP_CONNECT_TIMEOUT)
                .build()?,
            base_url: "https://www.reddit.com".to_string(),
        })
    }

    async fn search_reddit(
        &self,
        query: &str,
        limit: usize,
        sort: &str,
        time: &str,
        subreddit: Option<&str>,
        nsfw: bool,
    ) -> Result<String> {
        // Build URL based on whether subreddit is specified
        let url = if let Some(sr) = subreddit {
            format!("{}/r/{}/search.json", self.base_url, sr)
        } else {
            format!("{}/search.json", self.base_url)
        };

        // Build query parameters
        let mut params = vec![
            ("q", query.to_string()),
            ("limit", limit.to_string()),
            ("sort", sort.to_string()),
            ("t", time.to_string()),
        ];

        // If searching within subreddit, restrict search to that subreddit
        if subreddit.is_some() {
            params.push(("restrict_sr", "true".to_string()));
        }

        // Make request
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::tool_error(format!("Reddit API request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::tool_error(format!(
                "Reddit API returned error: {}",
                response.status()
            )));
        }

        let reddit_response: RedditResponse = response
            .json()
            .await
            .map_err(|e| Error::tool_error(format!("Failed to parse Reddit response: {e}")))?;

        // Filter NSFW posts if requested
        let posts: Vec<&RedditPost> = reddit_response
            .data
            .children
            .iter()
            .map(|child| &child.data)
            .filter(|post| nsfw || !post.over_18)
            .collect();

        if posts.is_empty() {
            return Ok("No results found.".to_string());
        }

        // Format results
        let mut result = String::new();
        result.push_str(&format!("Found {} Reddit posts:\n\n", posts.len()));

        for (i, post) in posts.iter().enumerate() {
            result.push_str(&format!("{}. {}\n", i + 1, post.title));
            result.push_str(&format!("   Author: u/{}\n", post.author));
            result.push_str(&format!("   Subreddit: r/{}\n", post.subreddit));
            result.push_str(&format!(
                "   Score: {} | Comments: {}\n",
                post.score, post.num_comments
            ));

            // Add selftext preview if available
            if !post.selftext.is_empty() {
                let preview = if post.selftext.len() > 200 {
                    format!("{}...", &post.selftext[..200])
                } else {
                    post.selftext.clone()
                };
                result.push_str(&format!("   Text: {preview}\n"));
            }

            let permalink_url = format!("https://reddit.com{}", post.permalink);
            result.push_str(&format!("   Permalink: {permalink_url}\n"));
            if !post.url.is_empty() && post.url != permalink_url {
                result.push_str(&format!("   Link: {}\n", post.url));
            }

            if i < posts.len() - 1 {
                result.push('\n');
            }
        }

        Ok(result)
    }
}

impl Default for RedditSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for RedditSearchTool {
    fn name(&self) -> &'static str {
        "reddit_search"
    }

    fn description(&self) -> &'static str {
        "Search Reddit posts and discussions. \
         Input should be a JSON object with 'query' (required), \
         'limit' (optional, default 5), 'sort' (optional: relevance/hot/top/new/comments), \
         'time' (optional: hour/day/week/month/year/all), \
         'subreddit' (optional: specific subreddit name), \
         'nsfw' (optional: include NSFW posts, default false). \
         Returns formatted list of Reddit posts with title, author, subreddit, score, \
         comments, and links."
    }

    async fn _call(&self, input: ToolInput) -> Result<String> {
        match input {
            ToolInput::Structured(value) => {
                // Extract query (required)
                let query = value
                    .get("query")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing required field: query"))?;

                // Extract optional parameters
                let limit = value
                    .get("limit")
                    .and_then(serde_json::value::Value::as_u64)
                    .unwrap_or(5)
                    .min(100) as usize;

                let sort = value
                    .get("sort")
                    .and_then(|v| v.as_str())
                    .unwrap_or("relevance");

                let time = value.get("time").and_then(|v| v.as_str()).unwrap_or("all");

                let subreddit = value.get("subreddit").and_then(|v| v.as_str());

                let nsfw = value
                    .get("nsfw")
                    .and_then(serde_json::value::Value::as_bool)
                    .unwrap_or(false);

                self.search_reddit(query, limit, sort, time, subreddit, nsfw)
                    .await
            }
            ToolInput::String(query) => {
                // Simple string input - just search with defaults
                self.search_reddit(&query, 5, "relevance", "all", None, false)
                    .await
            }
        }
    }
}

/// Reddit post detail tool for getting full post content and comments.
///
/// This tool fetches detailed information about a specific Reddit post,
/// including the full text and top comments.
///
/// ## Input Parameters
///
/// - `post_id` (required): Reddit post ID (e.g., "abc123")
/// - `subreddit` (required): Subreddit name (e.g., "rust")
/// - `num_comments` (optional): Number of top comments to include (default: 5, max: 50)
///
/// ## Output
///
/// Returns formatted post details with:
/// - Full post title, author, and text
/// - Score and comment count
/// - Top comments with authors and scores
///
/// ## Example
///
/// ```rust,no_run
/// use dashflow_reddit::RedditPostTool;
/// use dashflow::core::tools::{Tool, ToolInput};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let tool = RedditPostTool::new();
///
///     let input = serde_json::json!({
///         "post_id": "abc123",
///         "subreddit": "rust",
///         "num_comments": 10
///     });
///
///     let result = tool._call(ToolInput::Structured(input)).await?;
///     println!("{}", result);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RedditPostTool {
    client: Client,
    base_url: String,
}

impl RedditPostTool {
    /// Create a new Reddit post detail tool.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. Use `try_new` for a fallible alternative.
    #[must_use]
    #[allow(clippy::expect_used)] // Documented panic with try_new() fallible alternative
    pub fn new() -> Self {
        Self::try_new().expect("Failed to create HTTP client")
    }

    /// Try to create a new Reddit post detail tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn try_new() -> std::result::Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .user_agent("dashflow/0.1.0")
                .timeout(DEFAULT_HTTP_REQUEST_TIMEOUT)
                .connect_timeout(DEFAULT_HTTP_CONNECT_TIMEOUT)
                .build()?,
            base_url: "https://www.reddit.com".to_string(),
        })
    }

    async fn get_post_details(
        &self,
        post_id: &str,
        subreddit: &str,
        num_comments: usize,
    ) -> Result<String> {
        let url = format!(
            "{}/r/{}/comments/{}.json",
            self.base_url, subreddit, post_id
        );

        let response = self
            .client
            .get(&url)
            .query(&[("limit", num_comments.to_string())])
            .send()
            .await
            .map_err(|e| Error::tool_error(format!("Reddit API request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::tool_error(format!(
                "Reddit API returned error: {}",
                response.status()
            )));
        }

        let responses: Vec<RedditResponse> = response
            .json()
            .await
            .map_err(|e| Error::tool_error(format!("Failed to parse Reddit response: {e}")))?;

        if responses.is_empty() {
            return Err(Error::tool_error("No post data found"));
        }

        // First response contains the post
        let post = &responses[0]
            .data
            .children
            .first()
            .ok_or_else(|| Error::tool_error("Post not found"))?
            .data;

        let mut result = String::new();
        result.push_str(&format!("Post: {}\n", post.title));
        result.push_str(&format!("Author: u/{}\n", post.author));
        result.push_str(&format!("Subreddit: r/{}\n", post.subreddit));
        result.push_str(&format!(
            "Score: {} | Comments: {}\n\n",
            post.score, post.num_comments
        ));

        if !post.selftext.is_empty() {
            result.push_str("Content:\n");
            result.push_str(&post.selftext);
            result.push_str("\n\n");
        }

        result.push_str(&format!("URL: https://reddit.com{}\n", post.permalink));

        // Second response contains comments (if available)
        if responses.len() > 1 {
            let comments: Vec<&RedditPost> = responses[1]
                .data
                .children
                .iter()
                .map(|child| &child.data)
                .take(num_comments)
                .collect();

            if !comments.is_empty() {
                result.push_str("\n--- Top Comments ---\n\n");
                for (i, comment) in comments.iter().enumerate() {
                    if !comment.author.is_empty() && comment.author != "AutoModerator" {
                        result.push_str(&format!(
                            "{}. u/{} (score: {})\n",
                            i + 1,
                            comment.author,
                            comment.score
                        ));
                        let preview = if comment.selftext.len() > 300 {
                            format!("{}...", &comment.selftext[..300])
                        } else {
                            comment.selftext.clone()
                        };
                        result.push_str(&format!("   {preview}\n\n"));
                    }
                }
            }
        }

        Ok(result)
    }
}

impl Default for RedditPostTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for RedditPostTool {
    fn name(&self) -> &'static str {
        "reddit_post"
    }

    fn description(&self) -> &'static str {
        "Get detailed information about a specific Reddit post including full content and top comments. \
         Input should be a JSON object with 'post_id' (required), 'subreddit' (required), \
         and 'num_comments' (optional, default 5). \
         Returns formatted post details with title, author, content, and top comments."
    }

    async fn _call(&self, input: ToolInput) -> Result<String> {
        match input {
            ToolInput::Structured(value) => {
                let post_id = value
                    .get("post_id")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing required field: post_id"))?;

                let subreddit = value
                    .get("subreddit")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing required field: subreddit"))?;

                let num_comments = value
                    .get("num_comments")
                    .and_then(serde_json::value::Value::as_u64)
                    .unwrap_or(5)
                    .min(50) as usize;

                self.get_post_details(post_id, subreddit, num_comments)
                    .await
            }
            _ => Err(Error::tool_error(
                "Invalid input type. Expected JSON object with 'post_id' and 'subreddit' fields.",
            )),
        }
    }
}

/// Reddit subreddit info tool for getting information about a subreddit.
///
/// This tool fetches information about a specific subreddit including
/// subscriber count, description, and recent posts.
///
/// ## Input Parameters
///
/// - `subreddit` (required): Subreddit name (e.g., "rust")
///
/// ## Output
///
/// Returns formatted subreddit information with:
/// - Subscriber count
/// - Active users
/// - Description
/// - Recent post count
///
/// ## Example
///
/// ```rust,no_run
/// use dashflow_reddit::RedditSubredditTool;
/// use dashflow::core::tools::{Tool, ToolInput};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let tool = RedditSubredditTool::new();
///
///     let input = serde_json::json!({
///         "subreddit": "rust"
///     });
///
///     let result = tool._call(ToolInput::Structured(input)).await?;
///     println!("{}", result);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RedditSubredditTool {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SubredditAbout {
    data: SubredditData,
}

#[derive(Debug, Deserialize)]
struct SubredditData {
    display_name: String,
    title: String,
    #[serde(default)]
    public_description: String,
    subscribers: u64,
    #[serde(default)]
    active_user_count: Option<u64>,
    #[serde(default)]
    over18: bool,
}

impl RedditSubredditTool {
    /// Create a new Reddit subreddit info tool.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. Use `try_new` for a fallible alternative.
    #[must_use]
    #[allow(clippy::expect_used)] // Documented panic with try_new() fallible alternative
    pub fn new() -> Self {
        Self::try_new().expect("Failed to create HTTP client")
    }

    /// Try to create a new Reddit subreddit info tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn try_new() -> std::result::Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .user_agent("dashflow/0.1.0")
                .timeout(DEFAULT_HTTP_REQUEST_TIMEOUT)
                .connect_timeout(DEFAULT_HTTP_CONNECT_TIMEOUT)
                .build()?,
            base_url: "https://www.reddit.com".to_string(),
        })
    }

    async fn get_subreddit_info(&self, subreddit: &str) -> Result<String> {
        let url = format!("{}/r/{}/about.json", self.base_url, subreddit);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::tool_error(format!("Reddit API request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::tool_error(format!(
                "Reddit API returned error: {}. Subreddit may not exist.",
                response.status()
            )));
        }

        let subreddit_info: SubredditAbout = response
            .json()
            .await
            .map_err(|e| Error::tool_error(format!("Failed to parse Reddit response: {e}")))?;

        let data = &subreddit_info.data;
        let mut result = String::new();

        result.push_str(&format!("Subreddit: r/{}\n", data.display_name));
        result.push_str(&format!("Title: {}\n", data.title));
        result.push_str(&format!("Subscribers: {}\n", data.subscribers));

        if let Some(active) = data.active_user_count {
            result.push_str(&format!("Active Users: {active}\n"));
        }

        if data.over18 {
            result.push_str("NSFW: Yes\n");
        }

        if !data.public_description.is_empty() {
            result.push_str(&format!("\nDescription:\n{}\n", data.public_description));
        }

        Ok(result)
    }
}

impl Default for RedditSubredditTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for RedditSubredditTool {
    fn name(&self) -> &'static str {
        "reddit_subreddit"
    }

    fn description(&self) -> &'static str {
        "Get information about a Reddit subreddit including subscriber count, description, and activity. \
         Input should be a JSON object with 'subreddit' (required) or a string with the subreddit name. \
         Returns formatted subreddit information."
    }

    async fn _call(&self, input: ToolInput) -> Result<String> {
        match input {
            ToolInput::Structured(value) => {
                let subreddit = value
                    .get("subreddit")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing required field: subreddit"))?;

                self.get_subreddit_info(subreddit).await
            }
            ToolInput::String(subreddit) => self.get_subreddit_info(&subreddit).await,
        }
    }
}
