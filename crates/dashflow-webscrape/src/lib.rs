//! # Web Scraping Tools
//!
//! Tools for extracting content from web pages, including text, links, and structured data.
//!
//! ## Features
//!
//! - Extract clean text from HTML pages
//! - Extract all links from a page
//! - Filter content by CSS selectors
//! - Remove scripts, styles, and other non-content elements
//! - Handle relative URLs
//!
//! ## Usage
//!
//! ```no_run
//! use dashflow_webscrape::WebScrapeTool;
//! use dashflow::core::tools::Tool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scraper = WebScrapeTool::new();
//!
//! // Scrape a web page
//! let content = scraper._call_str("https://example.com".to_string()).await?;
//! println!("Page content: {}", content);
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Tool`] - The trait this implements
//! - [`dashflow-tavily`](https://docs.rs/dashflow-tavily) - AI-optimized search with built-in summarization
//! - [`dashflow-google-search`](https://docs.rs/dashflow-google-search) - Google Custom Search for web queries
//! - [`dashflow-file-tool`](https://docs.rs/dashflow-file-tool) - File reading/writing tools
//! - [scraper Documentation](https://docs.rs/scraper/) - HTML parsing library

use async_trait::async_trait;
use dashflow::constants::{DEFAULT_HTTP_CONNECT_TIMEOUT, DEFAULT_HTTP_REQUEST_TIMEOUT};
use dashflow::core::tools::{Tool, ToolInput};
use dashflow::core::Result;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};
use url::Url;

/// Create an HTTP client with standard timeouts
fn create_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_REQUEST_TIMEOUT)
        .connect_timeout(DEFAULT_HTTP_CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

// =============================================================================
// SSRF Protection (M-209)
// =============================================================================
//
// SSRF (Server-Side Request Forgery) allows attackers to make the server fetch
// arbitrary URLs, potentially accessing internal network resources, cloud
// metadata endpoints, or bypassing firewalls.
//
// This module validates URLs before fetching to block:
// - Private IP ranges (RFC 1918: 10.x, 172.16-31.x, 192.168.x)
// - Loopback addresses (127.x.x.x, ::1)
// - Link-local addresses (169.254.x.x, fe80::)
// - Cloud metadata endpoints (169.254.169.254)
// - Non-standard ports (only 80, 443 allowed by default)
// =============================================================================

/// SSRF protection configuration
#[derive(Debug, Clone, Default)]
pub struct SsrfConfig {
    /// Allow requests to private IP ranges (default: false)
    pub allow_private_ips: bool,
    /// Allow requests to localhost (default: false)
    pub allow_localhost: bool,
    /// Allow requests to non-standard ports (default: false)
    pub allow_non_standard_ports: bool,
    /// Allowed domain patterns (empty = allow all public domains)
    pub allowed_domains: Vec<String>,
    /// Additional blocked IP addresses
    pub blocked_ips: Vec<IpAddr>,
}

impl SsrfConfig {
    /// Check if an IP address is a private/internal address
    fn is_private_ip(ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(ipv4) => {
                // Private ranges (RFC 1918)
                ipv4.is_private()
                    // Loopback (127.0.0.0/8)
                    || ipv4.is_loopback()
                    // Link-local (169.254.0.0/16)
                    || ipv4.is_link_local()
                    // Multicast (224.0.0.0/4)
                    || ipv4.is_multicast()
                    // Unspecified (0.0.0.0)
                    || ipv4.is_unspecified()
                    // Broadcast
                    || ipv4.is_broadcast()
                    // Documentation ranges (RFC 5737)
                    || Self::is_documentation_ipv4(ipv4)
                    // Shared address space (RFC 6598: 100.64.0.0/10)
                    || Self::is_shared_address_space(ipv4)
                    // Cloud metadata endpoint (AWS/GCP/Azure)
                    || Self::is_cloud_metadata_ipv4(ipv4)
            }
            IpAddr::V6(ipv6) => {
                // Loopback (::1)
                ipv6.is_loopback()
                    // Unspecified (::)
                    || ipv6.is_unspecified()
                    // Multicast (ff00::/8)
                    || ipv6.is_multicast()
                    // Link-local (fe80::/10) - using manual check since is_unicast_link_local is unstable
                    || Self::is_link_local_ipv6(ipv6)
                    // Unique local (fc00::/7)
                    || Self::is_unique_local_ipv6(ipv6)
                    // Documentation prefix (RFC 3849: 2001:db8::/32)
                    || Self::is_documentation_ipv6(ipv6)
                    // IPv4-mapped addresses
                    || ipv6.to_ipv4_mapped().is_some_and(|ipv4| Self::is_private_ip(&IpAddr::V4(ipv4)))
            }
        }
    }

    /// Check if IPv4 is in documentation range (RFC 5737)
    fn is_documentation_ipv4(ip: &Ipv4Addr) -> bool {
        let octets = ip.octets();
        // 192.0.2.0/24 (TEST-NET-1)
        (octets[0] == 192 && octets[1] == 0 && octets[2] == 2)
            // 198.51.100.0/24 (TEST-NET-2)
            || (octets[0] == 198 && octets[1] == 51 && octets[2] == 100)
            // 203.0.113.0/24 (TEST-NET-3)
            || (octets[0] == 203 && octets[1] == 0 && octets[2] == 113)
    }

    /// Check if IPv4 is in shared address space (RFC 6598: 100.64.0.0/10)
    fn is_shared_address_space(ip: &Ipv4Addr) -> bool {
        let octets = ip.octets();
        octets[0] == 100 && (octets[1] & 0xC0) == 64
    }

    /// Check if IPv4 is a cloud metadata endpoint
    fn is_cloud_metadata_ipv4(ip: &Ipv4Addr) -> bool {
        let octets = ip.octets();
        // AWS/GCP/Azure metadata: 169.254.169.254
        octets[0] == 169 && octets[1] == 254 && octets[2] == 169 && octets[3] == 254
        // AWS IMDSv2 alternative: fd00:ec2::254 (handled in IPv6)
        // GCP metadata alternate: metadata.google.internal resolves to 169.254.169.254
    }

    /// Check if IPv6 is link-local (fe80::/10)
    fn is_link_local_ipv6(ip: &Ipv6Addr) -> bool {
        let segments = ip.segments();
        (segments[0] & 0xffc0) == 0xfe80
    }

    /// Check if IPv6 is unique local (fc00::/7)
    fn is_unique_local_ipv6(ip: &Ipv6Addr) -> bool {
        let segments = ip.segments();
        (segments[0] & 0xfe00) == 0xfc00
    }

    /// Check if IPv6 is in documentation prefix (RFC 3849: 2001:db8::/32)
    fn is_documentation_ipv6(ip: &Ipv6Addr) -> bool {
        let segments = ip.segments();
        segments[0] == 0x2001 && segments[1] == 0x0db8
    }

    fn validate_url_pre_resolve<'a>(
        &self,
        url: &'a Url,
    ) -> std::result::Result<(url::Host<&'a str>, u16, &'a str), String> {
        // Only allow http and https schemes
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(format!(
                    "SSRF protection: scheme '{}' not allowed (only http/https)",
                    scheme
                ))
            }
        }

        // Check port restrictions
        let port = url.port_or_known_default().unwrap_or(80);
        if !self.allow_non_standard_ports && port != 80 && port != 443 {
            return Err(format!(
                "SSRF protection: port {} not allowed (only 80/443)",
                port
            ));
        }

        // Get the host
        let host_str = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| "SSRF protection: URL has no host".to_string())?;

        // Check domain allowlist if configured
        if !self.allowed_domains.is_empty() {
            let domain_allowed = self.allowed_domains.iter().any(|pattern| {
                if let Some(suffix) = pattern.strip_prefix("*.") {
                    // Wildcard match: *.example.com matches sub.example.com
                    host_str == suffix || host_str.ends_with(&format!(".{}", suffix))
                } else {
                    host_str == pattern
                }
            });
            if !domain_allowed {
                return Err(format!(
                    "SSRF protection: domain '{}' not in allowlist",
                    host_str
                ));
            }
        }

        let host = url
            .host()
            .ok_or_else(|| "SSRF protection: URL has no host".to_string())?;

        Ok((host, port, host_str))
    }

    fn resolve_host_to_ips(
        host: url::Host<&str>,
        host_str: &str,
        port: u16,
    ) -> std::result::Result<Vec<IpAddr>, String> {
        match host {
            url::Host::Ipv4(ip) => Ok(vec![IpAddr::V4(ip)]),
            url::Host::Ipv6(ip) => Ok(vec![IpAddr::V6(ip)]),
            url::Host::Domain(domain) => {
                let socket_addr = format!("{}:{}", domain, port);
                let resolved_ips: Vec<IpAddr> = socket_addr
                    .to_socket_addrs()
                    .map_err(|e| format!("SSRF protection: failed to resolve '{}': {}", host_str, e))?
                    .map(|addr| addr.ip())
                    .collect();
                Ok(resolved_ips)
            }
        }
    }

    fn validate_resolved_ips(&self, resolved_ips: &[IpAddr]) -> std::result::Result<(), String> {
        for ip in resolved_ips {
            // Check blocked IP list
            if self.blocked_ips.contains(ip) {
                return Err(format!("SSRF protection: IP {} is explicitly blocked", ip));
            }

            // Check private IP ranges
            if !self.allow_private_ips && Self::is_private_ip(ip) {
                return Err(format!(
                    "SSRF protection: IP {} is a private/internal address",
                    ip
                ));
            }

            // Check localhost specifically (even if allow_private_ips is true)
            if !self.allow_localhost && ip.is_loopback() {
                return Err(format!(
                    "SSRF protection: localhost/loopback addresses not allowed ({})",
                    ip
                ));
            }
        }

        Ok(())
    }

    #[cfg(test)]
    fn validate_url_with_resolved_ips(
        &self,
        url: &Url,
        resolved_ips: &[IpAddr],
    ) -> std::result::Result<(), String> {
        let (_host, _port, host_str) = self.validate_url_pre_resolve(url)?;

        if resolved_ips.is_empty() {
            return Err(format!(
                "SSRF protection: hostname '{}' did not resolve to any IP",
                host_str
            ));
        }

        self.validate_resolved_ips(resolved_ips)
    }

    /// Validate a URL for SSRF protection
    ///
    /// Returns Ok(()) if the URL is safe to fetch, or an error describing why not.
    pub fn validate_url(&self, url: &Url) -> std::result::Result<(), String> {
        let (host, port, host_str) = self.validate_url_pre_resolve(url)?;
        let resolved_ips = Self::resolve_host_to_ips(host, host_str, port)?;
        if resolved_ips.is_empty() {
            return Err(format!(
                "SSRF protection: hostname '{}' did not resolve to any IP",
                host_str
            ));
        }

        self.validate_resolved_ips(&resolved_ips)
    }
}

/// Web scraping tool for extracting content from HTML pages
///
/// This tool fetches a URL and extracts clean text content, optionally including
/// links and other structured information.
///
/// **Security:** SSRF protection is enabled by default to prevent requests to
/// private networks, localhost, and cloud metadata endpoints. Use the builder
/// to configure or disable these protections if needed.
///
/// # Example
///
/// ```no_run
/// use dashflow_webscrape::WebScrapeTool;
/// use dashflow::core::tools::Tool;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let scraper = WebScrapeTool::builder()
///     .include_links(true)
///     .max_content_length(5000)
///     .build();
///
/// let content = scraper._call_str("https://example.com".to_string())
///     .await?;
/// println!("Scraped: {}", content);
/// # Ok(())
/// # }
/// ```
pub struct WebScrapeTool {
    include_links: bool,
    max_content_length: usize,
    client: reqwest::Client,
    /// SSRF protection configuration (enabled by default)
    ssrf_config: SsrfConfig,
}

impl WebScrapeTool {
    /// Create a new web scraping tool with default settings
    ///
    /// SSRF protection is enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            include_links: false,
            max_content_length: 10000,
            client: create_http_client(),
            ssrf_config: SsrfConfig::default(),
        }
    }

    /// Create a builder for `WebScrapeTool`
    #[must_use]
    pub fn builder() -> WebScrapeToolBuilder {
        WebScrapeToolBuilder::default()
    }

    /// Fetch and scrape a URL
    async fn scrape(&self, url_str: String) -> Result<ScrapedContent> {
        // Validate URL
        let url = Url::parse(&url_str).map_err(|e| {
            dashflow::core::Error::tool_error(format!("Invalid URL '{url_str}': {e}"))
        })?;

        // SSRF protection: validate URL before fetching
        self.ssrf_config.validate_url(&url).map_err(|e| {
            dashflow::core::Error::tool_error(e)
        })?;

        // Fetch the page
        let response =
            self.client.get(url.as_str()).send().await.map_err(|e| {
                dashflow::core::Error::tool_error(format!("Failed to fetch URL: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(dashflow::core::Error::tool_error(format!(
                "HTTP error {}: Failed to fetch URL",
                response.status()
            )));
        }

        let html_content = response.text().await.map_err(|e| {
            dashflow::core::Error::tool_error(format!("Failed to read response body: {e}"))
        })?;

        // Parse HTML
        let document = Html::parse_document(&html_content);

        // Extract title
        let title = Self::extract_title(&document);

        // Extract text content
        let text = Self::extract_text(&document);

        // Extract links if requested
        let links = if self.include_links {
            Some(Self::extract_links(&document, &url))
        } else {
            None
        };

        Ok(ScrapedContent {
            url: url_str,
            title,
            text,
            links,
        })
    }

    /// Extract the page title
    fn extract_title(document: &Html) -> Option<String> {
        let title_selector = Selector::parse("title").ok()?;
        document
            .select(&title_selector)
            .next()
            .map(|el| {
                el.text()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
    }

    /// Extract clean text content from the page
    fn extract_text(document: &Html) -> String {
        // Extract visible text, excluding non-content tags (script/style/noscript).
        let mut text_parts = Vec::new();

        // Try to get main content areas first
        let content_selectors = vec!["article", "main", ".content", "#content", "body"];

        for selector_str in content_selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                for element in document.select(&selector) {
                    let text = Self::extract_visible_text(&element);
                    if !text.trim().is_empty() {
                        text_parts.push(text);
                        break; // Use first matching content area
                    }
                }
                if !text_parts.is_empty() {
                    break;
                }
            }
        }

        // If no content area found, fall back to body
        if text_parts.is_empty() {
            if let Ok(body_selector) = Selector::parse("body") {
                for element in document.select(&body_selector) {
                    let text = Self::extract_visible_text(&element);
                    text_parts.push(text);
                }
            }
        }

        // Clean up the text
        let full_text = text_parts.join("\n");
        Self::clean_text(&full_text)
    }

    /// Clean extracted text by removing extra whitespace
    fn clean_text(text: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn extract_visible_text(element: &scraper::ElementRef<'_>) -> String {
        use ego_tree::iter::Edge;
        let mut text_chunks: Vec<&str> = Vec::new();
        let mut skip_depth = 0usize;

        for edge in element.traverse() {
            match edge {
                Edge::Open(node) => match node.value() {
                    scraper::Node::Element(el) => {
                        if matches!(el.name(), "script" | "style" | "noscript") {
                            skip_depth += 1;
                        }
                    }
                    scraper::Node::Text(text) => {
                        if skip_depth == 0 {
                            text_chunks.push(text);
                        }
                    }
                    _ => {}
                },
                Edge::Close(node) => {
                    if let scraper::Node::Element(el) = node.value() {
                        if matches!(el.name(), "script" | "style" | "noscript") && skip_depth > 0 {
                            skip_depth -= 1;
                        }
                    }
                }
            }
        }

        text_chunks.join(" ")
    }

    /// Extract all links from the page
    #[allow(clippy::unwrap_used)] // Static CSS selector "a[href]" is always valid
    fn extract_links(document: &Html, base_url: &Url) -> Vec<Link> {
        let link_selector = Selector::parse("a[href]").unwrap();
        let mut links = Vec::new();

        for element in document.select(&link_selector) {
            if let Some(href) = element.value().attr("href") {
                // Resolve relative URLs
                if let Ok(absolute_url) = base_url.join(href) {
                    let text = element
                        .text()
                        .collect::<Vec<_>>()
                        .join(" ")
                        .trim()
                        .to_string();
                    links.push(Link {
                        url: absolute_url.to_string(),
                        text: (!text.is_empty()).then_some(text),
                    });
                }
            }
        }

        links
    }

    /// Format scraped content as a string
    fn format_content(&self, content: ScrapedContent) -> String {
        let ScrapedContent {
            url,
            title,
            text,
            links,
        } = content;

        let mut output = format!("URL: {}\n\n", url);

        if let Some(title) = title {
            output.push_str(&format!("Title: {title}\n\n"));
        }

        output.push_str("Content:\n");

        // Truncate if too long (by character count, not bytes).
        if self.max_content_length == 0 {
            output.push_str(&format!(
                "...\n\n[Content truncated to {} characters]",
                self.max_content_length
            ));
        } else if let Some((byte_idx, _)) = text.char_indices().nth(self.max_content_length) {
            output.push_str(&format!(
                "{}...\n\n[Content truncated to {} characters]",
                &text[..byte_idx],
                self.max_content_length
            ));
        } else {
            output.push_str(&text);
        }
        output.push_str("\n\n");

        if let Some(links) = links {
            if !links.is_empty() {
                output.push_str(&format!("Links ({}):\n", links.len()));
                for (i, link) in links.iter().take(20).enumerate() {
                    if let Some(text) = &link.text {
                        output.push_str(&format!("{}. {} - {}\n", i + 1, text, link.url));
                    } else {
                        output.push_str(&format!("{}. {}\n", i + 1, link.url));
                    }
                }
                if links.len() > 20 {
                    output.push_str(&format!("\n... and {} more links\n", links.len() - 20));
                }
            }
        }

        output
    }
}

impl Default for WebScrapeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WebScrapeTool {
    fn name(&self) -> &'static str {
        "web_scrape"
    }

    fn description(&self) -> &'static str {
        "Scrapes content from a web page given its URL. \
         Extracts clean text content, page title, and optionally links. \
         Removes scripts, styles, and other non-content elements. \
         Returns formatted text content suitable for analysis."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL of the web page to scrape"
                }
            },
            "required": ["url"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String> {
        let url = match input {
            ToolInput::String(s) => s,
            ToolInput::Structured(v) => v
                .get("url")
                .and_then(|u| u.as_str())
                .ok_or_else(|| {
                    dashflow::core::Error::tool_error(
                        "Missing 'url' field in structured input".to_string(),
                    )
                })?
                .to_string(),
        };

        let content = self.scrape(url).await?;
        Ok(self.format_content(content))
    }
}

/// Scraped content from a web page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedContent {
    /// The URL that was scraped
    pub url: String,
    /// Page title
    pub title: Option<String>,
    /// Extracted text content
    pub text: String,
    /// Links found on the page
    pub links: Option<Vec<Link>>,
}

/// A link extracted from a web page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// The URL of the link
    pub url: String,
    /// The link text (anchor text)
    pub text: Option<String>,
}

/// Builder for `WebScrapeTool`
#[derive(Default)]
pub struct WebScrapeToolBuilder {
    include_links: Option<bool>,
    max_content_length: Option<usize>,
    ssrf_config: Option<SsrfConfig>,
}

impl WebScrapeToolBuilder {
    /// Include links in the scraped output
    #[must_use]
    pub fn include_links(mut self, include: bool) -> Self {
        self.include_links = Some(include);
        self
    }

    /// Set maximum content length before truncation
    #[must_use]
    pub fn max_content_length(mut self, length: usize) -> Self {
        self.max_content_length = Some(length);
        self
    }

    /// Set custom SSRF protection configuration
    ///
    /// By default, SSRF protection blocks requests to private IPs, localhost,
    /// and cloud metadata endpoints. Use this to customize the behavior.
    #[must_use]
    pub fn ssrf_config(mut self, config: SsrfConfig) -> Self {
        self.ssrf_config = Some(config);
        self
    }

    /// Allow requests to private IP ranges (10.x, 172.16-31.x, 192.168.x)
    ///
    /// **WARNING:** This disables SSRF protection for internal networks.
    /// Only use in trusted environments.
    #[must_use]
    pub fn allow_private_ips(mut self, allow: bool) -> Self {
        let config = self.ssrf_config.get_or_insert_with(SsrfConfig::default);
        config.allow_private_ips = allow;
        self
    }

    /// Allow requests to localhost (127.x.x.x, ::1)
    ///
    /// **WARNING:** This allows the tool to access local services.
    /// Only use in trusted environments.
    #[must_use]
    pub fn allow_localhost(mut self, allow: bool) -> Self {
        let config = self.ssrf_config.get_or_insert_with(SsrfConfig::default);
        config.allow_localhost = allow;
        self
    }

    /// Restrict to specific domains only
    ///
    /// Supports wildcards: `*.example.com` matches `sub.example.com`
    #[must_use]
    pub fn allowed_domains(mut self, domains: Vec<String>) -> Self {
        let config = self.ssrf_config.get_or_insert_with(SsrfConfig::default);
        config.allowed_domains = domains;
        self
    }

    /// Build the `WebScrapeTool`
    #[must_use]
    pub fn build(self) -> WebScrapeTool {
        WebScrapeTool {
            include_links: self.include_links.unwrap_or(false),
            max_content_length: self.max_content_length.unwrap_or(10000),
            client: create_http_client(),
            ssrf_config: self.ssrf_config.unwrap_or_default(),
        }
    }
}
