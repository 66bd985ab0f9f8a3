//! GitLab integration tools for `DashFlow` Rust.
//!
//! This crate provides a comprehensive set of tools for interacting with GitLab repositories,
//! enabling AI agents to manage issues, merge requests, and projects.
//!
//! # Tools
//!
//! ## Issue Management
//! - **`GetIssueTool`**: Get issue details by ID
//! - **`CreateIssueTool`**: Create new issues
//! - **`UpdateIssueTool`**: Update existing issues
//! - **`ListIssuesTool`**: List issues in a project
//!
//! ## Merge Request Management
//! - **`GetMergeRequestTool`**: Get merge request details by ID
//! - **`CreateMergeRequestTool`**: Create new merge requests
//! - **`ListMergeRequestsTool`**: List merge requests in a project
//!
//! ## Project Management
//! - **`ListProjectsTool`**: List accessible projects
//! - **`GetProjectTool`**: Get project details
//!
//! # Authentication
//!
//! All tools require a GitLab personal access token with appropriate permissions.
//! Set the token when creating the GitLab client instance.
//!
//! # Example
//!
//! ```no_run
//! use dashflow_gitlab::GetIssueTool;
//! use dashflow::core::tools::{Tool, ToolInput};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create tool (requires GitLab token in production)
//! let tool = GetIssueTool::new("https://gitlab.com", "project_id", "token")?;
//!
//! // Get issue #42
//! let input = json!({"issue_iid": 42});
//! let result = tool._call(ToolInput::Structured(input)).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use dashflow::core::tools::{Tool, ToolInput};
use dashflow::core::Error;
use gitlab::api::{projects, Query};
use gitlab::{Gitlab, GitlabBuilder};

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract string field from `ToolInput`
fn extract_string_field(input: &ToolInput, field: &str) -> Result<String, Error> {
    match input {
        ToolInput::String(s) => Ok(s.clone()),
        ToolInput::Structured(v) => v
            .get(field)
            .and_then(|v| v.as_str())
            .map(std::string::ToString::to_string)
            .ok_or_else(|| Error::tool_error(format!("Missing '{field}' field in input"))),
    }
}

/// Extract optional string field from `ToolInput`
fn extract_optional_string(input: &ToolInput, field: &str) -> Option<String> {
    match input {
        ToolInput::Structured(v) => v
            .get(field)
            .and_then(|v| v.as_str())
            .map(std::string::ToString::to_string),
        _ => None,
    }
}

/// Extract u64 field from `ToolInput`
fn extract_u64_field(input: &ToolInput, field: &str) -> Result<u64, Error> {
    match input {
        ToolInput::Structured(v) => v
            .get(field)
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| Error::tool_error(format!("Missing or invalid '{field}' field"))),
        _ => Err(Error::tool_error(format!(
            "Expected structured input with '{field}' field"
        ))),
    }
}

// ============================================================================
// GetIssueTool
// ============================================================================

/// Tool for getting GitLab issue details.
///
/// Retrieves information about a specific issue by IID (internal ID within project).
///
/// # Input Format
///
/// - **Structured**: `{"issue_iid": 42}`
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_gitlab::GetIssueTool;
/// use dashflow::core::tools::Tool;
///
/// let tool = GetIssueTool::new("https://gitlab.com", "group/project", "token").unwrap();
/// assert_eq!(tool.name(), "get_issue");
/// ```
#[derive(Clone)]
pub struct GetIssueTool {
    project: String,
    client: Gitlab,
}

impl GetIssueTool {
    pub fn new(
        gitlab_url: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = GitlabBuilder::new(gitlab_url.into().trim_end_matches('/'), token.into())
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build GitLab client: {e}")))?;

        Ok(Self {
            project: project.into(),
            client,
        })
    }
}

#[async_trait]
impl Tool for GetIssueTool {
    fn name(&self) -> &'static str {
        "get_issue"
    }

    fn description(&self) -> &'static str {
        "Get details of a GitLab issue by IID. Input: {\"issue_iid\": <number>}"
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let issue_iid = extract_u64_field(&input, "issue_iid")?;

        let endpoint = projects::issues::Issue::builder()
            .project(self.project.clone())
            .issue(issue_iid)
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build endpoint: {e}")))?;

        let issue: serde_json::Value = endpoint
            .query(&self.client)
            .map_err(|e| Error::tool_error(format!("Failed to get issue: {e}")))?;

        Ok(serde_json::to_string_pretty(&issue).unwrap_or_else(|_| issue.to_string()))
    }
}

// ============================================================================
// CreateIssueTool
// ============================================================================

/// Tool for creating GitLab issues.
///
/// Creates a new issue in the specified project.
///
/// # Input Format
///
/// - **Structured**: `{"title": "Bug report", "description": "Description here"}`
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_gitlab::CreateIssueTool;
/// use dashflow::core::tools::Tool;
///
/// # let tool = CreateIssueTool::new("https://gitlab.com", "group/project", "token").unwrap();
/// assert_eq!(tool.name(), "create_issue");
/// ```
#[derive(Clone)]
pub struct CreateIssueTool {
    project: String,
    client: Gitlab,
}

impl CreateIssueTool {
    pub fn new(
        gitlab_url: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = GitlabBuilder::new(gitlab_url.into().trim_end_matches('/'), token.into())
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build GitLab client: {e}")))?;

        Ok(Self {
            project: project.into(),
            client,
        })
    }
}

#[async_trait]
impl Tool for CreateIssueTool {
    fn name(&self) -> &'static str {
        "create_issue"
    }

    fn description(&self) -> &'static str {
        "Create a new GitLab issue. Input: {\"title\": \"title\", \"description\": \"description\"}"
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let title = extract_string_field(&input, "title")?;
        let description = extract_optional_string(&input, "description");

        let endpoint = if let Some(desc) = description {
            projects::issues::CreateIssue::builder()
                .project(self.project.clone())
                .title(title)
                .description(desc)
                .build()
                .map_err(|e| Error::tool_error(format!("Failed to build endpoint: {e}")))?
        } else {
            projects::issues::CreateIssue::builder()
                .project(self.project.clone())
                .title(title)
                .build()
                .map_err(|e| Error::tool_error(format!("Failed to build endpoint: {e}")))?
        };

        let issue: serde_json::Value = endpoint
            .query(&self.client)
            .map_err(|e| Error::tool_error(format!("Failed to create issue: {e}")))?;

        Ok(format!(
            "Issue created successfully:\n{}",
            serde_json::to_string_pretty(&issue).unwrap_or_else(|_| issue.to_string())
        ))
    }
}

// ============================================================================
// UpdateIssueTool
// ============================================================================

/// Tool for updating GitLab issues.
///
/// Updates an existing issue in the specified project.
///
/// # Input Format
///
/// - **Structured**: `{"issue_iid": 42, "title": "Updated title", "description": "Updated description", "state_event": "close"}`
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_gitlab::UpdateIssueTool;
/// use dashflow::core::tools::Tool;
///
/// # let tool = UpdateIssueTool::new("https://gitlab.com", "group/project", "token").unwrap();
/// assert_eq!(tool.name(), "update_issue");
/// ```
#[derive(Clone)]
pub struct UpdateIssueTool {
    project: String,
    client: Gitlab,
}

impl UpdateIssueTool {
    pub fn new(
        gitlab_url: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = GitlabBuilder::new(gitlab_url.into().trim_end_matches('/'), token.into())
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build GitLab client: {e}")))?;

        Ok(Self {
            project: project.into(),
            client,
        })
    }
}

#[async_trait]
impl Tool for UpdateIssueTool {
    fn name(&self) -> &'static str {
        "update_issue"
    }

    fn description(&self) -> &'static str {
        "Update a GitLab issue. Input: {\"issue_iid\": <number>, \"title\": \"new title\", \"description\": \"new desc\", \"state_event\": \"close\" or \"reopen\"}"
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let issue_iid = extract_u64_field(&input, "issue_iid")?;
        let title = extract_optional_string(&input, "title");
        let description = extract_optional_string(&input, "description");
        let state_event = extract_optional_string(&input, "state_event");

        let mut builder = projects::issues::EditIssue::builder();
        builder.project(self.project.clone()).issue(issue_iid);

        if let Some(t) = title {
            builder.title(t);
        }

        if let Some(d) = description {
            builder.description(d);
        }

        if let Some(state) = state_event {
            let state_enum = match state.as_str() {
                "close" => gitlab::api::projects::issues::IssueStateEvent::Close,
                "reopen" => gitlab::api::projects::issues::IssueStateEvent::Reopen,
                _ => {
                    return Err(Error::tool_error(format!(
                        "Invalid state_event: {state}. Must be 'close' or 'reopen'"
                    )))
                }
            };
            builder.state_event(state_enum);
        }

        let endpoint = builder
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build endpoint: {e}")))?;

        let issue: serde_json::Value = endpoint
            .query(&self.client)
            .map_err(|e| Error::tool_error(format!("Failed to update issue: {e}")))?;

        Ok(format!(
            "Issue updated successfully:\n{}",
            serde_json::to_string_pretty(&issue).unwrap_or_else(|_| issue.to_string())
        ))
    }
}

// ============================================================================
// ListIssuesTool
// ============================================================================

/// Tool for listing GitLab issues.
///
/// Lists issues in the specified project with optional filtering.
///
/// # Input Format
///
/// - **Structured**: `{"state": "opened", "labels": "bug,critical"}` (all fields optional)
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_gitlab::ListIssuesTool;
/// use dashflow::core::tools::Tool;
///
/// # let tool = ListIssuesTool::new("https://gitlab.com", "group/project", "token").unwrap();
/// assert_eq!(tool.name(), "list_issues");
/// ```
#[derive(Clone)]
pub struct ListIssuesTool {
    project: String,
    client: Gitlab,
}

impl ListIssuesTool {
    pub fn new(
        gitlab_url: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = GitlabBuilder::new(gitlab_url.into().trim_end_matches('/'), token.into())
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build GitLab client: {e}")))?;

        Ok(Self {
            project: project.into(),
            client,
        })
    }
}

#[async_trait]
impl Tool for ListIssuesTool {
    fn name(&self) -> &'static str {
        "list_issues"
    }

    fn description(&self) -> &'static str {
        "List GitLab issues. Input: {\"state\": \"opened\"|\"closed\"|\"all\", \"labels\": \"label1,label2\"} (all optional)"
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let state = extract_optional_string(&input, "state");
        let labels = extract_optional_string(&input, "labels");

        let mut builder = projects::issues::Issues::builder();
        builder.project(self.project.clone());

        if let Some(s) = state {
            if s != "all" {
                let state_enum = match s.as_str() {
                    "opened" => gitlab::api::projects::issues::IssueState::Opened,
                    "closed" => gitlab::api::projects::issues::IssueState::Closed,
                    _ => {
                        return Err(Error::tool_error(format!(
                            "Invalid state: {s}. Must be 'opened', 'closed', or 'all'"
                        )))
                    }
                };
                builder.state(state_enum);
            }
        }

        if let Some(l) = labels {
            let label_vec: Vec<String> = l.split(',').map(|s| s.trim().to_string()).collect();
            builder.labels(label_vec);
        }

        let endpoint = builder
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build endpoint: {e}")))?;

        let issues: Vec<serde_json::Value> = endpoint
            .query(&self.client)
            .map_err(|e| Error::tool_error(format!("Failed to list issues: {e}")))?;

        Ok(format!(
            "Found {} issues:\n{}",
            issues.len(),
            serde_json::to_string_pretty(&issues).unwrap_or_else(|_| format!("{issues:?}"))
        ))
    }
}

// ============================================================================
// GetMergeRequestTool
// ============================================================================

/// Tool for getting GitLab merge request details.
///
/// Retrieves information about a specific merge request by IID.
///
/// # Input Format
///
/// - **Structured**: `{"merge_request_iid": 42}`
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_gitlab::GetMergeRequestTool;
/// use dashflow::core::tools::Tool;
///
/// # let tool = GetMergeRequestTool::new("https://gitlab.com", "group/project", "token").unwrap();
/// assert_eq!(tool.name(), "get_merge_request");
/// ```
#[derive(Clone)]
pub struct GetMergeRequestTool {
    project: String,
    client: Gitlab,
}

impl GetMergeRequestTool {
    pub fn new(
        gitlab_url: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = GitlabBuilder::new(gitlab_url.into().trim_end_matches('/'), token.into())
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build GitLab client: {e}")))?;

        Ok(Self {
            project: project.into(),
            client,
        })
    }
}

#[async_trait]
impl Tool for GetMergeRequestTool {
    fn name(&self) -> &'static str {
        "get_merge_request"
    }

    fn description(&self) -> &'static str {
        "Get details of a GitLab merge request by IID. Input: {\"merge_request_iid\": <number>}"
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let mr_iid = extract_u64_field(&input, "merge_request_iid")?;

        let endpoint = projects::merge_requests::MergeRequest::builder()
            .project(self.project.clone())
            .merge_request(mr_iid)
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build endpoint: {e}")))?;

        let mr: serde_json::Value = endpoint
            .query(&self.client)
            .map_err(|e| Error::tool_error(format!("Failed to get merge request: {e}")))?;

        Ok(serde_json::to_string_pretty(&mr).unwrap_or_else(|_| mr.to_string()))
    }
}

// ============================================================================
// CreateMergeRequestTool
// ============================================================================

/// Tool for creating GitLab merge requests.
///
/// Creates a new merge request in the specified project.
///
/// # Input Format
///
/// - **Structured**: `{"title": "Fix bug", "source_branch": "feature", "target_branch": "main", "description": "Description"}`
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_gitlab::CreateMergeRequestTool;
/// use dashflow::core::tools::Tool;
///
/// # let tool = CreateMergeRequestTool::new("https://gitlab.com", "group/project", "token").unwrap();
/// assert_eq!(tool.name(), "create_merge_request");
/// ```
#[derive(Clone)]
pub struct CreateMergeRequestTool {
    project: String,
    client: Gitlab,
}

impl CreateMergeRequestTool {
    pub fn new(
        gitlab_url: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = GitlabBuilder::new(gitlab_url.into().trim_end_matches('/'), token.into())
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build GitLab client: {e}")))?;

        Ok(Self {
            project: project.into(),
            client,
        })
    }
}

#[async_trait]
impl Tool for CreateMergeRequestTool {
    fn name(&self) -> &'static str {
        "create_merge_request"
    }

    fn description(&self) -> &'static str {
        "Create a new GitLab merge request. Input: {\"title\": \"title\", \"source_branch\": \"feature\", \"target_branch\": \"main\", \"description\": \"description\"}"
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let title = extract_string_field(&input, "title")?;
        let source_branch = extract_string_field(&input, "source_branch")?;
        let target_branch = extract_string_field(&input, "target_branch")?;
        let description = extract_optional_string(&input, "description");

        let mut builder = projects::merge_requests::CreateMergeRequest::builder();
        builder
            .project(self.project.clone())
            .title(title)
            .source_branch(source_branch)
            .target_branch(target_branch);

        if let Some(desc) = description {
            builder.description(desc);
        }

        let endpoint = builder
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build endpoint: {e}")))?;

        let mr: serde_json::Value = endpoint
            .query(&self.client)
            .map_err(|e| Error::tool_error(format!("Failed to create merge request: {e}")))?;

        Ok(format!(
            "Merge request created successfully:\n{}",
            serde_json::to_string_pretty(&mr).unwrap_or_else(|_| mr.to_string())
        ))
    }
}

// ============================================================================
// ListMergeRequestsTool
// ============================================================================

/// Tool for listing GitLab merge requests.
///
/// Lists merge requests in the specified project with optional filtering.
///
/// # Input Format
///
/// - **Structured**: `{"state": "opened"}` (optional)
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_gitlab::ListMergeRequestsTool;
/// use dashflow::core::tools::Tool;
///
/// # let tool = ListMergeRequestsTool::new("https://gitlab.com", "group/project", "token").unwrap();
/// assert_eq!(tool.name(), "list_merge_requests");
/// ```
#[derive(Clone)]
pub struct ListMergeRequestsTool {
    project: String,
    client: Gitlab,
}

impl ListMergeRequestsTool {
    pub fn new(
        gitlab_url: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = GitlabBuilder::new(gitlab_url.into().trim_end_matches('/'), token.into())
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build GitLab client: {e}")))?;

        Ok(Self {
            project: project.into(),
            client,
        })
    }
}

#[async_trait]
impl Tool for ListMergeRequestsTool {
    fn name(&self) -> &'static str {
        "list_merge_requests"
    }

    fn description(&self) -> &'static str {
        "List GitLab merge requests. Input: {\"state\": \"opened\"|\"closed\"|\"merged\"|\"all\"} (optional)"
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let state = extract_optional_string(&input, "state");

        let mut builder = projects::merge_requests::MergeRequests::builder();
        builder.project(self.project.clone());

        if let Some(s) = state {
            if s != "all" {
                let state_enum = match s.as_str() {
                    "opened" => gitlab::api::projects::merge_requests::MergeRequestState::Opened,
                    "closed" => gitlab::api::projects::merge_requests::MergeRequestState::Closed,
                    "merged" => gitlab::api::projects::merge_requests::MergeRequestState::Merged,
                    _ => {
                        return Err(Error::tool_error(format!(
                            "Invalid state: {s}. Must be 'opened', 'closed', 'merged', or 'all'"
                        )))
                    }
                };
                builder.state(state_enum);
            }
        }

        let endpoint = builder
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build endpoint: {e}")))?;

        let mrs: Vec<serde_json::Value> = endpoint
            .query(&self.client)
            .map_err(|e| Error::tool_error(format!("Failed to list merge requests: {e}")))?;

        Ok(format!(
            "Found {} merge requests:\n{}",
            mrs.len(),
            serde_json::to_string_pretty(&mrs).unwrap_or_else(|_| format!("{mrs:?}"))
        ))
    }
}

// ============================================================================
// GetProjectTool
// ============================================================================

/// Tool for getting GitLab project details.
///
/// Retrieves information about a specific project.
///
/// # Input Format
///
/// - **Structured**: `{"project": "group/project"}` or just use the configured project
///
/// # Example
///
/// ```rust,ignore
/// use dashflow_gitlab::GetProjectTool;
/// use dashflow::core::tools::Tool;
///
/// # let tool = GetProjectTool::new("https://gitlab.com", "group/project", "token").unwrap();
/// assert_eq!(tool.name(), "get_project");
/// ```
#[derive(Clone)]
pub struct GetProjectTool {
    project: String,
    client: Gitlab,
}

impl GetProjectTool {
    pub fn new(
        gitlab_url: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = GitlabBuilder::new(gitlab_url.into().trim_end_matches('/'), token.into())
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build GitLab client: {e}")))?;

        Ok(Self {
            project: project.into(),
            client,
        })
    }
}

#[async_trait]
impl Tool for GetProjectTool {
    fn name(&self) -> &'static str {
        "get_project"
    }

    fn description(&self) -> &'static str {
        "Get details of a GitLab project. Input: {} (uses configured project)"
    }

    async fn _call(&self, _input: ToolInput) -> Result<String, Error> {
        let endpoint = projects::Project::builder()
            .project(self.project.clone())
            .build()
            .map_err(|e| Error::tool_error(format!("Failed to build endpoint: {e}")))?;

        let project: serde_json::Value = endpoint
            .query(&self.client)
            .map_err(|e| Error::tool_error(format!("Failed to get project: {e}")))?;

        Ok(serde_json::to_string_pretty(&project).unwrap_or_else(|_| project.to_string()))
    }
}
