// No broad clippy allows - production code uses proper error handling

//! # DashFlow Git Tool
//!
//! Git integration for coding agents. Provides repository detection, commit history,
//! diff generation, and context collection for LLM prompts.
//!
//! ## Features
//!
//! - **Repository detection**: Find .git root from any subdirectory
//! - **Commit history**: Recent commits with filtering
//! - **Changes**: Staged, unstaged, and untracked files
//! - **Diffs**: Between refs, working tree, staged changes
//! - **Branch info**: Current branch, remote tracking
//! - **LLM context**: Format git state for AI consumption
//!
//! ## Example
//!
//! ```no_run
//! use dashflow_git_tool::{GitTool, GitContextOptions};
//!
//! # tokio_test::block_on(async {
//! let git = GitTool::discover(".").unwrap();
//!
//! // Get current branch
//! let branch = git.current_branch().unwrap();
//! println!("On branch: {}", branch);
//!
//! // Collect context for LLM
//! let context = git.collect_context(GitContextOptions::default()).unwrap();
//! println!("{}", context.to_prompt_string());
//! # });
//! ```

use async_trait::async_trait;
use dashflow::core::{
    tools::{Tool, ToolInput},
    Error,
};
use git2::{BranchType, DiffOptions, Repository, StatusOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found: {0}")]
    NotFound(String),

    /// Git operation failed
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Invalid reference
    #[error("Invalid reference: {0}")]
    InvalidRef(String),

    /// Path error
    #[error("Path error: {0}")]
    PathError(String),
}

/// Options for collecting git context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitContextOptions {
    /// Maximum number of recent commits to include
    #[serde(default = "default_max_commits")]
    pub max_commits: usize,

    /// Include diff of uncommitted changes
    #[serde(default = "default_true")]
    pub include_diff: bool,

    /// Include untracked files
    #[serde(default = "default_true")]
    pub include_untracked: bool,

    /// Maximum diff size in bytes
    #[serde(default = "default_max_diff_size")]
    pub max_diff_size: usize,

    /// Include file stats in commits
    #[serde(default)]
    pub include_stats: bool,
}

fn default_max_commits() -> usize {
    10
}
fn default_true() -> bool {
    true
}
fn default_max_diff_size() -> usize {
    50_000
}

impl Default for GitContextOptions {
    fn default() -> Self {
        Self {
            max_commits: 10,
            include_diff: true,
            include_untracked: true,
            max_diff_size: 50_000,
            include_stats: false,
        }
    }
}

/// Information about a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash (short)
    pub hash: String,
    /// Full commit hash
    pub full_hash: String,
    /// Commit message (first line)
    pub summary: String,
    /// Full commit message
    pub message: String,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Commit timestamp (Unix epoch)
    pub timestamp: i64,
    /// Files changed (if stats enabled)
    pub files_changed: Option<usize>,
    /// Lines added (if stats enabled)
    pub insertions: Option<usize>,
    /// Lines deleted (if stats enabled)
    pub deletions: Option<usize>,
}

/// Information about file status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStatus {
    /// File path
    pub path: String,
    /// Status type
    pub status: FileStatusType,
}

/// Type of file status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileStatusType {
    /// New file (untracked or staged new)
    New,
    /// Modified
    Modified,
    /// Deleted
    Deleted,
    /// Renamed
    Renamed,
    /// Copied
    Copied,
    /// Type changed
    TypeChange,
    /// Untracked
    Untracked,
    /// Ignored
    Ignored,
    /// Conflicted
    Conflicted,
}

/// Statistics for a single commit: (files_changed, insertions, deletions)
pub type CommitStats = (Option<usize>, Option<usize>, Option<usize>);

/// File status grouped by stage: (staged, unstaged, untracked)
pub type FileStatusGroup = (Vec<FileStatus>, Vec<FileStatus>, Vec<String>);

/// Collected git context for LLM consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitContext {
    /// Repository root path
    pub repo_root: String,
    /// Current branch name
    pub branch: String,
    /// Remote tracking branch (if any)
    pub upstream: Option<String>,
    /// Whether there are uncommitted changes
    pub is_dirty: bool,
    /// Recent commits
    pub commits: Vec<CommitInfo>,
    /// Staged files
    pub staged: Vec<FileStatus>,
    /// Unstaged modified files
    pub unstaged: Vec<FileStatus>,
    /// Untracked files
    pub untracked: Vec<String>,
    /// Diff of uncommitted changes
    pub diff: Option<String>,
    /// Commit count ahead of upstream
    pub ahead: usize,
    /// Commit count behind upstream
    pub behind: usize,
}

impl GitContext {
    /// Format context as a string for LLM prompts
    #[must_use]
    pub fn to_prompt_string(&self) -> String {
        let mut output = String::new();

        // Branch info
        output.push_str(&format!("Branch: {}", self.branch));
        if let Some(ref upstream) = self.upstream {
            output.push_str(&format!(" (tracking {})", upstream));
        }
        output.push('\n');

        // Ahead/behind
        if self.ahead > 0 || self.behind > 0 {
            output.push_str(&format!("Ahead: {}, Behind: {}\n", self.ahead, self.behind));
        }

        // Status
        if self.is_dirty {
            output.push_str("\nUncommitted changes:\n");

            if !self.staged.is_empty() {
                output.push_str("  Staged:\n");
                for file in &self.staged {
                    output.push_str(&format!("    {:?}: {}\n", file.status, file.path));
                }
            }

            if !self.unstaged.is_empty() {
                output.push_str("  Modified:\n");
                for file in &self.unstaged {
                    output.push_str(&format!("    {:?}: {}\n", file.status, file.path));
                }
            }

            if !self.untracked.is_empty() {
                output.push_str("  Untracked:\n");
                for file in &self.untracked {
                    output.push_str(&format!("    {}\n", file));
                }
            }
        }

        // Recent commits
        if !self.commits.is_empty() {
            output.push_str("\nRecent commits:\n");
            for commit in &self.commits {
                output.push_str(&format!("  {} {}\n", commit.hash, commit.summary));
            }
        }

        // Diff
        if let Some(ref diff) = self.diff {
            if !diff.is_empty() {
                output.push_str("\nDiff:\n```diff\n");
                output.push_str(diff);
                if !diff.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str("```\n");
            }
        }

        output
    }

    /// Convert to JSON for structured output
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Git tool for repository operations
pub struct GitTool {
    repo: Repository,
    repo_path: PathBuf,
}

impl std::fmt::Debug for GitTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitTool")
            .field("repo_path", &self.repo_path)
            .finish()
    }
}

impl GitTool {
    /// Discover a git repository from the given path
    ///
    /// Searches upward from the given path to find a .git directory.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .map_err(|e| GitError::NotFound(format!("{}: {}", path.display(), e)))?;
        let repo_path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, repo_path })
    }

    /// Open a git repository at the exact path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path)
            .map_err(|e| GitError::NotFound(format!("{}: {}", path.display(), e)))?;
        let repo_path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, repo_path })
    }

    /// Get the repository root path
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.repo_path
    }

    /// Get the current branch name
    pub fn current_branch(&self) -> Result<String, GitError> {
        let head = self.repo.head()?;
        if head.is_branch() {
            Ok(head.shorthand().unwrap_or("HEAD").to_string())
        } else {
            // Detached HEAD - return short commit hash
            let commit = head.peel_to_commit()?;
            Ok(format!(
                "HEAD detached at {}",
                &commit.id().to_string()[..7]
            ))
        }
    }

    /// Get the upstream branch name if set
    pub fn upstream_branch(&self) -> Result<Option<String>, GitError> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Ok(None);
        }

        let branch_name = head
            .shorthand()
            .ok_or_else(|| GitError::InvalidRef("Could not get branch name".to_string()))?;

        let branch = self.repo.find_branch(branch_name, BranchType::Local)?;
        match branch.upstream() {
            Ok(upstream) => Ok(upstream.name()?.map(String::from)),
            Err(_) => Ok(None),
        }
    }

    /// Check if repository has uncommitted changes
    pub fn is_dirty(&self) -> Result<bool, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        opts.include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(!statuses.is_empty())
    }

    /// Get recent commits
    pub fn recent_commits(
        &self,
        max_count: usize,
        include_stats: bool,
    ) -> Result<Vec<CommitInfo>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        let mut commits = Vec::new();

        for (i, oid) in revwalk.enumerate() {
            if i >= max_count {
                break;
            }

            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;

            let hash = oid.to_string();
            let short_hash = hash[..7.min(hash.len())].to_string();

            let message = commit.message().unwrap_or("").to_string();
            let summary = commit.summary().unwrap_or("").to_string();

            let author = commit.author();
            let author_name = author.name().unwrap_or("Unknown").to_string();
            let author_email = author.email().unwrap_or("").to_string();

            let timestamp = commit.time().seconds();

            let (files_changed, insertions, deletions) = if include_stats {
                self.commit_stats(&commit).unwrap_or((None, None, None))
            } else {
                (None, None, None)
            };

            commits.push(CommitInfo {
                hash: short_hash,
                full_hash: hash,
                summary,
                message,
                author: author_name,
                author_email,
                timestamp,
                files_changed,
                insertions,
                deletions,
            });
        }

        Ok(commits)
    }

    /// Get stats for a commit
    fn commit_stats(&self, commit: &git2::Commit) -> Result<CommitStats, GitError> {
        let tree = commit.tree()?;
        let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let stats = diff.stats()?;
        Ok((
            Some(stats.files_changed()),
            Some(stats.insertions()),
            Some(stats.deletions()),
        ))
    }

    /// Get file statuses (staged, unstaged, untracked)
    pub fn file_statuses(&self, include_untracked: bool) -> Result<FileStatusGroup, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(include_untracked);
        opts.include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;

        let mut staged = Vec::new();
        let mut unstaged = Vec::new();
        let mut untracked = Vec::new();

        for entry in statuses.iter() {
            let path = entry.path().unwrap_or("").to_string();
            let status = entry.status();

            // Staged changes (index)
            if status.is_index_new() {
                staged.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::New,
                });
            } else if status.is_index_modified() {
                staged.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::Modified,
                });
            } else if status.is_index_deleted() {
                staged.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::Deleted,
                });
            } else if status.is_index_renamed() {
                staged.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::Renamed,
                });
            } else if status.is_index_typechange() {
                staged.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::TypeChange,
                });
            }

            // Unstaged changes (workdir)
            if status.is_wt_modified() {
                unstaged.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::Modified,
                });
            } else if status.is_wt_deleted() {
                unstaged.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::Deleted,
                });
            } else if status.is_wt_renamed() {
                unstaged.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::Renamed,
                });
            } else if status.is_wt_typechange() {
                unstaged.push(FileStatus {
                    path: path.clone(),
                    status: FileStatusType::TypeChange,
                });
            }

            // Untracked
            if status.is_wt_new() {
                untracked.push(path);
            }
        }

        Ok((staged, unstaged, untracked))
    }

    /// Get diff of uncommitted changes
    pub fn uncommitted_diff(&self, max_size: usize) -> Result<String, GitError> {
        let mut diff_opts = DiffOptions::new();
        diff_opts.include_untracked(false);

        // Get diff between HEAD and index (staged)
        let head_tree = self.repo.head()?.peel_to_tree()?;
        let staged_diff =
            self.repo
                .diff_tree_to_index(Some(&head_tree), None, Some(&mut diff_opts))?;

        // Get diff between index and workdir (unstaged)
        let unstaged_diff = self
            .repo
            .diff_index_to_workdir(None, Some(&mut diff_opts))?;

        let mut output = String::new();

        // Format staged diff
        staged_diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            if output.len() < max_size {
                let prefix = match line.origin() {
                    '+' => "+",
                    '-' => "-",
                    ' ' => " ",
                    _ => "",
                };
                if !prefix.is_empty() {
                    output.push_str(prefix);
                }
                if let Ok(content) = std::str::from_utf8(line.content()) {
                    output.push_str(content);
                }
            }
            true
        })?;

        // Format unstaged diff
        unstaged_diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            if output.len() < max_size {
                let prefix = match line.origin() {
                    '+' => "+",
                    '-' => "-",
                    ' ' => " ",
                    _ => "",
                };
                if !prefix.is_empty() {
                    output.push_str(prefix);
                }
                if let Ok(content) = std::str::from_utf8(line.content()) {
                    output.push_str(content);
                }
            }
            true
        })?;

        if output.len() >= max_size {
            output.truncate(max_size);
            output.push_str("\n... (truncated)");
        }

        Ok(output)
    }

    /// Get ahead/behind counts relative to upstream
    pub fn ahead_behind(&self) -> Result<(usize, usize), GitError> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Ok((0, 0));
        }

        let branch_name = head
            .shorthand()
            .ok_or_else(|| GitError::InvalidRef("Could not get branch name".to_string()))?;

        let local = self.repo.find_branch(branch_name, BranchType::Local)?;
        let upstream = match local.upstream() {
            Ok(u) => u,
            Err(_) => return Ok((0, 0)),
        };

        let local_oid = local
            .get()
            .target()
            .ok_or_else(|| GitError::InvalidRef("Local branch has no target".to_string()))?;

        let upstream_oid = upstream
            .get()
            .target()
            .ok_or_else(|| GitError::InvalidRef("Upstream branch has no target".to_string()))?;

        let (ahead, behind) = self.repo.graph_ahead_behind(local_oid, upstream_oid)?;
        Ok((ahead, behind))
    }

    /// Collect all git context for LLM consumption
    #[allow(clippy::needless_pass_by_value)] // Ergonomic API - options is cheap to clone
    pub fn collect_context(&self, options: GitContextOptions) -> Result<GitContext, GitError> {
        let branch = self.current_branch()?;
        let upstream = self.upstream_branch()?;
        let is_dirty = self.is_dirty()?;
        let commits = self.recent_commits(options.max_commits, options.include_stats)?;
        let (staged, unstaged, untracked) = self.file_statuses(options.include_untracked)?;
        let (ahead, behind) = self.ahead_behind().unwrap_or((0, 0));

        let diff = if options.include_diff && is_dirty {
            Some(self.uncommitted_diff(options.max_diff_size)?)
        } else {
            None
        };

        Ok(GitContext {
            repo_root: self.repo_path.display().to_string(),
            branch,
            upstream,
            is_dirty,
            commits,
            staged,
            unstaged,
            untracked: if options.include_untracked {
                untracked
            } else {
                Vec::new()
            },
            diff,
            ahead,
            behind,
        })
    }

    /// Get diff between two refs
    pub fn diff_refs(&self, from: &str, to: &str, max_size: usize) -> Result<String, GitError> {
        let from_obj = self.repo.revparse_single(from)?;
        let to_obj = self.repo.revparse_single(to)?;

        let from_tree = from_obj.peel_to_tree()?;
        let to_tree = to_obj.peel_to_tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), None)?;

        let mut output = String::new();

        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            if output.len() < max_size {
                let prefix = match line.origin() {
                    '+' => "+",
                    '-' => "-",
                    ' ' => " ",
                    _ => "",
                };
                if !prefix.is_empty() {
                    output.push_str(prefix);
                }
                if let Ok(content) = std::str::from_utf8(line.content()) {
                    output.push_str(content);
                }
            }
            true
        })?;

        if output.len() >= max_size {
            output.truncate(max_size);
            output.push_str("\n... (truncated)");
        }

        Ok(output)
    }
}

/// Git tool implementation for DashFlow Tool trait
#[derive(Debug, Clone)]
pub struct GitInfoTool {
    working_dir: PathBuf,
}

impl GitInfoTool {
    /// Create a new git info tool
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl Tool for GitInfoTool {
    fn name(&self) -> &'static str {
        "git_info"
    }

    fn description(&self) -> &'static str {
        "Get information about the current git repository including branch, status, recent commits, and diffs."
    }

    fn args_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["status", "commits", "diff", "context"],
                    "description": "The git action to perform"
                },
                "max_commits": {
                    "type": "integer",
                    "description": "Maximum commits to return (for commits/context actions)",
                    "default": 10
                },
                "include_diff": {
                    "type": "boolean",
                    "description": "Include diff in context output",
                    "default": true
                }
            },
            "required": ["action"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let params: serde_json::Value = match input {
            ToolInput::String(s) => serde_json::json!({"action": s}),
            ToolInput::Structured(obj) => obj,
        };

        let action = params
            .get("action")
            .and_then(|v| v.as_str())
            .unwrap_or("status")
            .to_string();

        let max_commits = params
            .get("max_commits")
            .and_then(|v| v.as_u64())
            .unwrap_or(10) as usize;

        let include_diff = params
            .get("include_diff")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);

        // Clone working_dir for move into spawn_blocking
        let working_dir = self.working_dir.clone();

        // All git2 operations are blocking I/O - wrap in spawn_blocking
        tokio::task::spawn_blocking(move || {
            call_git_sync(&working_dir, &action, max_commits, include_diff)
        })
        .await
        .map_err(|e| Error::tool_error(format!("Git task panicked: {e}")))?
    }
}

/// Synchronous implementation of git tool operations.
///
/// All blocking git2 operations are contained here to be run via
/// `spawn_blocking` in the async wrapper.
fn call_git_sync(
    working_dir: &Path,
    action: &str,
    max_commits: usize,
    include_diff: bool,
) -> Result<String, Error> {
    let git = GitTool::discover(working_dir)
        .map_err(|e| Error::tool_error(format!("Git error: {e}")))?;

    match action {
        "status" => {
            let branch = git
                .current_branch()
                .map_err(|e| Error::tool_error(e.to_string()))?;
            let is_dirty = git
                .is_dirty()
                .map_err(|e| Error::tool_error(e.to_string()))?;
            let (staged, unstaged, untracked) = git
                .file_statuses(true)
                .map_err(|e| Error::tool_error(e.to_string()))?;

            let mut output = format!("Branch: {}\n", branch);
            output.push_str(&format!("Dirty: {}\n", is_dirty));

            if !staged.is_empty() {
                output.push_str("\nStaged:\n");
                for f in &staged {
                    output.push_str(&format!("  {:?}: {}\n", f.status, f.path));
                }
            }

            if !unstaged.is_empty() {
                output.push_str("\nUnstaged:\n");
                for f in &unstaged {
                    output.push_str(&format!("  {:?}: {}\n", f.status, f.path));
                }
            }

            if !untracked.is_empty() {
                output.push_str("\nUntracked:\n");
                for f in &untracked {
                    output.push_str(&format!("  {}\n", f));
                }
            }

            Ok(output)
        }
        "commits" => {
            let commits = git
                .recent_commits(max_commits, false)
                .map_err(|e| Error::tool_error(e.to_string()))?;

            let mut output = String::new();
            for c in commits {
                output.push_str(&format!("{} {} <{}>\n", c.hash, c.author, c.author_email));
                output.push_str(&format!("    {}\n", c.summary));
            }

            Ok(output)
        }
        "diff" => {
            let diff = git
                .uncommitted_diff(50_000)
                .map_err(|e| Error::tool_error(e.to_string()))?;

            if diff.is_empty() {
                Ok("No uncommitted changes".to_string())
            } else {
                Ok(diff)
            }
        }
        "context" => {
            let options = GitContextOptions {
                max_commits,
                include_diff,
                ..Default::default()
            };

            let context = git
                .collect_context(options)
                .map_err(|e| Error::tool_error(e.to_string()))?;

            Ok(context.to_prompt_string())
        }
        _ => Err(Error::tool_error(format!("Unknown action: {}", action))),
    }
}
