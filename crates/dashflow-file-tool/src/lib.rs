//! File management tools for `DashFlow` Rust.
//!
//! This crate provides a comprehensive set of tools for file and directory operations,
//! enabling AI agents to interact with the file system safely and efficiently.
//!
//! # Tools
//!
//! - **`ReadFileTool`**: Read file contents
//! - **`WriteFileTool`**: Write or append to files
//! - **`ListDirectoryTool`**: List directory contents
//! - **`CopyFileTool`**: Copy files
//! - **`MoveFileTool`**: Move or rename files
//! - **`DeleteFileTool`**: Delete files
//! - **`FileSearchTool`**: Search for files by name pattern
//!
//! # Security
//!
//! All tools support optional directory allowlisting to restrict file operations
//! to specific directories. Use `with_allowed_dirs()` to configure security boundaries.
//!
//! # Example
//!
//! ```rust
//! use dashflow_file_tool::ReadFileTool;
//! use dashflow::core::tools::{Tool, ToolInput};
//! use serde_json::json;
//! use std::path::PathBuf;
//!
//! # tokio_test::block_on(async {
//! // Create a read tool with directory restriction
//! let tool = ReadFileTool::new()
//!     .with_allowed_dirs(vec![PathBuf::from("/tmp")]);
//!
//! let input = json!({"file_path": "/tmp/example.txt"});
//! // let result = tool._call(ToolInput::Structured(input)).await.unwrap();
//! # });
//! ```
//!
//! # See Also
//!
//! - [`Tool`] - The trait these tools implement
//! - [`dashflow-shell-tool`](https://docs.rs/dashflow-shell-tool) - Shell command execution (more powerful but less safe)
//! - [`dashflow-json-tool`](https://docs.rs/dashflow-json-tool) - JSON parsing and querying tool
//! - [`dashflow-webscrape`](https://docs.rs/dashflow-webscrape) - Web content retrieval tool

use async_trait::async_trait;
use dashflow::core::tools::{Tool, ToolInput};
use dashflow::core::Error;
use serde_json::json;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tokio::io::AsyncWriteExt;

// ============================================================================
// Security Helper
// ============================================================================

/// Check for path traversal patterns that could escape directory restrictions.
///
/// This is a defense-in-depth check that runs before canonicalization.
fn contains_path_traversal(path: &Path) -> bool {
    let path_str = path.to_string_lossy();

    // Check for null bytes (can cause truncation in some systems)
    if path_str.contains('\0') {
        return true;
    }

    // Check for explicit path traversal components.
    //
    // IMPORTANT: Don't treat any occurrence of ".." as traversal, since it's valid for
    // filenames to contain ".." (e.g. "report..backup.json"). Only block the actual
    // parent-directory component.
    if path_str
        .split(|c| c == '/' || c == '\\')
        .any(|component| component == "..")
    {
        return true;
    }

    // Check for double slashes which could be used to confuse parsers
    // (allow single slash at start for absolute paths)
    let without_prefix = path_str.trim_start_matches('/');
    if without_prefix.contains("//") {
        return true;
    }

    false
}

/// Normalize a path for security checking.
///
/// For existing paths, uses canonicalize().
/// For non-existent paths (new files), normalizes using parent directory.
fn normalize_path_for_check(path: &Path) -> Option<PathBuf> {
    // First try canonicalize (works for existing files)
    if let Ok(canonical) = path.canonicalize() {
        return Some(canonical);
    }

    // For non-existent files, canonicalize the parent and append the filename
    let parent = path.parent()?;
    let file_name = path.file_name()?;

    // Try to canonicalize the parent directory
    // If parent doesn't exist either, try its parent recursively
    let canonical_parent = if parent.as_os_str().is_empty() {
        // No parent (relative path with just filename)
        std::env::current_dir().ok()?
    } else if let Ok(p) = parent.canonicalize() {
        p
    } else {
        // Parent doesn't exist - this is okay for new nested directories
        // Use the most existing ancestor we can find
        let mut current = parent;
        let mut components_to_add = Vec::new();

        loop {
            if let Ok(canonical) = current.canonicalize() {
                // Found an existing ancestor, rebuild the path
                let mut result = canonical;
                for component in components_to_add.into_iter().rev() {
                    result = result.join(component);
                }
                return Some(result.join(file_name));
            }

            // Move up one level
            if let (Some(p), Some(name)) = (current.parent(), current.file_name()) {
                components_to_add.push(name.to_os_string());
                current = p;
                if current.as_os_str().is_empty() {
                    // Reached root of relative path
                    let mut result = std::env::current_dir().ok()?;
                    for component in components_to_add.into_iter().rev() {
                        result = result.join(component);
                    }
                    return Some(result.join(file_name));
                }
            } else {
                // Can't go further up
                return None;
            }
        }
    };

    Some(canonical_parent.join(file_name))
}

/// Check if a path is within allowed directories (synchronous version for tests)
fn is_path_allowed(path: &Path, allowed_dirs: &[PathBuf]) -> bool {
    if allowed_dirs.is_empty() {
        return true; // No restrictions
    }

    // Defense-in-depth: Check for path traversal patterns before canonicalization
    // This catches attempts to escape restrictions that might succeed due to
    // canonicalization quirks or race conditions
    if contains_path_traversal(path) {
        return false;
    }

    // Normalize path (works for both existing and new files)
    let normalized_path = match normalize_path_for_check(path) {
        Some(p) => p,
        None => return false,
    };

    // Check if normalized path is within any allowed directory
    allowed_dirs.iter().any(|allowed| {
        if let Ok(allowed_abs) = allowed.canonicalize() {
            normalized_path.starts_with(&allowed_abs)
        } else {
            false
        }
    })
}

/// Check if a path is within allowed directories (async version using spawn_blocking)
///
/// This wraps the blocking `canonicalize()` calls in `spawn_blocking` to avoid
/// blocking the async runtime (M-633).
async fn is_path_allowed_async(path: PathBuf, allowed_dirs: Vec<PathBuf>) -> bool {
    tokio::task::spawn_blocking(move || is_path_allowed(&path, &allowed_dirs))
        .await
        .unwrap_or(false)
}

// ============================================================================
// ReadFileTool
// ============================================================================

/// Default maximum file size for read operations (10 MB).
const DEFAULT_MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

/// Tool for reading file contents.
///
/// Supports both absolute and relative paths. Can be restricted to specific
/// directories using `with_allowed_dirs()` and size-limited using `with_max_size()`.
///
/// # Input Format
///
/// - **String**: File path
/// - **Structured**: `{"file_path": "path/to/file.txt"}`
///
/// # Example
///
/// ```rust
/// use dashflow_file_tool::ReadFileTool;
/// use dashflow::core::tools::Tool;
///
/// let tool = ReadFileTool::new();
/// assert_eq!(tool.name(), "read_file");
/// ```
#[derive(Clone, Debug)]
pub struct ReadFileTool {
    allowed_dirs: Vec<PathBuf>,
    /// Maximum file size in bytes (default: 10 MB)
    max_size: u64,
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self {
            allowed_dirs: Vec::new(),
            max_size: DEFAULT_MAX_READ_SIZE,
        }
    }
}

impl ReadFileTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict file operations to specific directories
    #[must_use]
    pub fn with_allowed_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.allowed_dirs = dirs;
        self
    }

    /// Set maximum file size in bytes (default: 10 MB)
    ///
    /// Files larger than this limit will return an error to prevent memory exhaustion.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read the entire contents of a file. Provide the file path as input. \
         Returns the file contents as a string."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to read"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let file_path = match input {
            ToolInput::String(s) => s,
            ToolInput::Structured(obj) => obj
                .get("file_path")
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::tool_error("Missing or invalid 'file_path' field"))?
                .to_string(),
        };

        let path = PathBuf::from(&file_path);

        // Security check (async to avoid blocking on canonicalize - M-633)
        if !is_path_allowed_async(path.clone(), self.allowed_dirs.clone()).await {
            return Err(Error::tool_error(format!(
                "Access denied: '{file_path}' is outside allowed directories"
            )));
        }

        // Size check to prevent memory exhaustion
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| Error::tool_error(format!("Failed to read file metadata: {e}")))?;

        if metadata.len() > self.max_size {
            return Err(Error::tool_error(format!(
                "File too large: {} bytes exceeds maximum of {} bytes ({} MB). \
                 Use with_max_size() to increase the limit.",
                metadata.len(),
                self.max_size,
                self.max_size / (1024 * 1024)
            )));
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| Error::tool_error(format!("Failed to read file: {e}")))?;

        Ok(contents)
    }
}

// ============================================================================
// WriteFileTool
// ============================================================================

/// Tool for writing to files.
///
/// Supports both creating new files and appending to existing files.
/// Can be restricted to specific directories using `with_allowed_dirs()`.
///
/// # Input Format
///
/// ```json
/// {
///     "file_path": "path/to/file.txt",
///     "text": "Content to write",
///     "append": false  // Optional, defaults to false
/// }
/// ```
///
/// # Example
///
/// ```rust
/// use dashflow_file_tool::WriteFileTool;
/// use dashflow::core::tools::Tool;
///
/// let tool = WriteFileTool::new();
/// assert_eq!(tool.name(), "write_file");
/// ```
#[derive(Clone, Debug, Default)]
pub struct WriteFileTool {
    allowed_dirs: Vec<PathBuf>,
}

impl WriteFileTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict file operations to specific directories
    #[must_use]
    pub fn with_allowed_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.allowed_dirs = dirs;
        self
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Write text to a file. If the file exists, it will be overwritten unless \
         'append' is set to true. Provide 'file_path' and 'text' as input."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to write"
                },
                "text": {
                    "type": "string",
                    "description": "Text content to write to the file"
                },
                "append": {
                    "type": "boolean",
                    "description": "Whether to append to the file (default: false)",
                    "default": false
                }
            },
            "required": ["file_path", "text"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let (file_path, text, append) = match input {
            ToolInput::Structured(obj) => {
                let file_path = obj
                    .get("file_path")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing or invalid 'file_path' field"))?
                    .to_string();
                let text = obj
                    .get("text")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing or invalid 'text' field"))?
                    .to_string();
                let append = obj
                    .get("append")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                (file_path, text, append)
            }
            ToolInput::String(_) => {
                return Err(Error::tool_error(
                    "WriteFileTool requires structured input with 'file_path' and 'text'",
                ))
            }
        };

        let path = PathBuf::from(&file_path);

        // Security check (async to avoid blocking on canonicalize - M-633)
        if !is_path_allowed_async(path.clone(), self.allowed_dirs.clone()).await {
            return Err(Error::tool_error(format!(
                "Access denied: '{file_path}' is outside allowed directories"
            )));
        }

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::tool_error(format!("Failed to create directory: {e}")))?;
        }

        // Write or append
        if append {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await
                .map_err(|e| Error::tool_error(format!("Failed to open file: {e}")))?;
            file.write_all(text.as_bytes())
                .await
                .map_err(|e| Error::tool_error(format!("Failed to write file: {e}")))?;
            Ok(format!(
                "Successfully appended {} bytes to '{}'",
                text.len(),
                file_path
            ))
        } else {
            fs::write(path, text.as_bytes())
                .await
                .map_err(|e| Error::tool_error(format!("Failed to write file: {e}")))?;
            Ok(format!(
                "Successfully wrote {} bytes to '{}'",
                text.len(),
                file_path
            ))
        }
    }
}

// ============================================================================
// ListDirectoryTool
// ============================================================================

/// Tool for listing directory contents.
///
/// Returns a list of files and directories in the specified path.
/// Can be restricted to specific directories using `with_allowed_dirs()`.
///
/// # Input Format
///
/// - **String**: Directory path
/// - **Structured**: `{"dir_path": "path/to/directory"}`
///
/// # Example
///
/// ```rust
/// use dashflow_file_tool::ListDirectoryTool;
/// use dashflow::core::tools::Tool;
///
/// let tool = ListDirectoryTool::new();
/// assert_eq!(tool.name(), "list_directory");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ListDirectoryTool {
    allowed_dirs: Vec<PathBuf>,
}

impl ListDirectoryTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict operations to specific directories
    #[must_use]
    pub fn with_allowed_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.allowed_dirs = dirs;
        self
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &'static str {
        "list_directory"
    }

    fn description(&self) -> &'static str {
        "List all files and directories in a given directory path. \
         Returns a formatted list with file/directory indicators."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "dir_path": {
                    "type": "string",
                    "description": "Path to the directory to list"
                }
            },
            "required": ["dir_path"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let dir_path = match input {
            ToolInput::String(s) => s,
            ToolInput::Structured(obj) => obj
                .get("dir_path")
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::tool_error("Missing or invalid 'dir_path' field"))?
                .to_string(),
        };

        let path = PathBuf::from(&dir_path);

        // Security check (async to avoid blocking on canonicalize - M-633)
        if !is_path_allowed_async(path.clone(), self.allowed_dirs.clone()).await {
            return Err(Error::tool_error(format!(
                "Access denied: '{dir_path}' is outside allowed directories"
            )));
        }

        let mut entries = fs::read_dir(&path)
            .await
            .map_err(|e| Error::tool_error(format!("Failed to read directory: {e}")))?;

        let mut items = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::tool_error(format!("Failed to read entry: {e}")))?
        {
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| Error::tool_error(format!("Failed to read metadata: {e}")))?;
            let file_type = if metadata.is_dir() { "[DIR]" } else { "[FILE]" };
            let file_name = entry.file_name();
            items.push(format!("{} {}", file_type, file_name.to_string_lossy()));
        }

        items.sort();

        if items.is_empty() {
            Ok("Directory is empty".to_string())
        } else {
            Ok(format!("Contents of '{}':\n{}", dir_path, items.join("\n")))
        }
    }
}

// ============================================================================
// CopyFileTool
// ============================================================================

/// Tool for copying files.
///
/// Copies a file from source to destination. Creates parent directories if needed.
///
/// # Input Format
///
/// ```json
/// {
///     "source_path": "path/to/source.txt",
///     "destination_path": "path/to/dest.txt"
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct CopyFileTool {
    allowed_dirs: Vec<PathBuf>,
}

impl CopyFileTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict operations to specific directories
    #[must_use]
    pub fn with_allowed_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.allowed_dirs = dirs;
        self
    }
}

#[async_trait]
impl Tool for CopyFileTool {
    fn name(&self) -> &'static str {
        "copy_file"
    }

    fn description(&self) -> &'static str {
        "Copy a file from source path to destination path. \
         Creates parent directories if needed."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "source_path": {
                    "type": "string",
                    "description": "Path to the source file"
                },
                "destination_path": {
                    "type": "string",
                    "description": "Path to the destination file"
                }
            },
            "required": ["source_path", "destination_path"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let (source_path, dest_path) = match input {
            ToolInput::Structured(obj) => {
                let source = obj
                    .get("source_path")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing or invalid 'source_path' field"))?
                    .to_string();
                let dest = obj
                    .get("destination_path")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        Error::tool_error("Missing or invalid 'destination_path' field")
                    })?
                    .to_string();
                (source, dest)
            }
            ToolInput::String(_) => return Err(Error::tool_error(
                "CopyFileTool requires structured input with 'source_path' and 'destination_path'",
            )),
        };

        let source = PathBuf::from(&source_path);
        let dest = PathBuf::from(&dest_path);

        // Security checks (async to avoid blocking on canonicalize - M-633)
        if !is_path_allowed_async(source.clone(), self.allowed_dirs.clone()).await {
            return Err(Error::tool_error(format!(
                "Access denied: source '{source_path}' is outside allowed directories"
            )));
        }
        if !is_path_allowed_async(dest.clone(), self.allowed_dirs.clone()).await {
            return Err(Error::tool_error(format!(
                "Access denied: destination '{dest_path}' is outside allowed directories"
            )));
        }

        // Create parent directory if needed
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::tool_error(format!("Failed to create directory: {e}")))?;
        }

        fs::copy(&source, &dest)
            .await
            .map_err(|e| Error::tool_error(format!("Failed to copy file: {e}")))?;

        Ok(format!(
            "Successfully copied '{source_path}' to '{dest_path}'"
        ))
    }
}

// ============================================================================
// MoveFileTool
// ============================================================================

/// Tool for moving or renaming files.
///
/// Moves a file from source to destination. Can also be used to rename files.
///
/// # Input Format
///
/// ```json
/// {
///     "source_path": "path/to/source.txt",
///     "destination_path": "path/to/dest.txt"
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct MoveFileTool {
    allowed_dirs: Vec<PathBuf>,
}

impl MoveFileTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict operations to specific directories
    #[must_use]
    pub fn with_allowed_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.allowed_dirs = dirs;
        self
    }
}

#[async_trait]
impl Tool for MoveFileTool {
    fn name(&self) -> &'static str {
        "move_file"
    }

    fn description(&self) -> &'static str {
        "Move or rename a file from source path to destination path. \
         Creates parent directories if needed."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "source_path": {
                    "type": "string",
                    "description": "Path to the source file"
                },
                "destination_path": {
                    "type": "string",
                    "description": "Path to the destination file"
                }
            },
            "required": ["source_path", "destination_path"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let (source_path, dest_path) = match input {
            ToolInput::Structured(obj) => {
                let source = obj
                    .get("source_path")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing or invalid 'source_path' field"))?
                    .to_string();
                let dest = obj
                    .get("destination_path")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        Error::tool_error("Missing or invalid 'destination_path' field")
                    })?
                    .to_string();
                (source, dest)
            }
            ToolInput::String(_) => return Err(Error::tool_error(
                "MoveFileTool requires structured input with 'source_path' and 'destination_path'",
            )),
        };

        let source = PathBuf::from(&source_path);
        let dest = PathBuf::from(&dest_path);

        // Security checks (async to avoid blocking on canonicalize - M-633)
        if !is_path_allowed_async(source.clone(), self.allowed_dirs.clone()).await {
            return Err(Error::tool_error(format!(
                "Access denied: source '{source_path}' is outside allowed directories"
            )));
        }
        if !is_path_allowed_async(dest.clone(), self.allowed_dirs.clone()).await {
            return Err(Error::tool_error(format!(
                "Access denied: destination '{dest_path}' is outside allowed directories"
            )));
        }

        // Create parent directory if needed
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::tool_error(format!("Failed to create directory: {e}")))?;
        }

        fs::rename(&source, &dest)
            .await
            .map_err(|e| Error::tool_error(format!("Failed to move file: {e}")))?;

        Ok(format!(
            "Successfully moved '{source_path}' to '{dest_path}'"
        ))
    }
}

// ============================================================================
// DeleteFileTool
// ============================================================================

/// Tool for deleting files.
///
/// Permanently deletes a file. Use with caution.
///
/// # Input Format
///
/// - **String**: File path
/// - **Structured**: `{"file_path": "path/to/file.txt"}`
#[derive(Clone, Debug, Default)]
pub struct DeleteFileTool {
    allowed_dirs: Vec<PathBuf>,
}

impl DeleteFileTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict operations to specific directories
    #[must_use]
    pub fn with_allowed_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.allowed_dirs = dirs;
        self
    }
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &'static str {
        "delete_file"
    }

    fn description(&self) -> &'static str {
        "Delete a file permanently. Use with caution as this operation cannot be undone."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to delete"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let file_path = match input {
            ToolInput::String(s) => s,
            ToolInput::Structured(obj) => obj
                .get("file_path")
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::tool_error("Missing or invalid 'file_path' field"))?
                .to_string(),
        };

        let path = PathBuf::from(&file_path);

        // Security check (async to avoid blocking on canonicalize - M-633)
        if !is_path_allowed_async(path.clone(), self.allowed_dirs.clone()).await {
            return Err(Error::tool_error(format!(
                "Access denied: '{file_path}' is outside allowed directories"
            )));
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| Error::tool_error(format!("Failed to delete file: {e}")))?;

        Ok(format!("Successfully deleted '{file_path}'"))
    }
}

// ============================================================================
// FileSearchTool
// ============================================================================

/// Tool for searching files by name pattern.
///
/// Recursively searches a directory for files matching a pattern.
/// Supports glob-style wildcards (* and ?).
///
/// # Input Format
///
/// ```json
/// {
///     "dir_path": "path/to/search",
///     "pattern": "*.txt"
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct FileSearchTool {
    allowed_dirs: Vec<PathBuf>,
}

impl FileSearchTool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict operations to specific directories
    #[must_use]
    pub fn with_allowed_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.allowed_dirs = dirs;
        self
    }

    /// Recursively search directory for files matching pattern
    fn search_recursive<'a>(
        dir: &'a Path,
        pattern: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PathBuf>, Error>> + Send + 'a>> {
        Box::pin(async move {
            let mut results = Vec::new();
            let mut entries = fs::read_dir(dir)
                .await
                .map_err(|e| Error::tool_error(format!("Failed to read directory: {e}")))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| Error::tool_error(format!("Failed to read entry: {e}")))?
            {
                let path = entry.path();
                let metadata = entry
                    .metadata()
                    .await
                    .map_err(|e| Error::tool_error(format!("Failed to read metadata: {e}")))?;

                if metadata.is_dir() {
                    // Recurse into subdirectory
                    if let Ok(mut subdir_results) = Self::search_recursive(&path, pattern).await {
                        results.append(&mut subdir_results);
                    }
                } else if metadata.is_file() {
                    // Check if file name matches pattern
                    if let Some(file_name) = path.file_name() {
                        if let Some(name_str) = file_name.to_str() {
                            if Self::matches_pattern(name_str, pattern) {
                                results.push(path);
                            }
                        }
                    }
                }
            }

            Ok(results)
        })
    }

    /// Simple glob-style pattern matching (supports * and ?)
    fn matches_pattern(name: &str, pattern: &str) -> bool {
        // Convert glob pattern to regex
        let regex_pattern = pattern
            .replace('.', "\\.")
            .replace('*', ".*")
            .replace('?', ".");
        let regex_pattern = format!("^{regex_pattern}$");

        // Use bounded regex compilation to prevent ReDoS on malicious patterns
        if let Ok(re) = regex::RegexBuilder::new(&regex_pattern)
            .size_limit(256 * 1024) // 256KB limit
            .dfa_size_limit(256 * 1024)
            .build()
        {
            re.is_match(name)
        } else {
            false
        }
    }
}

#[async_trait]
impl Tool for FileSearchTool {
    fn name(&self) -> &'static str {
        "file_search"
    }

    fn description(&self) -> &'static str {
        "Search for files in a directory matching a pattern. \
         Supports wildcards: * (any characters) and ? (single character). \
         Searches recursively through subdirectories."
    }

    fn args_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "dir_path": {
                    "type": "string",
                    "description": "Directory path to search in"
                },
                "pattern": {
                    "type": "string",
                    "description": "File name pattern with wildcards (e.g., '*.txt', 'file?.log')"
                }
            },
            "required": ["dir_path", "pattern"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String, Error> {
        let (dir_path, pattern) = match input {
            ToolInput::Structured(obj) => {
                let dir = obj
                    .get("dir_path")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing or invalid 'dir_path' field"))?
                    .to_string();
                let pat = obj
                    .get("pattern")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| Error::tool_error("Missing or invalid 'pattern' field"))?
                    .to_string();
                (dir, pat)
            }
            ToolInput::String(_) => {
                return Err(Error::tool_error(
                    "FileSearchTool requires structured input with 'dir_path' and 'pattern'",
                ))
            }
        };

        let path = PathBuf::from(&dir_path);

        // Security check (async to avoid blocking on canonicalize - M-633)
        if !is_path_allowed_async(path.clone(), self.allowed_dirs.clone()).await {
            return Err(Error::tool_error(format!(
                "Access denied: '{dir_path}' is outside allowed directories"
            )));
        }

        let results = Self::search_recursive(&path, &pattern).await?;

        if results.is_empty() {
            Ok(format!(
                "No files matching '{pattern}' found in '{dir_path}'"
            ))
        } else {
            let file_list: Vec<String> = results
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect();
            Ok(format!(
                "Found {} file(s) matching '{}':\n{}",
                results.len(),
                pattern,
                file_list.join("\n")
            ))
        }
    }
}
