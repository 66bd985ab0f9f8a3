//! Utilities for file management tools.
//!
//! This module provides path validation and security utilities to ensure
//! file operations are scoped to allowed directories.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error message template for invalid paths
pub const INVALID_PATH_TEMPLATE: &str =
    "Error: Access denied to {arg_name}: {value}. Permission granted exclusively to the current working directory";

/// Error type for file validation failures
#[derive(Debug, Error)]
#[error("Path {path} is outside of the allowed directory {root}")]
pub struct FileValidationError {
    /// The path that failed validation
    pub path: String,
    /// The root directory that was expected
    pub root: String,
}

/// Get a validated relative path, ensuring it's within the root directory.
///
/// This function resolves the path relative to the root and ensures the final
/// path is within the root directory. It prevents directory traversal attacks.
///
/// # Arguments
///
/// * `root` - The root directory to validate against
/// * `user_path` - The user-provided path (relative or absolute)
///
/// # Returns
///
/// The resolved path if it's within the root directory.
///
/// # Errors
///
/// Returns `FileValidationError` if the path is outside the root directory.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dashflow_file_management::utils::get_validated_relative_path;
///
/// let root = Path::new("/tmp/sandbox");
/// let result = get_validated_relative_path(root, "file.txt");
/// // Returns Ok(/tmp/sandbox/file.txt) if /tmp/sandbox exists
/// ```
pub fn get_validated_relative_path(
    root: &Path,
    user_path: &str,
) -> Result<PathBuf, FileValidationError> {
    // Resolve root to canonical form if it exists
    let root_resolved = if root.exists() {
        root.canonicalize().unwrap_or_else(|_| root.to_path_buf())
    } else {
        root.to_path_buf()
    };

    // Construct the full path
    let full_path = root_resolved.join(user_path);

    // Resolve the full path (this handles .. and . in the path)
    let full_path_resolved = if full_path.exists() {
        full_path
            .canonicalize()
            .unwrap_or_else(|_| full_path.clone())
    } else {
        // For non-existent paths, we need to manually resolve .. and .
        let mut resolved = PathBuf::new();
        for component in full_path.components() {
            match component {
                std::path::Component::ParentDir => {
                    resolved.pop();
                }
                std::path::Component::CurDir => {
                    // Skip
                }
                _ => {
                    resolved.push(component);
                }
            }
        }
        resolved
    };

    // Check if the resolved path starts with the root
    if !full_path_resolved.starts_with(&root_resolved) {
        return Err(FileValidationError {
            path: user_path.to_string(),
            root: root.display().to_string(),
        });
    }

    Ok(full_path_resolved)
}

/// Format an invalid path error message
#[must_use]
pub fn format_invalid_path_error(arg_name: &str, value: &str) -> String {
    INVALID_PATH_TEMPLATE
        .replace("{arg_name}", arg_name)
        .replace("{value}", value)
}
