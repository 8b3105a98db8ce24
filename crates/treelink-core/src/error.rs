//! Error types for treelink-core

use std::path::PathBuf;

/// Result type for treelink-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in treelink-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration failed validation
    #[error("Invalid configuration: {message}")]
    ConfigInvalid { message: String },

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A glob pattern could not be compiled or expanded
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// The configured source tree is not among the discovered trees
    #[error("Source tree '{selector}' not found among working trees")]
    SourceNotFound { selector: String },

    /// The source tree exists in the listing but cannot be reached on disk
    #[error("Source tree is not reachable at {path}")]
    SourceUnreachable { path: PathBuf },

    /// A target tree root cannot be reached on disk
    #[error("Target tree '{tree}' is not reachable at {path}")]
    TargetUnreachable { tree: String, path: PathBuf },

    /// A lifecycle hook exited unsuccessfully
    #[error("Hook '{event}' failed ({command}): {message}")]
    HookFailed {
        event: String,
        command: String,
        message: String,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from treelink-fs
    #[error(transparent)]
    Fs(#[from] treelink_fs::Error),

    /// Git error from treelink-git
    #[error(transparent)]
    Git(#[from] treelink_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
        }
    }
}
