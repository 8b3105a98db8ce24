//! Error types for treelink-git

use std::path::PathBuf;

/// Result type for treelink-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in treelink-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not inside a git working tree: {path}")]
    NotARepository { path: PathBuf },

    #[error("Repository at {path} is bare and has no working tree")]
    BareRepository { path: PathBuf },

    #[error("`git {command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Failed to run git: {0}")]
    Io(#[from] std::io::Error),
}
