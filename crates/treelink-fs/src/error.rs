//! Error types for treelink-fs

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Result type for treelink-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// The filesystem operation that was being attempted when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FsOperation {
    CreateDir,
    Symlink,
    Unlink,
    ReadLink,
    ReadDir,
    Write,
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateDir => "create-dir",
            Self::Symlink => "symlink",
            Self::Unlink => "unlink",
            Self::ReadLink => "read-link",
            Self::ReadDir => "read-dir",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in treelink-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{operation} failed at {path}: {source}")]
    Operation {
        operation: FsOperation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to replace {path}: {message}")]
    Conflict { path: PathBuf, message: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn op(operation: FsOperation, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Operation {
            operation,
            path: path.into(),
            source,
        }
    }

    /// The operation that failed, when there was one.
    pub fn operation(&self) -> Option<FsOperation> {
        match self {
            Self::Operation { operation, .. } => Some(*operation),
            Self::Conflict { .. } => Some(FsOperation::Unlink),
            Self::LockFailed { .. } => Some(FsOperation::Write),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Operation { path, .. } | Self::Conflict { path, .. } | Self::LockFailed { path } => {
                path
            }
        }
    }

    /// Raw OS error code of the underlying failure, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Operation { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}
