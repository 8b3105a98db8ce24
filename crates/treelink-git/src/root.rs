//! Repository root resolution

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};

use crate::{Error, Result};

/// Resolve the top-level directory of the working tree containing `start`.
///
/// For a linked worktree this is the worktree's own directory, not the
/// primary checkout.
pub fn discover_root(start: &Path) -> Result<PathBuf> {
    let repo = Repository::discover(start).map_err(|e| match e.code() {
        ErrorCode::NotFound => Error::NotARepository {
            path: start.to_path_buf(),
        },
        _ => Error::Git(e),
    })?;

    let workdir = repo.workdir().ok_or_else(|| Error::BareRepository {
        path: repo.path().to_path_buf(),
    })?;

    let root = dunce::canonicalize(workdir).unwrap_or_else(|_| workdir.to_path_buf());
    tracing::debug!(root = %root.display(), "resolved repository root");
    Ok(root)
}
