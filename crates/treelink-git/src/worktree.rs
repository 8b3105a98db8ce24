//! Working tree listing via `git worktree list --porcelain`

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::{Error, Result};

/// Information about a working tree as reported by git.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorktreeInfo {
    /// Filesystem path to the working tree
    pub path: PathBuf,

    /// Branch checked out, without the `refs/heads/` prefix
    pub branch: Option<String>,

    /// Commit checked out (`HEAD` line), if any
    pub head: Option<String>,

    /// Whether this is the primary working tree (listed first by git)
    pub is_main: bool,
}

impl WorktreeInfo {
    /// Display name: the branch when one is checked out, else the directory name.
    pub fn name(&self) -> String {
        self.branch.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string())
        })
    }
}

/// List every non-bare working tree of the repository containing `dir`.
pub fn list_worktrees(dir: &Path) -> Result<Vec<WorktreeInfo>> {
    let output = Command::new("git")
        .args(["worktree", "list", "--porcelain"])
        .current_dir(dir)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::CommandFailed {
            command: "worktree list --porcelain".to_string(),
            message: stderr.trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let worktrees = parse_porcelain(&stdout);
    tracing::debug!(count = worktrees.len(), "discovered working trees");
    Ok(worktrees)
}

/// Parse porcelain output into working tree records.
///
/// Records are separated by blank lines; bare entries are dropped. The
/// first record git prints is the primary working tree.
pub fn parse_porcelain(output: &str) -> Vec<WorktreeInfo> {
    let mut worktrees = Vec::new();
    let mut current: Option<WorktreeInfo> = None;
    let mut is_bare = false;
    let mut seen_first = false;

    let mut flush = |current: &mut Option<WorktreeInfo>, is_bare: &mut bool| {
        if let Some(info) = current.take()
            && !*is_bare
        {
            worktrees.push(info);
        }
        *is_bare = false;
    };

    for line in output.lines() {
        if let Some(path_str) = line.strip_prefix("worktree ") {
            flush(&mut current, &mut is_bare);
            current = Some(WorktreeInfo {
                path: PathBuf::from(path_str),
                branch: None,
                head: None,
                is_main: !seen_first,
            });
            seen_first = true;
        } else if let Some(info) = current.as_mut() {
            if let Some(sha) = line.strip_prefix("HEAD ") {
                info.head = Some(sha.to_string());
            } else if let Some(branch) = line.strip_prefix("branch ") {
                let short = branch.strip_prefix("refs/heads/").unwrap_or(branch);
                info.branch = Some(short.to_string());
            } else if line == "bare" {
                is_bare = true;
            }
        }
    }
    flush(&mut current, &mut is_bare);

    worktrees
}
