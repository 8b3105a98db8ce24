//! Request-scoped run context
//!
//! Holds the resolved repository root and the working trees discovered for
//! one invocation. Built once up front and passed down explicitly, so there
//! is no process-wide cache to invalidate.

use std::path::{Path, PathBuf};

use serde::Serialize;
use treelink_git::WorktreeInfo;

use crate::{Error, Result};

/// One working copy of the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingTree {
    pub path: PathBuf,
    pub name: String,
    pub branch: Option<String>,
    pub revision: Option<String>,
    pub is_primary: bool,
    pub is_source: bool,
}

impl WorkingTree {
    /// A tree with just a name and path, as used by fixtures.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            path: canonical_or_self(&path),
            name: name.into(),
            branch: None,
            revision: None,
            is_primary: false,
            is_source: false,
        }
    }

    /// Whether `selector` names this tree by name, branch, or path.
    pub fn matches(&self, selector: &str) -> bool {
        if self.name == selector || self.branch.as_deref() == Some(selector) {
            return true;
        }
        let candidate = Path::new(selector);
        candidate.is_absolute() && canonical_or_self(candidate) == self.path
    }
}

impl From<WorktreeInfo> for WorkingTree {
    fn from(info: WorktreeInfo) -> Self {
        let name = info.name();
        Self {
            path: canonical_or_self(&info.path),
            name,
            branch: info.branch,
            revision: info.head,
            is_primary: info.is_main,
            is_source: false,
        }
    }
}

/// Root path plus working trees for one invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    root: PathBuf,
    trees: Vec<WorkingTree>,
}

impl RunContext {
    pub fn new(root: impl Into<PathBuf>, mut trees: Vec<WorkingTree>) -> Self {
        let root = root.into();
        disambiguate_names(&mut trees);
        Self {
            root: canonical_or_self(&root),
            trees,
        }
    }

    /// Resolve the repository root containing `start` and list its trees.
    pub fn discover(start: &Path) -> Result<Self> {
        let root = treelink_git::discover_root(start)?;
        let trees = treelink_git::list_worktrees(&root)?
            .into_iter()
            .map(WorkingTree::from)
            .collect();
        Ok(Self::new(root, trees))
    }

    /// Root of the working tree the invocation started in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn trees(&self) -> &[WorkingTree] {
        &self.trees
    }

    /// Mark the tree matching `selector` (or the primary tree) as source.
    ///
    /// Without a selector the primary tree wins, falling back to the first
    /// listed tree when git reported no primary (bare repositories).
    pub fn select_source(&mut self, selector: Option<&str>) -> Result<&WorkingTree> {
        let index = match selector {
            Some(sel) => self.trees.iter().position(|t| t.matches(sel)),
            None => self
                .trees
                .iter()
                .position(|t| t.is_primary)
                .or_else(|| (!self.trees.is_empty()).then_some(0)),
        }
        .ok_or_else(|| Error::SourceNotFound {
            selector: selector.unwrap_or("<primary>").to_string(),
        })?;

        for (i, tree) in self.trees.iter_mut().enumerate() {
            tree.is_source = i == index;
        }
        Ok(&self.trees[index])
    }

    /// The tree currently marked as source.
    pub fn source(&self) -> Option<&WorkingTree> {
        self.trees.iter().find(|t| t.is_source)
    }

    /// Every tree that is not the source, deduplicated by path, in discovery order.
    pub fn targets(&self) -> Vec<WorkingTree> {
        let source_path = self.source().map(|s| s.path.clone());
        let mut seen: Vec<&Path> = Vec::new();
        let mut out = Vec::new();
        for tree in &self.trees {
            if tree.is_source || Some(&tree.path) == source_path.as_ref() {
                continue;
            }
            if seen.contains(&tree.path.as_path()) {
                continue;
            }
            seen.push(&tree.path);
            out.push(tree.clone());
        }
        out
    }
}

/// Detached trees are named after their directory, so two of them in
/// different parents can share a name. Those fall back to their full path.
fn disambiguate_names(trees: &mut [WorkingTree]) {
    let clashing: Vec<bool> = trees
        .iter()
        .map(|tree| {
            trees
                .iter()
                .any(|other| other.name == tree.name && other.path != tree.path)
        })
        .collect();
    for (tree, clashes) in trees.iter_mut().zip(clashing) {
        if clashes {
            tracing::debug!(name = %tree.name, path = %tree.path.display(), "tree name is ambiguous, using its path");
            tree.name = tree.path.display().to_string();
        }
    }
}

fn canonical_or_self(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
