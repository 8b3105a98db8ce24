//! Per-tree link status

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;
use treelink_fs::{LinkState, NormalizedPath, find_symlinks, inspect, points_to};

use crate::context::WorkingTree;

/// Disjoint classification of every shared or linked file in one target tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub tree: String,
    pub path: PathBuf,
    pub reachable: bool,
    /// Links that resolve correctly
    pub valid: Vec<NormalizedPath>,
    /// Links whose destination does not exist
    pub broken: Vec<NormalizedPath>,
    /// Configured files with nothing at the link location
    pub missing: Vec<NormalizedPath>,
    /// Plain entries, or configured links resolving somewhere other than the source
    pub conflicting: Vec<NormalizedPath>,
}

impl LinkStatus {
    /// True when every configured file is correctly linked.
    pub fn is_clean(&self) -> bool {
        self.reachable
            && self.broken.is_empty()
            && self.missing.is_empty()
            && self.conflicting.is_empty()
    }
}

/// Status of each target tree, in the order given.
///
/// The file universe is the configured `files` plus every link actually
/// found in the tree, so a link left behind after a file is dropped from
/// configuration still shows up.
pub fn link_status(
    source: &WorkingTree,
    targets: &[WorkingTree],
    files: &[NormalizedPath],
) -> Vec<LinkStatus> {
    targets
        .iter()
        .filter(|t| t.path != source.path)
        .map(|tree| tree_status(source, tree, files))
        .collect()
}

fn tree_status(source: &WorkingTree, tree: &WorkingTree, files: &[NormalizedPath]) -> LinkStatus {
    let mut status = LinkStatus {
        tree: tree.name.clone(),
        path: tree.path.clone(),
        reachable: tree.path.is_dir(),
        ..LinkStatus::default()
    };

    let configured: BTreeSet<&NormalizedPath> = files.iter().collect();
    let discovered = find_symlinks(&tree.path);
    let universe: BTreeSet<&NormalizedPath> =
        configured.iter().copied().chain(discovered.iter()).collect();

    for file in universe {
        let target_path = file.under(&tree.path);
        let bucket = match inspect(&target_path) {
            LinkState::Absent => &mut status.missing,
            LinkState::BrokenLink => &mut status.broken,
            LinkState::Plain => &mut status.conflicting,
            LinkState::ValidLink => {
                if !configured.contains(file) || points_to(&target_path, &file.under(&source.path))
                {
                    &mut status.valid
                } else {
                    &mut status.conflicting
                }
            }
        };
        bucket.push(file.clone());
    }

    tracing::debug!(
        tree = %status.tree,
        valid = status.valid.len(),
        broken = status.broken.len(),
        missing = status.missing.len(),
        conflicting = status.conflicting.len(),
        "computed link status"
    );
    status
}
