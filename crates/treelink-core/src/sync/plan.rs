//! Action planning
//!
//! Planning reads on-disk state but never changes it, so the same function
//! backs both preview and live runs.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use treelink_fs::{
    LinkState, NormalizedPath, inspect, points_to, relative_link_text, resolves_within, same_entry,
};

use crate::config::LinkMode;
use crate::context::WorkingTree;

/// What the reconciler should do for one (tree, file) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Update,
    Skip,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Why an action was classified the way it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionReason {
    NotLinked,
    SourceMissing,
    AlreadyCorrect,
    PointsElsewhere,
    OverwriteDisabled,
    Overwriting,
    /// The target path leads out of its tree, through a directory link
    OutsideTree,
}

impl fmt::Display for ActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotLinked => "not linked yet",
            Self::SourceMissing => "source missing",
            Self::AlreadyCorrect => "already correct",
            Self::PointsElsewhere => "points elsewhere",
            Self::OverwriteDisabled => "exists, overwrite disabled",
            Self::Overwriting => "overwriting",
            Self::OutsideTree => "resolves outside the target tree",
        };
        f.write_str(text)
    }
}

/// A single planned link operation. Immutable once planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncAction {
    /// Name of the target tree
    pub tree: String,
    /// Root of the target tree; every other path here lives under it or the source
    pub tree_root: PathBuf,
    pub relative_file: NormalizedPath,
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    /// Text stored in the link
    pub link_text: PathBuf,
    pub kind: ActionKind,
    pub reason: ActionReason,
    pub is_directory: bool,
}

/// Every action for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub source: WorkingTree,
    pub targets: Vec<WorkingTree>,
    pub actions: Vec<SyncAction>,
}

impl Plan {
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind == kind).count()
    }

    /// True when applying the plan would change nothing.
    pub fn is_noop(&self) -> bool {
        self.actions.iter().all(|a| a.kind == ActionKind::Skip)
    }

}

/// Inputs that shape classification beyond the trees and files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    pub link_mode: LinkMode,
    pub overwrite: bool,
}

/// Classify every (target tree, file) pair.
///
/// Trees are visited in the order given, files in the order given (callers
/// pass the sorted output of pattern resolution). Any target sharing the
/// source's path is skipped entirely.
pub fn plan(
    source: &WorkingTree,
    targets: &[WorkingTree],
    files: &[NormalizedPath],
    options: PlanOptions,
) -> Plan {
    let targets: Vec<WorkingTree> = targets
        .iter()
        .filter(|t| t.path != source.path)
        .cloned()
        .collect();

    let mut actions = Vec::with_capacity(targets.len() * files.len());
    for tree in &targets {
        for file in files {
            let action = plan_one(source, tree, file, options);
            tracing::debug!(
                tree = %action.tree,
                file = %action.relative_file,
                kind = %action.kind,
                reason = %action.reason,
                "planned action"
            );
            actions.push(action);
        }
    }

    Plan {
        source: source.clone(),
        targets,
        actions,
    }
}

fn plan_one(
    source: &WorkingTree,
    tree: &WorkingTree,
    file: &NormalizedPath,
    options: PlanOptions,
) -> SyncAction {
    let source_path = file.under(&source.path);
    let target_path = file.under(&tree.path);
    let link_text = link_text_for(&source_path, &target_path, options.link_mode);
    let is_directory = source_path.is_dir();

    let (kind, reason) = if !source_path.exists() {
        (ActionKind::Skip, ActionReason::SourceMissing)
    } else if escapes_tree(&target_path, &tree.path, &source_path) {
        (ActionKind::Skip, ActionReason::OutsideTree)
    } else {
        match inspect(&target_path) {
            LinkState::Absent => (ActionKind::Create, ActionReason::NotLinked),
            state if state.is_link() => {
                if points_to(&target_path, &source_path) {
                    (ActionKind::Skip, ActionReason::AlreadyCorrect)
                } else {
                    (ActionKind::Update, ActionReason::PointsElsewhere)
                }
            }
            LinkState::Plain if options.overwrite => {
                (ActionKind::Update, ActionReason::Overwriting)
            }
            _ => (ActionKind::Skip, ActionReason::OverwriteDisabled),
        }
    };

    SyncAction {
        tree: tree.name.clone(),
        tree_root: tree.path.clone(),
        relative_file: file.clone(),
        source_path,
        target_path,
        link_text,
        kind,
        reason,
        is_directory,
    }
}

/// Whether touching `target_path` could reach something outside `tree_root`.
///
/// True when a directory link on the way leaves the tree, or when the path
/// already is the source entry itself.
pub(crate) fn escapes_tree(target_path: &Path, tree_root: &Path, source_path: &Path) -> bool {
    !resolves_within(target_path, tree_root)
        || (inspect(target_path) == LinkState::Plain && same_entry(target_path, source_path))
}

/// Text to store in a link at `target_path` reaching `source_path`.
pub fn link_text_for(source_path: &Path, target_path: &Path, mode: LinkMode) -> PathBuf {
    let resolved_source =
        dunce::canonicalize(source_path).unwrap_or_else(|_| source_path.to_path_buf());
    match mode {
        LinkMode::Absolute => resolved_source,
        LinkMode::Relative => {
            let link_dir = target_path.parent().unwrap_or_else(|| Path::new("/"));
            relative_link_text(link_dir, &resolved_source)
        }
    }
}
