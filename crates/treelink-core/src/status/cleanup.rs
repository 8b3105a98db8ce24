//! Removal of broken links left behind by earlier syncs

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;
use treelink_fs::io::remove_link;
use treelink_fs::{
    LinkState, NormalizedPath, find_symlinks, inspect, link_destination, resolves_within,
};

use crate::context::WorkingTree;
use crate::sync::ActionError;

/// A broken link that was (or in preview, would be) removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedLink {
    pub tree: String,
    pub file: NormalizedPath,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub dry_run: bool,
    pub removed: Vec<CleanedLink>,
    pub errors: Vec<ActionError>,
}

impl CleanupReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Remove broken links in `targets` that sync produced.
///
/// A broken link qualifies when its relative path is one of `files` or its
/// stored destination lies inside the source tree. Plain entries and links
/// that still resolve are never touched.
pub fn cleanup(
    source: &WorkingTree,
    targets: &[WorkingTree],
    files: &[NormalizedPath],
    dry_run: bool,
) -> CleanupReport {
    let mut report = CleanupReport {
        dry_run,
        ..CleanupReport::default()
    };
    let configured: BTreeSet<&NormalizedPath> = files.iter().collect();

    for tree in targets.iter().filter(|t| t.path != source.path) {
        let discovered = find_symlinks(&tree.path);
        let candidates: BTreeSet<&NormalizedPath> =
            configured.iter().copied().chain(discovered.iter()).collect();

        for file in candidates {
            let path = file.under(&tree.path);
            if inspect(&path) != LinkState::BrokenLink {
                continue;
            }
            if !resolves_within(&path, &tree.path) {
                tracing::debug!(tree = %tree.name, file = %file, "skipping link reached through another tree");
                continue;
            }
            let into_source = link_destination(&path).is_some_and(|d| d.starts_with(&source.path));
            if !configured.contains(file) && !into_source {
                tracing::debug!(tree = %tree.name, file = %file, "leaving foreign broken link");
                continue;
            }

            if !dry_run && let Err(e) = remove_link(&path) {
                tracing::warn!(tree = %tree.name, file = %file, error = %e, "failed to remove broken link");
                report
                    .errors
                    .push(ActionError::at(&tree.name, file, &path, &e.into()));
                continue;
            }
            tracing::info!(tree = %tree.name, file = %file, dry_run, "removed broken link");
            report.removed.push(CleanedLink {
                tree: tree.name.clone(),
                file: file.clone(),
                path,
            });
        }
    }
    report
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::os::unix::fs::symlink;
    use treelink_test_utils::TestTrees;

    fn run(trees: &TestTrees, configured: &[&str], dry_run: bool) -> CleanupReport {
        let source = WorkingTree::new("main", trees.source());
        let target = WorkingTree::new("feature", trees.target("feature"));
        let files: Vec<NormalizedPath> = configured.iter().map(NormalizedPath::new).collect();
        cleanup(&source, &[target], &files, dry_run)
    }

    #[test]
    fn test_removes_configured_broken_link() {
        let trees = TestTrees::new(&["feature"]);
        let link = trees.target("feature").join(".env");
        symlink("../main/.env", &link).unwrap();

        let report = run(&trees, &[".env"], false);
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].file.as_str(), ".env");
        assert!(fs::symlink_metadata(&link).is_err());
    }

    #[test]
    fn test_removes_unconfigured_link_into_source() {
        let trees = TestTrees::new(&["feature"]);
        let link = trees.target("feature").join("old.yml");
        symlink(trees.source().join("old.yml"), &link).unwrap();

        let report = run(&trees, &[], false);
        assert_eq!(report.removed.len(), 1);
        assert!(fs::symlink_metadata(&link).is_err());
    }

    #[test]
    fn test_keeps_foreign_broken_links_valid_links_and_plain_files() {
        let trees = TestTrees::new(&["feature"]);
        let src = trees.write_source("ok", "ok");
        let dir = trees.target("feature");
        symlink("/definitely/not/here", dir.join("foreign")).unwrap();
        symlink(&src, dir.join("ok")).unwrap();
        trees.write_target("feature", "plain", "local");

        let report = run(&trees, &["ok", "plain"], false);
        assert!(report.removed.is_empty());
        assert!(fs::symlink_metadata(dir.join("foreign")).is_ok());
        assert!(dir.join("ok").exists());
        assert_eq!(trees.read_target("feature", "plain"), "local");
    }

    #[test]
    fn test_dry_run_reports_without_removing() {
        let trees = TestTrees::new(&["feature"]);
        let link = trees.target("feature").join(".env");
        symlink("../main/.env", &link).unwrap();

        let report = run(&trees, &[".env"], true);
        assert!(report.dry_run);
        assert_eq!(report.removed.len(), 1);
        assert!(fs::symlink_metadata(&link).is_ok());
    }

    #[test]
    fn test_never_removes_through_directory_link_into_source() {
        let trees = TestTrees::new(&["feature"]);
        fs::create_dir_all(trees.source().join(".vscode")).unwrap();
        let source_link = trees.source().join(".vscode/stale.json");
        symlink("gone.json", &source_link).unwrap();
        symlink("../main/.vscode", trees.target("feature").join(".vscode")).unwrap();

        let report = run(&trees, &[".vscode/stale.json"], false);
        assert!(report.removed.is_empty());
        assert!(fs::symlink_metadata(&source_link).is_ok());
    }
}
