//! Composed health check
//!
//! Each check is independent: a failing configuration still lets the
//! source and target checks run against the primary tree, so one
//! invocation reports everything that needs fixing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use treelink_fs::NormalizedPath;

use super::links::link_status;
use crate::config::SyncConfig;
use crate::context::RunContext;
use crate::sync::resolve_patterns;
use crate::Result;

/// A broken link in one tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub tree: String,
    pub file: NormalizedPath,
}

/// A path the check could not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionIssue {
    pub path: PathBuf,
    pub message: String,
}

/// A target tree whose root is gone or not a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreachableTree {
    pub tree: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    pub config_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub source_reachable: bool,
    pub unreachable_targets: Vec<UnreachableTree>,
    /// Literal shared paths that do not exist in the source tree
    pub missing_sources: Vec<NormalizedPath>,
    pub broken_links: Vec<BrokenLink>,
    pub permission_errors: Vec<PermissionIssue>,
    /// One line per problem category
    pub remediation: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.config_valid
            && self.source_reachable
            && self.unreachable_targets.is_empty()
            && self.missing_sources.is_empty()
            && self.broken_links.is_empty()
            && self.permission_errors.is_empty()
    }
}

/// Run every check against `ctx` using `config` (or its load error).
pub fn diagnose(mut ctx: RunContext, config: Result<SyncConfig>) -> HealthReport {
    let mut report = HealthReport::default();

    let config = match config.and_then(|c| c.validate().map(|()| c)) {
        Ok(config) => {
            report.config_valid = true;
            Some(config)
        }
        Err(e) => {
            report.config_error = Some(e.to_string());
            None
        }
    };

    let selector = config.as_ref().and_then(|c| c.source_worktree.as_deref());
    let source = match ctx.select_source(selector) {
        Ok(source) => source.clone(),
        Err(e) => {
            // Keep a config error ahead of the source error it caused.
            if report.config_error.is_none() {
                report.config_valid = false;
                report.config_error = Some(e.to_string());
            }
            report.remediation = remediation(&report);
            return report;
        }
    };
    report.source = Some(source.path.clone());
    report.source_reachable = source.path.is_dir();
    if !report.source_reachable {
        report.remediation = remediation(&report);
        return report;
    }

    let targets = ctx.targets();
    for tree in &targets {
        if !tree.path.is_dir() {
            report.unreachable_targets.push(UnreachableTree {
                tree: tree.name.clone(),
                path: tree.path.clone(),
            });
        }
        check_readable(&tree.path, &mut report.permission_errors);
    }

    if let Some(config) = &config {
        report.missing_sources = missing_literals(&source.path, &config.shared_files);
        match resolve_patterns(&source.path, &config.shared_files, &config.ignore_patterns) {
            Ok(files) => {
                for file in &files {
                    check_readable(&file.under(&source.path), &mut report.permission_errors);
                }
                for status in link_status(&source, &targets, &files) {
                    if !status.reachable {
                        continue;
                    }
                    for file in status.broken {
                        report.broken_links.push(BrokenLink {
                            tree: status.tree.clone(),
                            file,
                        });
                    }
                }
            }
            Err(e) => {
                report.config_valid = false;
                report.config_error = Some(e.to_string());
            }
        }
    }

    report.remediation = remediation(&report);
    tracing::debug!(healthy = report.is_healthy(), "health check complete");
    report
}

/// Patterns without glob syntax name one file; report those that are absent.
fn missing_literals(source_root: &Path, patterns: &[String]) -> Vec<NormalizedPath> {
    let mut missing: Vec<NormalizedPath> = patterns
        .iter()
        .filter(|p| !p.contains(['*', '?', '[']))
        .map(NormalizedPath::new)
        .filter(|p| fs::symlink_metadata(p.under(source_root)).is_err())
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

fn check_readable(path: &Path, issues: &mut Vec<PermissionIssue>) {
    let result = if path.is_dir() {
        fs::read_dir(path).map(|_| ())
    } else {
        fs::File::open(path).map(|_| ())
    };
    if let Err(e) = result
        && e.kind() == ErrorKind::PermissionDenied
    {
        issues.push(PermissionIssue {
            path: path.to_path_buf(),
            message: e.to_string(),
        });
    }
}

fn remediation(report: &HealthReport) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &report.config_error {
        lines.push(format!("fix the configuration: {error}"));
    }
    if report.source.is_some() && !report.source_reachable {
        lines.push("restore the source tree or set sourceWorktree to an existing tree".to_string());
    }
    if !report.unreachable_targets.is_empty() {
        lines.push(
            "run `git worktree prune` to drop stale trees or restore their directories"
                .to_string(),
        );
    }
    for file in &report.missing_sources {
        lines.push(format!(
            "remove {file} from the pattern list or create it in the source tree"
        ));
    }
    if !report.broken_links.is_empty() {
        lines.push("run cleanup to remove broken links".to_string());
    }
    if !report.permission_errors.is_empty() {
        lines.push("grant read access to the listed paths".to_string());
    }
    lines
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::Error;
    use crate::context::WorkingTree;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::symlink;
    use treelink_test_utils::TestTrees;

    fn context(trees: &TestTrees) -> RunContext {
        let mut all = vec![WorkingTree {
            is_primary: true,
            ..WorkingTree::new("main", trees.source())
        }];
        for (name, path) in trees.targets() {
            all.push(WorkingTree::new(name.clone(), path.clone()));
        }
        RunContext::new(trees.source(), all)
    }

    #[test]
    fn test_healthy_tree() {
        let trees = TestTrees::new(&["feature"]);
        let src = trees.write_source(".env", "x");
        symlink(&src, trees.target("feature").join(".env")).unwrap();

        let report = diagnose(context(&trees), Ok(SyncConfig::with_patterns([".env"])));
        assert!(report.is_healthy(), "{report:?}");
        assert!(report.remediation.is_empty());
    }

    #[test]
    fn test_invalid_config_still_checks_trees() {
        let trees = TestTrees::new(&["feature"]);
        let report = diagnose(
            context(&trees),
            Err(Error::config("sharedFiles must contain at least one pattern")),
        );
        assert!(!report.config_valid);
        assert!(report.source_reachable);
        assert!(report.remediation[0].starts_with("fix the configuration"));
        assert!(!report.is_healthy());
    }

    #[test]
    fn test_missing_source_and_broken_link_get_remediation() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source("present.txt", "x");
        symlink("../main/gone.txt", trees.target("feature").join("gone.txt")).unwrap();

        let config = SyncConfig::with_patterns(["present.txt", "gone.txt", "*.md"]);
        let report = diagnose(context(&trees), Ok(config));
        assert_eq!(report.missing_sources, vec![NormalizedPath::new("gone.txt")]);
        assert_eq!(
            report.broken_links,
            vec![BrokenLink {
                tree: "feature".into(),
                file: NormalizedPath::new("gone.txt"),
            }]
        );
        assert!(
            report
                .remediation
                .contains(&"remove gone.txt from the pattern list or create it in the source tree".to_string())
        );
        assert!(
            report
                .remediation
                .contains(&"run cleanup to remove broken links".to_string())
        );
    }

    #[test]
    fn test_unreachable_target_reported() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source(".env", "x");
        std::fs::remove_dir_all(trees.target("feature")).unwrap();

        let report = diagnose(context(&trees), Ok(SyncConfig::with_patterns([".env"])));
        assert_eq!(report.unreachable_targets.len(), 1);
        assert_eq!(report.unreachable_targets[0].tree, "feature");
        assert!(report.broken_links.is_empty());
        assert!(!report.is_healthy());
    }

    #[test]
    fn test_unknown_source_selector() {
        let trees = TestTrees::new(&["feature"]);
        let mut config = SyncConfig::with_patterns([".env"]);
        config.source_worktree = Some("nope".into());
        let report = diagnose(context(&trees), Ok(config));
        assert!(!report.config_valid);
        assert!(report.source.is_none());
        assert!(!report.is_healthy());
    }

    #[test]
    fn test_unreadable_target_is_a_permission_error() {
        let trees = TestTrees::new(&["feature", "locked"]);
        trees.write_source(".env", "x");
        let ctx = context(&trees);
        let guard = treelink_test_utils::LockedDir::lock(trees.target("locked"));

        let report = diagnose(ctx, Ok(SyncConfig::with_patterns([".env"])));
        if !guard.is_enforced() {
            assert!(report.permission_errors.is_empty());
            return;
        }
        assert_eq!(report.permission_errors.len(), 1);
        assert_eq!(report.permission_errors[0].path, trees.target("locked"));
        assert!(report.unreachable_targets.is_empty());
        assert!(
            report
                .remediation
                .contains(&"grant read access to the listed paths".to_string())
        );
        assert!(!report.is_healthy());
    }
}
