//! Reconciliation: apply one planned action to disk

use treelink_fs::io::{create_symlink, ensure_dir_all, remove_link, remove_plain};
use treelink_fs::{LinkState, inspect};

use super::plan::{ActionKind, SyncAction, escapes_tree};
use crate::{Error, Result};

/// Apply `action`, honouring `overwrite` for plain entries in the way.
///
/// Returns the kind of change made. Errors carry the path and operation
/// that failed; nothing is rolled back.
pub fn apply(action: &SyncAction, overwrite: bool) -> Result<ActionKind> {
    match action.kind {
        ActionKind::Skip => Ok(ActionKind::Skip),
        ActionKind::Create => {
            create(action)?;
            tracing::info!(tree = %action.tree, file = %action.relative_file, "created link");
            Ok(ActionKind::Create)
        }
        ActionKind::Update => {
            clear_target(action, overwrite)?;
            create(action)?;
            tracing::info!(tree = %action.tree, file = %action.relative_file, "updated link");
            Ok(ActionKind::Update)
        }
    }
}

fn ensure_tree_reachable(action: &SyncAction) -> Result<()> {
    if action.tree_root.is_dir() {
        Ok(())
    } else {
        Err(Error::TargetUnreachable {
            tree: action.tree.clone(),
            path: action.tree_root.clone(),
        })
    }
}

/// The planner already checked this; the disk may have changed since.
fn ensure_within_tree(action: &SyncAction) -> Result<()> {
    if escapes_tree(&action.target_path, &action.tree_root, &action.source_path) {
        return Err(treelink_fs::Error::Conflict {
            path: action.target_path.clone(),
            message: format!(
                "path resolves outside working tree {}",
                action.tree_root.display()
            ),
        }
        .into());
    }
    Ok(())
}

fn create(action: &SyncAction) -> Result<()> {
    ensure_tree_reachable(action)?;
    ensure_within_tree(action)?;
    if let Some(parent) = action.target_path.parent() {
        ensure_dir_all(parent)?;
    }
    create_symlink(&action.link_text, &action.target_path, action.is_directory)?;
    Ok(())
}

fn clear_target(action: &SyncAction, overwrite: bool) -> Result<()> {
    ensure_tree_reachable(action)?;
    ensure_within_tree(action)?;
    let path = &action.target_path;
    match inspect(path) {
        LinkState::Absent => Ok(()),
        state if state.is_link() => Ok(remove_link(path)?),
        LinkState::Plain if overwrite => Ok(remove_plain(path)?),
        _ => Err(treelink_fs::Error::Conflict {
            path: path.clone(),
            message: "a plain entry exists and overwrite is disabled".to_string(),
        }
        .into()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::LinkMode;
    use crate::context::WorkingTree;
    use crate::sync::plan::{ActionReason, PlanOptions, plan};
    use std::fs;
    use std::os::unix::fs::symlink;
    use treelink_fs::{FsOperation, NormalizedPath, is_valid_link, points_to};
    use treelink_test_utils::TestTrees;

    fn single_action(trees: &TestTrees, file: &str, options: PlanOptions) -> SyncAction {
        let source = WorkingTree::new("main", trees.source());
        let target = WorkingTree::new("feature", trees.target("feature"));
        let p = plan(&source, &[target], &[NormalizedPath::new(file)], options);
        p.actions.into_iter().next().unwrap()
    }

    #[test]
    fn test_create_builds_parents_and_link() {
        let trees = TestTrees::new(&["feature"]);
        let src = trees.write_source(".vscode/settings.json", "{\"a\":1}");
        let action = single_action(&trees, ".vscode/settings.json", PlanOptions::default());
        assert_eq!(action.kind, ActionKind::Create);

        assert_eq!(apply(&action, false).unwrap(), ActionKind::Create);
        trees.assert_is_link("feature", ".vscode/settings.json");
        assert_eq!(trees.read_target("feature", ".vscode/settings.json"), "{\"a\":1}");
        assert!(points_to(&action.target_path, &src));
    }

    #[test]
    fn test_create_absolute_mode() {
        let trees = TestTrees::new(&["feature"]);
        let src = trees.write_source("a.txt", "a");
        let options = PlanOptions {
            link_mode: LinkMode::Absolute,
            overwrite: false,
        };
        let action = single_action(&trees, "a.txt", options);
        apply(&action, false).unwrap();
        assert_eq!(fs::read_link(&action.target_path).unwrap(), src);
    }

    #[test]
    fn test_skip_is_noop() {
        let trees = TestTrees::new(&["feature"]);
        let action = single_action(&trees, "missing.txt", PlanOptions::default());
        assert_eq!(action.reason, ActionReason::SourceMissing);
        assert_eq!(apply(&action, false).unwrap(), ActionKind::Skip);
        assert!(!action.target_path.exists());
    }

    #[test]
    fn test_update_replaces_wrong_link() {
        let trees = TestTrees::new(&["feature"]);
        let src = trees.write_source(".env", "right");
        let wrong = trees.write_source("wrong.env", "wrong");
        symlink(&wrong, trees.target("feature").join(".env")).unwrap();

        let action = single_action(&trees, ".env", PlanOptions::default());
        assert_eq!(action.kind, ActionKind::Update);
        assert_eq!(apply(&action, false).unwrap(), ActionKind::Update);
        assert!(points_to(&action.target_path, &src));
        assert!(wrong.exists());
    }

    #[test]
    fn test_update_replaces_broken_link() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source(".env", "right");
        symlink("../gone/.env", trees.target("feature").join(".env")).unwrap();

        let action = single_action(&trees, ".env", PlanOptions::default());
        apply(&action, false).unwrap();
        assert!(is_valid_link(&action.target_path));
    }

    #[test]
    fn test_update_over_plain_file_without_permission_is_conflict() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source(".env", "source");
        trees.write_target("feature", ".env", "local");
        let options = PlanOptions {
            overwrite: true,
            ..PlanOptions::default()
        };
        // Planned with overwrite, applied without it.
        let action = single_action(&trees, ".env", options);
        assert_eq!(action.kind, ActionKind::Update);

        let err = apply(&action, false).unwrap_err();
        match err {
            Error::Fs(fs_err) => {
                assert_eq!(fs_err.operation(), Some(FsOperation::Unlink));
                assert_eq!(fs_err.path(), action.target_path.as_path());
            }
            other => panic!("expected filesystem conflict, got {other:?}"),
        }
        assert_eq!(trees.read_target("feature", ".env"), "local");
        assert!(!fs::symlink_metadata(&action.target_path).unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_update_over_plain_file_with_permission() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source(".env", "source");
        trees.write_target("feature", ".env", "local");
        let options = PlanOptions {
            overwrite: true,
            ..PlanOptions::default()
        };
        let action = single_action(&trees, ".env", options);
        apply(&action, true).unwrap();
        assert_eq!(trees.read_target("feature", ".env"), "source");
    }

    #[test]
    fn test_unreachable_tree_is_not_recreated() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source(".env", "x");
        let action = single_action(&trees, ".env", PlanOptions::default());
        fs::remove_dir_all(trees.target("feature")).unwrap();

        let err = apply(&action, false).unwrap_err();
        assert!(matches!(err, Error::TargetUnreachable { .. }));
        assert!(!trees.target("feature").exists());
    }

    #[test]
    fn test_create_fails_when_parent_is_a_file() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source("conf/app.yml", "x");
        trees.write_target("feature", "conf", "i am a file");
        let action = single_action(&trees, "conf/app.yml", PlanOptions::default());
        // inspect() cannot stat through a file, so the pair plans as a create.
        assert_eq!(action.kind, ActionKind::Create);
        let err = apply(&action, false).unwrap_err();
        assert!(matches!(err, Error::Fs(_)), "got {err:?}");
    }

    fn overwrite() -> PlanOptions {
        PlanOptions {
            overwrite: true,
            ..PlanOptions::default()
        }
    }

    #[test]
    fn test_directory_link_into_source_is_never_overwritten() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source(".vscode/settings.json", "SOURCE");
        symlink("../main/.vscode", trees.target("feature").join(".vscode")).unwrap();

        let action = single_action(&trees, ".vscode/settings.json", overwrite());
        assert_eq!(action.kind, ActionKind::Skip);
        assert_eq!(action.reason, ActionReason::OutsideTree);
        assert_eq!(apply(&action, true).unwrap(), ActionKind::Skip);
        assert_eq!(
            fs::read_to_string(trees.source().join(".vscode/settings.json")).unwrap(),
            "SOURCE"
        );
    }

    #[test]
    fn test_directory_link_appearing_after_planning_blocks_removal() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source(".vscode/settings.json", "SOURCE");
        trees.write_target("feature", ".vscode/settings.json", "local");
        let action = single_action(&trees, ".vscode/settings.json", overwrite());
        assert_eq!(action.kind, ActionKind::Update);

        let vscode = trees.target("feature").join(".vscode");
        fs::remove_dir_all(&vscode).unwrap();
        symlink("../main/.vscode", &vscode).unwrap();

        let err = apply(&action, true).unwrap_err();
        assert!(matches!(err, Error::Fs(treelink_fs::Error::Conflict { .. })), "got {err:?}");
        assert_eq!(
            fs::read_to_string(trees.source().join(".vscode/settings.json")).unwrap(),
            "SOURCE"
        );
    }

    #[test]
    fn test_create_refuses_parent_link_out_of_tree() {
        let trees = TestTrees::new(&["feature"]);
        trees.write_source("conf/app.yml", "SOURCE");
        let action = single_action(&trees, "conf/app.yml", PlanOptions::default());
        assert_eq!(action.kind, ActionKind::Create);

        symlink("../main/conf", trees.target("feature").join("conf")).unwrap();
        let err = apply(&action, false).unwrap_err();
        assert!(matches!(err, Error::Fs(treelink_fs::Error::Conflict { .. })), "got {err:?}");
        let source_entry = fs::symlink_metadata(trees.source().join("conf/app.yml")).unwrap();
        assert!(source_entry.file_type().is_file());
    }
}
