//! Run results

use std::path::{Path, PathBuf};

use serde::Serialize;
use treelink_fs::{FsOperation, NormalizedPath};

use super::plan::{ActionKind, SyncAction};
use crate::Error;

/// One failed action, attributed to its tree and file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionError {
    pub tree: String,
    pub file: NormalizedPath,
    /// Path the failing operation touched
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<FsOperation>,
    /// Raw OS error code, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    pub message: String,
}

impl ActionError {
    pub fn new(action: &SyncAction, error: &Error) -> Self {
        Self::at(&action.tree, &action.relative_file, &action.target_path, error)
    }

    /// Error for `file` in `tree`, where `fallback` is the entry being worked on.
    pub fn at(tree: &str, file: &NormalizedPath, fallback: &Path, error: &Error) -> Self {
        let (path, operation, code) = match error {
            Error::Fs(fs_err) => (
                fs_err.path().to_path_buf(),
                fs_err.operation(),
                fs_err.code(),
            ),
            Error::TargetUnreachable { path, .. } => (path.clone(), None, None),
            Error::Io(io_err) => (fallback.to_path_buf(), None, io_err.raw_os_error()),
            _ => (fallback.to_path_buf(), None, None),
        };
        Self {
            tree: tree.to_string(),
            file: file.clone(),
            path,
            operation,
            code,
            message: error.to_string(),
        }
    }
}

/// Counts and itemized errors for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<ActionError>,
}

impl SyncResult {
    /// A run succeeds only when no action failed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn record(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Create => self.created += 1,
            ActionKind::Update => self.updated += 1,
            ActionKind::Skip => self.skipped += 1,
        }
    }

    /// Counts a preview would produce, without touching disk.
    pub(crate) fn projected(actions: &[SyncAction]) -> Self {
        let mut result = Self::default();
        for action in actions {
            result.record(action.kind);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::plan::ActionReason;
    use pretty_assertions::assert_eq;

    fn action() -> SyncAction {
        SyncAction {
            tree: "feature".into(),
            tree_root: PathBuf::from("/repo/feature"),
            relative_file: NormalizedPath::new(".env"),
            source_path: PathBuf::from("/repo/main/.env"),
            target_path: PathBuf::from("/repo/feature/.env"),
            link_text: PathBuf::from("../main/.env"),
            kind: ActionKind::Create,
            reason: ActionReason::NotLinked,
            is_directory: false,
        }
    }

    #[test]
    fn test_action_error_from_fs_error_keeps_operation_and_code() {
        let io = std::io::Error::from_raw_os_error(13);
        let err = Error::Fs(treelink_fs::Error::op(
            FsOperation::Symlink,
            "/repo/feature/.env",
            io,
        ));
        let ae = ActionError::new(&action(), &err);
        assert_eq!(ae.tree, "feature");
        assert_eq!(ae.file.as_str(), ".env");
        assert_eq!(ae.operation, Some(FsOperation::Symlink));
        assert_eq!(ae.code, Some(13));
        assert_eq!(ae.path, PathBuf::from("/repo/feature/.env"));
    }

    #[test]
    fn test_action_error_from_unreachable_target() {
        let err = Error::TargetUnreachable {
            tree: "feature".into(),
            path: PathBuf::from("/repo/feature"),
        };
        let ae = ActionError::new(&action(), &err);
        assert_eq!(ae.path, PathBuf::from("/repo/feature"));
        assert_eq!(ae.operation, None);
        assert!(ae.message.contains("not reachable"));
    }

    #[test]
    fn test_projected_counts() {
        let mut skip = action();
        skip.kind = ActionKind::Skip;
        let result = SyncResult::projected(&[action(), action(), skip]);
        assert_eq!(
            result,
            SyncResult {
                created: 2,
                updated: 0,
                skipped: 1,
                errors: vec![],
            }
        );
        assert!(result.is_success());
    }
}
