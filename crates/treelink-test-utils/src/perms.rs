//! Directories with their permission bits cleared for the length of a test.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// A directory chmod'ed to `0o000`, restored to `0o755` on drop so the
/// surrounding temporary directory can still be removed.
pub struct LockedDir {
    path: PathBuf,
}

impl LockedDir {
    /// Clear every permission bit on `path`.
    pub fn lock(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the kernel actually refuses access. Root (and some
    /// containers) ignore permission bits, in which case there is nothing
    /// to assert.
    pub fn is_enforced(&self) -> bool {
        fs::read_dir(&self.path).is_err()
    }
}

impl Drop for LockedDir {
    fn drop(&mut self) {
        let _ = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o755));
    }
}
