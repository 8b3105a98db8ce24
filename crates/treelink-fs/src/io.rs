//! Mutating filesystem primitives
//!
//! Each failure is wrapped with the path and the operation attempted so the
//! caller can attribute it to a single action and move on.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use fs2::FileExt;

use crate::{Error, FsOperation, Result};

/// Create `dir` and any missing parents.
///
/// "Already exists" is success, including when a sibling operation created
/// the directory between our check and our call.
pub fn ensure_dir_all(dir: &Path) -> Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(Error::op(FsOperation::CreateDir, dir, e)),
    }
}

/// Create a symbolic link at `at` whose stored text is `link_text`.
///
/// `is_dir` selects the directory flavour on platforms that distinguish
/// file and directory links.
pub fn create_symlink(link_text: &Path, at: &Path, is_dir: bool) -> Result<()> {
    symlink_impl(link_text, at, is_dir).map_err(|e| Error::op(FsOperation::Symlink, at, e))?;
    tracing::debug!(link = %at.display(), text = %link_text.display(), "created symlink");
    Ok(())
}

#[cfg(unix)]
fn symlink_impl(link_text: &Path, at: &Path, _is_dir: bool) -> std::io::Result<()> {
    std::os::unix::fs::symlink(link_text, at)
}

#[cfg(windows)]
fn symlink_impl(link_text: &Path, at: &Path, is_dir: bool) -> std::io::Result<()> {
    if is_dir {
        std::os::windows::fs::symlink_dir(link_text, at)
    } else {
        std::os::windows::fs::symlink_file(link_text, at)
    }
}

/// Remove the symbolic link at `path` without touching its destination.
pub fn remove_link(path: &Path) -> Result<()> {
    let result = fs::remove_file(path);
    // Windows directory links must be removed as directories.
    #[cfg(windows)]
    let result = result.or_else(|_| fs::remove_dir(path));
    result.map_err(|e| Error::op(FsOperation::Unlink, path, e))
}

/// Remove a plain (non-link) entry at `path`.
///
/// Directories are only removed when empty; their contents are never
/// deleted on the caller's behalf.
pub fn remove_plain(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| Error::op(FsOperation::Unlink, path, e))?;
    let result = if meta.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| Error::op(FsOperation::Unlink, path, e))
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partial file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_dir_all(parent)?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::op(FsOperation::Write, &temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::op(FsOperation::Write, &temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::op(FsOperation::Write, &temp_path, e))?;
    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| Error::op(FsOperation::Write, path, e))?;

    Ok(())
}
