//! Lifecycle hooks around a sync
//!
//! Hooks are opaque shell strings from the `hooks` block of
//! `treelink.json`. They run through the platform shell with the source
//! tree as working directory and a few `TREELINK_*` variables set.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;

use crate::error::{Error, Result};

/// Events that can trigger hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    /// Before any link is changed
    PreSync,
    /// After every action has been attempted
    PostSync,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreSync => write!(f, "pre-sync"),
            Self::PostSync => write!(f, "post-sync"),
        }
    }
}

/// Environment passed to a hook process
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    pub vars: BTreeMap<String, String>,
}

impl HookContext {
    /// Context for a sync event over `source` and `targets`.
    pub fn for_sync(event: HookEvent, source: &Path, targets: &[PathBuf]) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert("TREELINK_EVENT".to_string(), event.to_string());
        vars.insert("TREELINK_SOURCE".to_string(), source.display().to_string());
        let joined = std::env::join_paths(targets)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        vars.insert("TREELINK_TARGETS".to_string(), joined);
        Self { vars }
    }
}

/// Result of running a single hook
#[derive(Debug)]
pub struct HookResult {
    pub event: HookEvent,
    pub command: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Run `command` for `event` in `work_dir`.
///
/// A non-zero exit becomes [`Error::HookFailed`] with the trimmed stderr
/// attached. Failing to spawn the shell is reported the same way.
pub fn run_hook(
    event: HookEvent,
    command: &str,
    context: &HookContext,
    work_dir: &Path,
) -> Result<HookResult> {
    tracing::info!(%event, command, "running hook");

    let output = shell(command)
        .current_dir(work_dir)
        .envs(&context.vars)
        .output()
        .map_err(|e| Error::HookFailed {
            event: event.to_string(),
            command: command.to_string(),
            message: format!("failed to start shell: {e}"),
        })?;

    let result = HookResult {
        event,
        command: command.to_string(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
    };

    if !result.success {
        let stderr_snippet = result.stderr.trim();
        let message = if stderr_snippet.is_empty() {
            format!(
                "Hook exited with non-zero status (exit code: {:?})",
                result.exit_code
            )
        } else {
            format!(
                "Hook exited with non-zero status (exit code: {:?}): {}",
                result.exit_code, stderr_snippet
            )
        };
        return Err(Error::HookFailed {
            event: event.to_string(),
            command: command.to_string(),
            message,
        });
    }

    tracing::debug!(%event, stdout = result.stdout.trim(), "hook finished");
    Ok(result)
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
