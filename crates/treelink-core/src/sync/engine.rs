//! SyncEngine implementation
//!
//! The engine walks one run through its states:
//!
//! ```text
//! Idle -> Planning -> Validating -> Reporting                         (preview)
//!                                -> PreHook -> Executing -> PostHook -> Reporting  (live)
//! ```
//!
//! Validation is the only gate. An unreachable source aborts before any
//! mutation; an unreachable target is a warning and its actions fail one
//! by one during execution.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use treelink_fs::NormalizedPath;

use super::pattern::resolve_patterns;
use super::plan::{ActionReason, Plan, PlanOptions, plan};
use super::reconcile::apply;
use super::report::{ActionError, SyncResult};
use crate::config::SyncConfig;
use crate::context::{RunContext, WorkingTree};
use crate::hooks::{HookContext, HookEvent, run_hook};
use crate::{Error, Result};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineState {
    Idle,
    Planning,
    Validating,
    PreHook,
    Executing,
    PostHook,
    Reporting,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Planning => "planning",
            Self::Validating => "validating",
            Self::PreHook => "pre-hook",
            Self::Executing => "executing",
            Self::PostHook => "post-hook",
            Self::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Plan and report without touching disk or running hooks.
    pub dry_run: bool,
    /// Restrict the run to these target trees (by name or branch). Empty means all.
    pub targets: Vec<String>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub dry_run: bool,
    pub plan: Plan,
    /// Applied counts, or projected counts in preview mode.
    pub result: SyncResult,
    pub warnings: Vec<String>,
    /// States visited, in order.
    pub states: Vec<EngineState>,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

/// Drives planning, validation, hooks, and reconciliation for one invocation.
pub struct SyncEngine {
    ctx: RunContext,
    config: SyncConfig,
    state: EngineState,
    visited: Vec<EngineState>,
    applied: Option<SyncResult>,
}

impl SyncEngine {
    /// Validate `config` and mark its source tree in `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid`/`Pattern` for a bad configuration and
    /// `SourceNotFound` when the selector matches no tree.
    pub fn new(mut ctx: RunContext, config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let source = ctx.select_source(config.source_worktree.as_deref())?;
        tracing::debug!(source = %source.name, path = %source.path.display(), "selected source tree");
        Ok(Self {
            ctx,
            config,
            state: EngineState::Idle,
            visited: Vec::new(),
            applied: None,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// What the last run's execution phase changed on disk.
    ///
    /// Survives a post-sync hook failure, where `run` returns `Err` even
    /// though links were already created or updated.
    pub fn applied(&self) -> Option<&SyncResult> {
        self.applied.as_ref()
    }

    /// The source tree selected at construction.
    pub fn source(&self) -> Result<&WorkingTree> {
        self.ctx.source().ok_or_else(|| Error::SourceNotFound {
            selector: self
                .config
                .source_worktree
                .clone()
                .unwrap_or_else(|| "<primary>".to_string()),
        })
    }

    /// Target trees, optionally narrowed to `filter`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when a filter entry names no target tree.
    pub fn targets(&self, filter: &[String]) -> Result<Vec<WorkingTree>> {
        let all = self.ctx.targets();
        if filter.is_empty() {
            return Ok(all);
        }
        if let Some(unknown) = filter
            .iter()
            .find(|name| !all.iter().any(|t| t.matches(name)))
        {
            return Err(Error::config(format!("unknown target tree '{unknown}'")));
        }
        Ok(all
            .into_iter()
            .filter(|t| filter.iter().any(|name| t.matches(name)))
            .collect())
    }

    /// Resolved list of files to share from the source tree.
    pub fn files(&self) -> Result<Vec<NormalizedPath>> {
        let source = self.source()?;
        resolve_patterns(
            &source.path,
            &self.config.shared_files,
            &self.config.ignore_patterns,
        )
    }

    /// Build the plan without changing anything.
    pub fn plan(&self, options: &SyncOptions) -> Result<Plan> {
        let source = self.source()?;
        let targets = self.targets(&options.targets)?;
        let files = self.files()?;
        Ok(plan(source, &targets, &files, self.plan_options()))
    }

    /// Run a full sync (or a preview when `options.dry_run` is set).
    ///
    /// Fatal errors (configuration, source reachability, hook failure) are
    /// returned as `Err`. Per-action failures are collected in the outcome.
    pub fn run(&mut self, options: &SyncOptions) -> Result<SyncOutcome> {
        self.visited.clear();
        self.applied = None;
        let outcome = self.run_states(options);
        if outcome.is_err() {
            self.enter(EngineState::Idle);
        }
        outcome
    }

    fn run_states(&mut self, options: &SyncOptions) -> Result<SyncOutcome> {
        self.enter(EngineState::Planning);
        let plan = self.plan(options)?;

        self.enter(EngineState::Validating);
        let warnings = self.validate(&plan)?;

        let result = if options.dry_run {
            SyncResult::projected(&plan.actions)
        } else {
            self.enter(EngineState::PreHook);
            self.run_configured_hook(HookEvent::PreSync, &plan)?;

            self.enter(EngineState::Executing);
            let result = self.execute(&plan);
            self.applied = Some(result.clone());

            self.enter(EngineState::PostHook);
            if let Err(e) = self.run_configured_hook(HookEvent::PostSync, &plan) {
                tracing::warn!(
                    created = result.created,
                    updated = result.updated,
                    skipped = result.skipped,
                    errors = result.errors.len(),
                    "post-sync hook failed after links were applied"
                );
                return Err(e);
            }
            result
        };

        self.enter(EngineState::Reporting);
        tracing::info!(
            created = result.created,
            updated = result.updated,
            skipped = result.skipped,
            errors = result.errors.len(),
            dry_run = options.dry_run,
            "sync finished"
        );
        let outcome = SyncOutcome {
            dry_run: options.dry_run,
            plan,
            result,
            warnings,
            states: self.visited.clone(),
        };
        self.enter(EngineState::Idle);
        Ok(outcome)
    }

    fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            link_mode: self.config.link_mode,
            overwrite: self.config.overwrite_existing,
        }
    }

    fn validate(&self, plan: &Plan) -> Result<Vec<String>> {
        if !plan.source.path.is_dir() {
            return Err(Error::SourceUnreachable {
                path: plan.source.path.clone(),
            });
        }

        let mut warnings = Vec::new();
        for tree in &plan.targets {
            if !tree.path.is_dir() {
                tracing::warn!(tree = %tree.name, path = %tree.path.display(), "target tree is not reachable");
                warnings.push(
                    Error::TargetUnreachable {
                        tree: tree.name.clone(),
                        path: tree.path.clone(),
                    }
                    .to_string(),
                );
            }
        }
        for action in plan.actions.iter().filter(|a| a.reason == ActionReason::OutsideTree) {
            tracing::warn!(
                tree = %action.tree,
                file = %action.relative_file,
                "target path resolves outside its tree"
            );
            warnings.push(format!(
                "{}/{} resolves outside the target tree and was left alone",
                action.tree, action.relative_file
            ));
        }
        Ok(warnings)
    }

    fn execute(&self, plan: &Plan) -> SyncResult {
        let overwrite = self.config.overwrite_existing;
        let mut result = SyncResult::default();
        for action in &plan.actions {
            match apply(action, overwrite) {
                Ok(kind) => result.record(kind),
                Err(e) => {
                    tracing::warn!(
                        tree = %action.tree,
                        file = %action.relative_file,
                        error = %e,
                        "action failed"
                    );
                    result.errors.push(ActionError::new(action, &e));
                }
            }
        }
        result
    }

    fn run_configured_hook(&self, event: HookEvent, plan: &Plan) -> Result<()> {
        let command = match event {
            HookEvent::PreSync => self.config.hooks.before_sync.as_deref(),
            HookEvent::PostSync => self.config.hooks.after_sync.as_deref(),
        };
        let Some(command) = command else {
            return Ok(());
        };
        let targets: Vec<PathBuf> = plan.targets.iter().map(|t| t.path.clone()).collect();
        let context = HookContext::for_sync(event, &plan.source.path, &targets);
        run_hook(event, command, &context, &plan.source.path)?;
        Ok(())
    }

    fn enter(&mut self, next: EngineState) {
        tracing::debug!(from = %self.state, to = %next, "engine state");
        self.state = next;
        self.visited.push(next);
    }
}
