// src/pipeline.rs

//! Turns a validated [`ConfigFile`] into a [`TaskRegistry`] of
//! command-backed tasks, and resolves the run's parameters.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::model::{ConfigFile, GuardConfig, TaskConfig};
use crate::dag::{Task, TaskRegistry};
use crate::engine::RunContext;
use crate::errors::Result;
use crate::exec::{build_action, ActionSpec, ShellCommand};
use crate::fs::FileSystem;
use crate::params::Parameters;

/// Register every configured task, in declaration order.
pub fn build_registry(
    cfg: &ConfigFile,
    root: &Path,
    fs: Arc<dyn FileSystem>,
) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();

    for tc in &cfg.task {
        registry.register(build_task(tc, root, Arc::clone(&fs)))?;
    }

    registry.validate()?;
    debug!(tasks = registry.len(), "built task registry from config");
    Ok(registry)
}

/// Resolve declared parameters against the process environment and
/// command-line overrides.
pub fn build_parameters(cfg: &ConfigFile, overrides: &[(String, String)]) -> Result<Parameters> {
    Parameters::resolve(&cfg.param, overrides, |var| std::env::var(var).ok())
}

pub fn build_task(tc: &TaskConfig, root: &Path, fs: Arc<dyn FileSystem>) -> Task {
    let command = tc.cmd.as_ref().map(|cmd| ShellCommand {
        template: cmd.clone(),
        cwd: tc.cwd.clone(),
        env: tc.env.clone(),
        args_if_succeeded: tc.args_if_succeeded.clone(),
        root: root.to_path_buf(),
    });

    let fallback = tc.fallback_cmd.as_ref().map(|cmd| ShellCommand {
        template: cmd.clone(),
        cwd: tc.cwd.clone(),
        env: tc.env.clone(),
        args_if_succeeded: Default::default(),
        root: root.to_path_buf(),
    });

    let spec = ActionSpec {
        task: tc.name.clone(),
        root: root.to_path_buf(),
        clean_dirs: tc.clean_dirs.clone(),
        command,
        fallback,
        foreach: tc.foreach.clone(),
    };

    let mut task = Task::new(tc.name.clone())
        .best_effort(tc.best_effort)
        .with_action(build_action(spec, fs));

    for dep in &tc.depends_on {
        task = task.depends_on(dep.clone());
    }
    for other in &tc.after {
        task = task.after(other.clone());
    }
    if let Some(description) = &tc.description {
        task = task.describe(description.clone());
    }
    if let Some(guard) = &tc.only_when {
        let guard = guard.clone();
        task = task.only_when(move |ctx| guard_passes(&guard, ctx));
    }

    task
}

/// Evaluate an `only_when` table against the current run.
pub fn guard_passes(guard: &GuardConfig, ctx: &RunContext) -> bool {
    guard.params_set.iter().all(|p| ctx.param_is_set(p))
        && guard
            .param_equals
            .iter()
            .all(|(p, expected)| ctx.param(p) == Some(expected.as_str()))
        && guard.env_set.iter().all(|var| {
            std::env::var(var).is_ok_and(|v| !v.trim().is_empty())
        })
        && guard.succeeded.iter().all(|t| ctx.succeeded(t))
        && !guard.not_succeeded.iter().any(|t| ctx.succeeded(t))
}
