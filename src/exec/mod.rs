// src/exec/mod.rs

//! Built-in actions for config-declared tasks.
//!
//! - [`command`] runs templated shell commands synchronously.
//! - [`clean`] empties or creates directories.
//! - [`foreach`] expands a glob into per-item command runs.
//!
//! [`build_action`] combines them into a single [`Action`], with
//! `fallback_cmd` as the action's declared fallback.

pub mod clean;
pub mod command;
pub mod foreach;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::dag::{Action, TaskName};
use crate::fs::FileSystem;

pub use clean::create_or_clean;
pub use command::{CommandFailed, ShellCommand};
pub use foreach::expand_glob;

/// Everything needed to build the action of a config-declared task.
#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub task: TaskName,
    pub root: PathBuf,
    pub clean_dirs: Vec<String>,
    pub command: Option<ShellCommand>,
    pub fallback: Option<ShellCommand>,
    pub foreach: Option<String>,
}

/// Build the action for a task.
///
/// Primary: clean directories, then run the command (once, or once per
/// `foreach` match). Fallback: `fallback` command, if declared.
pub fn build_action(spec: ActionSpec, fs: Arc<dyn FileSystem>) -> Action {
    let ActionSpec {
        task,
        root,
        clean_dirs,
        command,
        fallback,
        foreach,
    } = spec;

    let primary_task = task.clone();
    let mut action = Action::new(move |ctx| {
        let task = primary_task.as_str();
        let root_str = root.display().to_string();

        for dir in &clean_dirs {
            let dir = ctx.params().interpolate_with(dir, &[("root", root_str.as_str())])?;
            let path = root.join(dir);
            info!(task = %task, dir = ?path, "cleaning directory");
            create_or_clean(fs.as_ref(), &path)
                .with_context(|| format!("cleaning {:?}", path))?;
        }

        let Some(command) = &command else {
            return Ok(());
        };

        let Some(pattern) = &foreach else {
            return command.run(task, ctx, None);
        };

        let items = expand_glob(fs.as_ref(), &root, pattern)?;
        if items.is_empty() {
            warn!(task = %task, pattern = %pattern, "foreach glob matched nothing");
        }
        for item in &items {
            command
                .run(task, ctx, Some(item))
                .with_context(|| format!("foreach item '{item}'"))?;
        }
        Ok(())
    });

    if let Some(fallback) = fallback {
        action = action.with_fallback(move |ctx| fallback.run(&task, ctx, None));
    }

    action
}
