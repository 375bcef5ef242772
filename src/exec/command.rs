// src/exec/command.rs

//! Shell command actions.

use std::collections::{BTreeMap, VecDeque};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dag::TaskName;
use crate::engine::RunContext;

/// Number of trailing stderr lines echoed when a command fails.
const STDERR_TAIL: usize = 20;

/// A command exited unsuccessfully.
#[derive(Debug, Error)]
#[error("command `{command}` {}", exit_label(.code))]
pub struct CommandFailed {
    /// Command line as run, with secrets masked.
    pub command: String,
    /// Exit code; `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// A templated shell command, rendered against the run context right
/// before it runs.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    pub template: String,
    /// Working directory, relative to `root` unless absolute.
    pub cwd: Option<String>,
    pub env: BTreeMap<String, String>,
    /// Appended to the command line when the named task already succeeded.
    pub args_if_succeeded: BTreeMap<TaskName, String>,
    pub root: PathBuf,
}

impl ShellCommand {
    pub fn new(template: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            cwd: None,
            env: BTreeMap::new(),
            args_if_succeeded: BTreeMap::new(),
            root: root.into(),
        }
    }

    /// Render the full command line for this run.
    pub fn render(&self, ctx: &RunContext, item: Option<&str>) -> Result<String> {
        let root = self.root.display().to_string();
        let bindings = bindings(&root, item);

        let mut line = ctx.params().interpolate_with(&self.template, &bindings)?;
        for (task, args) in &self.args_if_succeeded {
            if ctx.succeeded(task) {
                line.push(' ');
                line.push_str(&ctx.params().interpolate_with(args, &bindings)?);
            }
        }
        Ok(line)
    }

    /// Directory the command runs in.
    pub fn working_dir(&self, ctx: &RunContext, item: Option<&str>) -> Result<PathBuf> {
        let Some(cwd) = &self.cwd else {
            return Ok(self.root.clone());
        };
        let root = self.root.display().to_string();
        let cwd = ctx.params().interpolate_with(cwd, &bindings(&root, item))?;
        Ok(self.root.join(cwd))
    }

    /// Run the command to completion.
    ///
    /// Stdout lines are logged at `info`, stderr lines at `debug`; the last
    /// stderr lines are repeated at `warn` if the command fails.
    pub fn run(&self, task: &str, ctx: &RunContext, item: Option<&str>) -> Result<()> {
        let line = self.render(ctx, item)?;
        let shown = ctx.params().mask(&line);
        let dir = self.working_dir(ctx, item)?;

        let root = self.root.display().to_string();
        let bindings = bindings(&root, item);
        let mut env = Vec::with_capacity(self.env.len());
        for (key, value) in &self.env {
            env.push((key.clone(), ctx.params().interpolate_with(value, &bindings)?));
        }

        info!(task = %task, cmd = %shown, cwd = ?dir, "running command");

        let mut child = shell(&line, &dir)
            .envs(env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning `{shown}`"))?;

        // stderr is drained on its own thread so a chatty child can't block
        // on a full pipe while we read stdout.
        let stderr_pump = child.stderr.take().map(|stderr| {
            let task = task.to_string();
            let params = ctx.params().clone();
            thread::spawn(move || {
                let mut tail = VecDeque::with_capacity(STDERR_TAIL);
                for line in BufReader::new(stderr).lines().map_while(std::io::Result::ok) {
                    let line = params.mask(&line);
                    debug!(task = %task, "stderr: {}", line);
                    if tail.len() == STDERR_TAIL {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                tail
            })
        });

        if let Some(stdout) = child.stdout.take() {
            for out in BufReader::new(stdout).lines().map_while(std::io::Result::ok) {
                info!(task = %task, "{}", ctx.params().mask(&out));
            }
        }

        let status = child
            .wait()
            .with_context(|| format!("waiting for `{shown}`"))?;
        let tail = stderr_pump
            .and_then(|pump| pump.join().ok())
            .unwrap_or_default();

        if status.success() {
            debug!(task = %task, "command exited successfully");
            return Ok(());
        }

        for line in &tail {
            warn!(task = %task, "stderr: {}", line);
        }
        Err(CommandFailed {
            command: shown,
            code: status.code(),
        }
        .into())
    }
}

fn bindings<'a>(root: &'a str, item: Option<&'a str>) -> Vec<(&'a str, &'a str)> {
    let mut bindings = vec![("root", root)];
    if let Some(item) = item {
        bindings.push(("item", item));
    }
    bindings
}

/// Build a shell invocation appropriate for the platform.
fn shell(line: &str, dir: &Path) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    };
    cmd.current_dir(dir);
    cmd
}
