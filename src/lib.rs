// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod params;
pub mod pipeline;

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::{config_root_dir, load_and_validate};
use crate::config::model::ConfigFile;
use crate::dag::{resolve, ExecutionPlan, TaskName, TaskRegistry};
use crate::engine::{Executor, RunContext, RunOutcome};
use crate::errors::BuildGraphError;
use crate::fs::RealFileSystem;
use crate::params::Parameters;
use crate::pipeline::{build_parameters, build_registry};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - parameter resolution
/// - registry construction and target resolution
/// - execution and the summary table
///
/// Everything that can be rejected up front (config, parameters, unknown
/// targets or skips, cycles) is rejected before the first action runs.
/// `--list` and `--plan` return [`RunOutcome::Succeeded`] without running
/// anything. An aborted run is returned as an error carrying the failing
/// task's original error.
pub fn run(args: CliArgs) -> Result<RunOutcome> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.list {
        print_targets(&cfg);
        return Ok(RunOutcome::Succeeded);
    }

    let params = build_parameters(&cfg, &args.params)?;
    let root = config_root_dir(&config_path);
    let registry = build_registry(&cfg, &root, Arc::new(RealFileSystem))?;

    let targets = requested_targets(&args.targets, &cfg)?;
    let plan = resolve(&registry, &targets)?;
    check_skips(&registry, &args.skip)?;

    if args.plan {
        print_plan(&plan, &cfg, &params, &root, &args.skip);
        return Ok(RunOutcome::Succeeded);
    }

    info!(targets = ?plan.targets(), tasks = plan.len(), "starting run");
    let ctx = RunContext::new(params).with_skipped(args.skip.iter().cloned());
    let report = Executor::new(&registry).execute(&plan, ctx);

    println!("{report}");

    let report = report.into_result()?;
    Ok(report.outcome().clone())
}

/// CLI targets if any, else the configured default target.
fn requested_targets(cli_targets: &[String], cfg: &ConfigFile) -> errors::Result<Vec<TaskName>> {
    if !cli_targets.is_empty() {
        return Ok(cli_targets.to_vec());
    }
    match &cfg.config.default_target {
        Some(target) => {
            debug!(target = %target, "no targets given; using default target");
            Ok(vec![target.clone()])
        }
        None => Err(BuildGraphError::NoTargets),
    }
}

fn check_skips(registry: &TaskRegistry, skips: &[String]) -> errors::Result<()> {
    match skips.iter().find(|s| !registry.contains(s)) {
        Some(unknown) => Err(BuildGraphError::UnknownTarget(unknown.clone())),
        None => Ok(()),
    }
}

/// `--list` output: targets in declaration order with their edges.
fn print_targets(cfg: &ConfigFile) {
    let default = cfg.config.default_target.as_deref();
    println!("targets ({}):", cfg.task.len());
    for task in &cfg.task {
        let marker = if Some(task.name.as_str()) == default {
            " (default)"
        } else {
            ""
        };
        println!("  - {}{marker}", task.name);
        if let Some(description) = &task.description {
            println!("      {description}");
        }
        if !task.depends_on.is_empty() {
            println!("      depends_on: {:?}", task.depends_on);
        }
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
        if task.best_effort {
            println!("      best_effort: true");
        }
    }
}

/// `--plan` output: resolved order, guards, skips and commands.
fn print_plan(plan: &ExecutionPlan, cfg: &ConfigFile, params: &Parameters, root: &Path, skips: &[String]) {
    print!("{}", describe_plan(plan, cfg, params, root, skips));
    debug!("plan complete (no execution)");
}

/// Text printed by `--plan`.
///
/// After the numbered order, each step with something to say gets its notes
/// (skipped, guarded, best-effort) and its command line with parameters
/// filled in and secrets masked. `{item}` is left as-is for `foreach` tasks,
/// and `args_if_succeeded` is not shown since it depends on the run.
pub fn describe_plan(
    plan: &ExecutionPlan,
    cfg: &ConfigFile,
    params: &Parameters,
    root: &Path,
    skips: &[String],
) -> String {
    let root = root.display().to_string();
    let mut out = String::new();

    let _ = writeln!(out, "buildgraph plan");
    let _ = writeln!(out, "  parameters: {}", params.describe());
    let _ = writeln!(out);
    let _ = write!(out, "{plan}");

    for name in plan.order() {
        let Some(task) = cfg.task(name) else {
            continue;
        };

        let mut notes = Vec::new();
        if skips.contains(name) {
            notes.push("skipped on request");
        }
        if task.only_when.is_some() {
            notes.push("guarded");
        }
        if task.best_effort {
            notes.push("best-effort");
        }
        if !notes.is_empty() {
            let _ = writeln!(out, "  {name}: {}", notes.join(", "));
        }

        if let Some(cmd) = &task.cmd {
            let line = params
                .interpolate_with(cmd, &[("root", root.as_str()), ("item", "{item}")])
                .unwrap_or_else(|_| cmd.clone());
            let _ = writeln!(out, "  {name}$ {}", params.mask(&line));
        }
    }

    out
}
