// src/config/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile, TaskConfig};
use crate::dag::cycle::find_cycle;
use crate::errors::{BuildGraphError, Result};
use crate::params::{placeholders, BUILTIN_PLACEHOLDERS};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BuildGraphError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.param, raw.task))
    }
}

/// Run every check on a raw config. The first failure is returned.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_raw_config(cfg)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_names(cfg)?;
    for task in &cfg.task {
        validate_task_body(task)?;
    }
    validate_task_references(cfg)?;
    validate_placeholders(cfg)?;
    validate_default_target(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(BuildGraphError::ConfigError(
            "config must contain at least one [[task]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_names(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for task in &cfg.task {
        if task.name.trim().is_empty() {
            return Err(BuildGraphError::ConfigError(
                "task name must not be empty".to_string(),
            ));
        }
        if !seen.insert(task.name.as_str()) {
            return Err(BuildGraphError::DuplicateTask(task.name.clone()));
        }
    }
    Ok(())
}

fn validate_task_body(task: &TaskConfig) -> Result<()> {
    let name = &task.name;

    if task.cmd.is_none() && task.clean_dirs.is_empty() && task.depends_on.is_empty() {
        return Err(BuildGraphError::ConfigError(format!(
            "task '{name}' has nothing to do: set `cmd`, `clean_dirs` or `depends_on`"
        )));
    }
    if task.fallback_cmd.is_some() && task.cmd.is_none() {
        return Err(BuildGraphError::ConfigError(format!(
            "task '{name}' has `fallback_cmd` but no `cmd`"
        )));
    }
    if task.foreach.is_some() && task.cmd.is_none() {
        return Err(BuildGraphError::ConfigError(format!(
            "task '{name}' has `foreach` but no `cmd`"
        )));
    }
    if task.only_when.as_ref().is_some_and(|g| g.is_empty()) {
        return Err(BuildGraphError::ConfigError(format!(
            "task '{name}' has an empty `only_when`"
        )));
    }
    Ok(())
}

fn validate_task_references(cfg: &RawConfigFile) -> Result<()> {
    let known: HashSet<&str> = cfg.task.iter().map(|t| t.name.as_str()).collect();

    for task in &cfg.task {
        let refs = task
            .depends_on
            .iter()
            .chain(task.after.iter())
            .chain(task.args_if_succeeded.keys())
            .chain(task.only_when.iter().flat_map(|g| g.task_refs()));

        for dep in refs {
            if !known.contains(dep.as_str()) {
                return Err(BuildGraphError::UnknownDependency {
                    task: task.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }

        if task.depends_on.contains(&task.name) || task.after.contains(&task.name) {
            return Err(BuildGraphError::ConfigError(format!(
                "task '{}' cannot depend on itself",
                task.name
            )));
        }
    }
    Ok(())
}

fn validate_placeholders(cfg: &RawConfigFile) -> Result<()> {
    for task in &cfg.task {
        let templates = task
            .cmd
            .iter()
            .chain(task.fallback_cmd.iter())
            .chain(task.cwd.iter())
            .chain(task.clean_dirs.iter())
            .chain(task.env.values())
            .chain(task.args_if_succeeded.values());

        for template in templates {
            for name in placeholders(template) {
                if name == "item" && task.foreach.is_none() {
                    return Err(BuildGraphError::ConfigError(format!(
                        "task '{}' uses {{item}} without `foreach`",
                        task.name
                    )));
                }
                if !BUILTIN_PLACEHOLDERS.contains(&name.as_str()) && !cfg.param.contains_key(&name)
                {
                    return Err(BuildGraphError::UnknownParameter(format!(
                        "{name} (referenced by task '{}')",
                        task.name
                    )));
                }
            }
        }

        // The fallback runs once for the whole task, never per item.
        if let Some(fallback) = &task.fallback_cmd {
            if placeholders(fallback).iter().any(|name| name == "item") {
                return Err(BuildGraphError::ConfigError(format!(
                    "task '{}' uses {{item}} in `fallback_cmd`; the fallback is not run per item",
                    task.name
                )));
            }
        }

        for name in task.only_when.iter().flat_map(|g| g.param_refs()) {
            if !cfg.param.contains_key(name) {
                return Err(BuildGraphError::UnknownParameter(format!(
                    "{name} (referenced by `only_when` of task '{}')",
                    task.name
                )));
            }
        }
    }
    Ok(())
}

fn validate_default_target(cfg: &RawConfigFile) -> Result<()> {
    if let Some(target) = &cfg.config.default_target {
        if !cfg.task.iter().any(|t| &t.name == target) {
            return Err(BuildGraphError::UnknownTarget(target.clone()));
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dep -> task. `after` edges count too: a cycle through
    // them can never be ordered once both ends are scheduled.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for task in &cfg.task {
        graph.add_node(task.name.as_str());
    }

    for task in &cfg.task {
        for dep in task.depends_on.iter().chain(task.after.iter()) {
            graph.add_edge(dep.as_str(), task.name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(_) => {
            let cycle = find_cycle(&graph)
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect();
            Err(BuildGraphError::CyclicDependency { cycle })
        }
    }
}
