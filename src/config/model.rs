// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// default_target = "publish"
///
/// [param.configuration]
/// default = "Debug"
/// env = "CONFIGURATION"
///
/// [[task]]
/// name = "compile"
/// depends_on = ["restore"]
/// cmd = "dotnet build -c {configuration}"
/// ```
///
/// Tasks are an array of tables so that declaration order is kept; it is
/// the tie-breaker when ordering independent tasks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Declared parameters from `[param.<name>]`.
    #[serde(default)]
    pub param: BTreeMap<String, ParamSpec>,

    /// All tasks from `[[task]]`, in declaration order.
    #[serde(default)]
    pub task: Vec<TaskConfig>,
}

/// A validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)` (see `config::validate`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub param: BTreeMap<String, ParamSpec>,
    pub task: Vec<TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        param: BTreeMap<String, ParamSpec>,
        task: Vec<TaskConfig>,
    ) -> Self {
        Self {
            config,
            param,
            task,
        }
    }

    pub fn task(&self, name: &str) -> Option<&TaskConfig> {
        self.task.iter().find(|t| t.name == name)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Target run when none is given on the command line.
    #[serde(default)]
    pub default_target: Option<String>,
}

/// `[param.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParamSpec {
    #[serde(default)]
    pub default: Option<String>,

    /// Environment variable that overrides `default`.
    #[serde(default)]
    pub env: Option<String>,

    /// Mask the value in logs, plans and echoed command lines.
    #[serde(default)]
    pub secret: bool,

    #[serde(default)]
    pub description: Option<String>,
}

/// One `[[task]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Hard dependencies; always scheduled together with this task.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Soft ordering: run after these tasks when they are also scheduled.
    #[serde(default)]
    pub after: Vec<String>,

    /// A failure of this task does not abort the run.
    #[serde(default)]
    pub best_effort: bool,

    /// Shell command to run.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Command run when `cmd` fails.
    #[serde(default)]
    pub fallback_cmd: Option<String>,

    /// Working directory, relative to the config root.
    #[serde(default)]
    pub cwd: Option<String>,

    /// Extra environment for the command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Directories created, or emptied if present, before `cmd` runs.
    #[serde(default)]
    pub clean_dirs: Vec<String>,

    /// Glob relative to the config root; `cmd` runs once per match with
    /// `{item}` bound to the matched path.
    #[serde(default)]
    pub foreach: Option<String>,

    /// Arguments appended to `cmd` when the named task already succeeded in
    /// this run, e.g. `{ restore = "--no-restore" }`.
    #[serde(default)]
    pub args_if_succeeded: BTreeMap<String, String>,

    #[serde(default)]
    pub only_when: Option<GuardConfig>,
}

/// `only_when = { ... }`: every listed condition must hold.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    /// Parameters that must have non-blank values.
    #[serde(default)]
    pub params_set: Vec<String>,

    /// Parameters that must equal the given values.
    #[serde(default)]
    pub param_equals: BTreeMap<String, String>,

    /// Environment variables that must be present and non-blank.
    #[serde(default)]
    pub env_set: Vec<String>,

    /// Tasks that must have succeeded earlier in the run.
    #[serde(default)]
    pub succeeded: Vec<String>,

    /// Tasks that must not have succeeded earlier in the run.
    #[serde(default)]
    pub not_succeeded: Vec<String>,
}

impl GuardConfig {
    pub fn is_empty(&self) -> bool {
        self.params_set.is_empty()
            && self.param_equals.is_empty()
            && self.env_set.is_empty()
            && self.succeeded.is_empty()
            && self.not_succeeded.is_empty()
    }

    /// Tasks referenced by `succeeded` / `not_succeeded`.
    pub fn task_refs(&self) -> impl Iterator<Item = &String> {
        self.succeeded.iter().chain(self.not_succeeded.iter())
    }

    /// Parameters referenced by `params_set` / `param_equals`.
    pub fn param_refs(&self) -> impl Iterator<Item = &String> {
        self.params_set.iter().chain(self.param_equals.keys())
    }
}
