#![allow(dead_code)]

use std::collections::BTreeMap;

use buildgraph::config::{
    ConfigFile, ConfigSection, GuardConfig, ParamSpec, RawConfigFile, TaskConfig,
};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                param: BTreeMap::new(),
                task: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, task: TaskConfig) -> Self {
        self.config.task.push(task);
        self
    }

    pub fn with_param(mut self, name: &str, default: Option<&str>) -> Self {
        self.config.param.insert(
            name.to_string(),
            ParamSpec {
                default: default.map(str::to_string),
                ..ParamSpec::default()
            },
        );
        self
    }

    pub fn with_secret_param(mut self, name: &str, default: Option<&str>) -> Self {
        self.config.param.insert(
            name.to_string(),
            ParamSpec {
                default: default.map(str::to_string),
                secret: true,
                ..ParamSpec::default()
            },
        );
        self
    }

    pub fn with_default_target(mut self, target: &str) -> Self {
        self.config.config.default_target = Some(target.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            task: TaskConfig {
                name: name.to_string(),
                ..TaskConfig::default()
            },
        }
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.task.cmd = Some(cmd.to_string());
        self
    }

    pub fn fallback_cmd(mut self, cmd: &str) -> Self {
        self.task.fallback_cmd = Some(cmd.to_string());
        self
    }

    pub fn depends_on(mut self, dep: &str) -> Self {
        self.task.depends_on.push(dep.to_string());
        self
    }

    pub fn after(mut self, other: &str) -> Self {
        self.task.after.push(other.to_string());
        self
    }

    pub fn best_effort(mut self, val: bool) -> Self {
        self.task.best_effort = val;
        self
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.task.cwd = Some(cwd.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.task.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn clean_dir(mut self, dir: &str) -> Self {
        self.task.clean_dirs.push(dir.to_string());
        self
    }

    pub fn foreach(mut self, pattern: &str) -> Self {
        self.task.foreach = Some(pattern.to_string());
        self
    }

    pub fn args_if_succeeded(mut self, task: &str, args: &str) -> Self {
        self.task
            .args_if_succeeded
            .insert(task.to_string(), args.to_string());
        self
    }

    pub fn only_when(mut self, guard: GuardConfig) -> Self {
        self.task.only_when = Some(guard);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
