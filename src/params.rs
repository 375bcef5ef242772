// src/params.rs

//! Named string parameters.
//!
//! Parameters are declared in the config (`[param.<name>]`) and resolved
//! once, before any task runs:
//!
//! 1. `default` from the config
//! 2. the environment variable named by `env` (if present)
//! 3. `--param NAME=VALUE` on the command line
//!
//! Later sources win. Values can be referenced from commands and paths as
//! `{name}`; `{{` and `}}` produce literal braces.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::model::ParamSpec;
use crate::errors::{BuildGraphError, Result};

/// Placeholder names reserved by the pipeline, always valid in templates.
pub const BUILTIN_PLACEHOLDERS: &[&str] = &["root", "item"];

const MASK: &str = "****";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_-]*)\}").expect("placeholder regex is valid")
});

/// Resolved parameter values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: BTreeMap<String, String>,
    declared: BTreeSet<String>,
    secrets: BTreeSet<String>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve declared parameters from defaults, environment and overrides.
    ///
    /// `env` is injected so callers (and tests) control the environment.
    /// Overrides for undeclared names fail with
    /// [`BuildGraphError::UnknownParameter`].
    pub fn resolve<F>(
        specs: &BTreeMap<String, ParamSpec>,
        overrides: &[(String, String)],
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut params = Parameters::new();

        for (name, spec) in specs {
            let from_env = spec.env.as_deref().and_then(|var| env(var));
            let value = from_env.or_else(|| spec.default.clone());

            params.declared.insert(name.clone());
            if let Some(value) = value {
                params.values.insert(name.clone(), value);
            }
            if spec.secret {
                params.secrets.insert(name.clone());
            }
        }

        for (name, value) in overrides {
            if !specs.contains_key(name) {
                return Err(BuildGraphError::UnknownParameter(name.clone()));
            }
            params.values.insert(name.clone(), value.clone());
        }

        debug!(params = %params.describe(), "resolved parameters");
        Ok(params)
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.secrets.insert(name.clone());
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.declared.insert(name.clone());
        self.values.insert(name, value.into());
    }

    /// Whether `name` is a known parameter, with or without a value.
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// `true` if the parameter has a non-blank value.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn is_secret(&self, name: &str) -> bool {
        self.secrets.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Substitute `{name}` placeholders with parameter values.
    ///
    /// Declared parameters without a value expand to an empty string;
    /// undeclared names fail with [`BuildGraphError::UnknownParameter`].
    pub fn interpolate(&self, template: &str) -> Result<String> {
        self.interpolate_with(template, &[])
    }

    /// Like [`Parameters::interpolate`], with extra bindings that take
    /// precedence over parameters (e.g. `root`, `item`).
    pub fn interpolate_with(&self, template: &str, extra: &[(&str, &str)]) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&template[last..whole.start()]);
            last = whole.end();

            match caps.get(1) {
                None => out.push_str(&whole.as_str()[..1]),
                Some(name) => {
                    let name = name.as_str();
                    let value = extra
                        .iter()
                        .find(|(k, _)| *k == name)
                        .map(|(_, v)| *v)
                        .or_else(|| self.get(name));
                    match value {
                        Some(v) => out.push_str(v),
                        None if self.is_declared(name) => {}
                        None => return Err(BuildGraphError::UnknownParameter(name.to_string())),
                    }
                }
            }
        }

        out.push_str(&template[last..]);
        Ok(out)
    }

    /// Replace every secret value in `text` with a mask.
    pub fn mask(&self, text: &str) -> String {
        self.secrets
            .iter()
            .filter_map(|name| self.get(name))
            .filter(|v| !v.is_empty())
            .fold(text.to_string(), |acc, secret| acc.replace(secret, MASK))
    }

    /// `name=value` pairs with secrets masked, for logs and plans.
    pub fn describe(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| {
                if self.is_secret(k) {
                    format!("{k}={MASK}")
                } else {
                    format!("{k}={v}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Names of the `{placeholders}` used in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Parse a `NAME=VALUE` command-line override.
pub fn parse_override(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("parameter name is empty in '{s}'"));
    }
    Ok((name.to_string(), value.to_string()))
}
