//! Parser configuration read from the environment.
//!
//! - `STEPDOWN_DATA_DIR`: root for relative `file:` and `table:` resources
//!   (default `.`).
//! - `STEPDOWN_CASE_SENSITIVE_TAGS`: compare tag names exactly (default
//!   false).
//! - `STEPDOWN_SCENARIO_INIT`: `eager` or `lazy` expansion of scenario data
//!   tables (default `eager`).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::resolver::SpecialResolver;

/// Environment variable naming the resource root.
pub const DATA_DIR_VAR: &str = "STEPDOWN_DATA_DIR";
/// Environment variable enabling case-sensitive tags.
pub const CASE_SENSITIVE_TAGS_VAR: &str = "STEPDOWN_CASE_SENSITIVE_TAGS";
/// Environment variable choosing the scenario expansion strategy.
pub const SCENARIO_INIT_VAR: &str = "STEPDOWN_SCENARIO_INIT";

/// An environment variable held an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The value could not be parsed.
    #[error("invalid value '{value}' for {variable}, expected {expected}")]
    InvalidValue {
        /// Variable name.
        variable: &'static str,
        /// Value found.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
}

/// How scenario data tables are expanded into instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScenarioInit {
    /// Build every instance up front.
    #[default]
    Eager,
    /// Build instances on demand, one row at a time.
    Lazy,
}

impl FromStr for ScenarioInit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eager" => Ok(Self::Eager),
            "lazy" => Ok(Self::Lazy),
            _ => Err(ConfigError::InvalidValue {
                variable: SCENARIO_INIT_VAR,
                value: s.to_owned(),
                expected: "one of: eager, lazy",
            }),
        }
    }
}

fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "Yes" | "on" | "ON" | "On" => Some(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "No" | "off" | "OFF" | "Off" => {
            Some(false)
        }
        _ => None,
    }
}

/// Settings shared by every parse of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    /// Root directory for relative resource paths.
    pub data_dir: PathBuf,
    /// Whether tag names compare case-sensitively.
    pub case_sensitive_tags: bool,
    /// Expansion strategy for scenario data tables.
    pub scenario_init: ScenarioInit,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            case_sensitive_tags: false,
            scenario_init: ScenarioInit::default(),
        }
    }
}

impl ParseConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to an
    /// unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if set.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to an
    /// unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map_or(defaults.data_dir, PathBuf::from);
        let case_sensitive_tags = match lookup(CASE_SENSITIVE_TAGS_VAR) {
            Some(value) => parse_env_bool(&value).ok_or(ConfigError::InvalidValue {
                variable: CASE_SENSITIVE_TAGS_VAR,
                value,
                expected: "a boolean such as true, false, 1 or 0",
            })?,
            None => defaults.case_sensitive_tags,
        };
        let scenario_init = match lookup(SCENARIO_INIT_VAR) {
            Some(value) => value.parse()?,
            None => defaults.scenario_init,
        };
        Ok(Self {
            data_dir,
            case_sensitive_tags,
            scenario_init,
        })
    }

    /// Use `dir` as the resource root.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Choose the scenario expansion strategy.
    #[must_use]
    pub fn with_scenario_init(mut self, init: ScenarioInit) -> Self {
        self.scenario_init = init;
        self
    }

    /// A resolver reading resources below [`ParseConfig::data_dir`].
    #[must_use]
    pub fn resolver(&self) -> SpecialResolver {
        SpecialResolver::with_data_dir(self.data_dir.clone())
    }
}
