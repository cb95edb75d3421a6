//! Command-line configuration parsed from environment variables.
//!
//! The log level comes from `STEPDOWN_LOG_LEVEL`; parser settings come from
//! the variables documented on [`ParseConfig`]. Command-line flags override
//! both.

use std::env;
use std::str::FromStr;

use stepdown::ParseConfig;

use crate::error::CliError;

/// Environment variable holding the log level.
pub const LOG_LEVEL_VAR: &str = "STEPDOWN_LOG_LEVEL";

/// Log level enumeration matching tracing crate levels.
///
/// Defaults to `Info` when not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Most verbose logging.
    Trace,
    /// Debug-level information, including concept and filter decisions.
    Debug,
    /// Standard informational messages.
    #[default]
    Info,
    /// Parse warnings and other suspicious input.
    Warn,
    /// Failures only.
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(CliError::InvalidConfig(format!(
                "unknown log level '{s}', expected one of: trace, debug, info, warn, error"
            ))),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Configuration for one invocation of the binary.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: LogLevel,
    /// Settings handed to the parser.
    pub parse: ParseConfig,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidConfig`] for an unknown log level and
    /// [`CliError::Config`] for an invalid parser setting.
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// See [`CliConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(val) => val.parse()?,
            None => LogLevel::default(),
        };
        let parse = ParseConfig::from_lookup(lookup)?;
        Ok(Self { log_level, parse })
    }

    /// Apply optional overrides to an existing configuration.
    ///
    /// This is intended for CLI overrides that should take precedence over
    /// environment-based defaults.
    #[must_use]
    pub fn apply_overrides(mut self, log_level: Option<LogLevel>) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }

    /// Create a new configuration with the specified log level.
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;
    use stepdown::ScenarioInit;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[rstest]
    #[case("trace", LogLevel::Trace)]
    #[case("debug", LogLevel::Debug)]
    #[case("info", LogLevel::Info)]
    #[case("warn", LogLevel::Warn)]
    #[case("warning", LogLevel::Warn)]
    #[case("error", LogLevel::Error)]
    #[case("DEBUG", LogLevel::Debug)]
    fn log_level_parses_valid_values(#[case] text: &str, #[case] expected: LogLevel) {
        assert_eq!(text.parse::<LogLevel>().ok(), Some(expected));
    }

    #[test]
    fn log_level_rejects_invalid_values() {
        let result = "loud".parse::<LogLevel>();
        assert!(result.unwrap_err().to_string().contains("unknown log level"));
    }

    #[test]
    fn log_level_as_filter_str_round_trips() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            assert_eq!(level.as_filter_str().parse::<LogLevel>().ok(), Some(level));
        }
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = CliConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.parse, ParseConfig::default());
    }

    #[test]
    fn variables_feed_both_layers() {
        let config = CliConfig::from_lookup(lookup_from(&[
            (LOG_LEVEL_VAR, "warn"),
            ("STEPDOWN_SCENARIO_INIT", "lazy"),
        ]))
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.parse.scenario_init, ScenarioInit::Lazy);
    }

    #[test]
    fn invalid_parser_setting_is_reported() {
        let result = CliConfig::from_lookup(lookup_from(&[(
            "STEPDOWN_CASE_SENSITIVE_TAGS",
            "sometimes",
        )]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn flag_overrides_environment() {
        let config = CliConfig::from_lookup(lookup_from(&[(LOG_LEVEL_VAR, "error")]))
            .unwrap()
            .apply_overrides(Some(LogLevel::Trace));
        assert_eq!(config.log_level, LogLevel::Trace);

        let untouched = CliConfig::default().apply_overrides(None);
        assert_eq!(untouched.log_level, LogLevel::Info);
    }
}
