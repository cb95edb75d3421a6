//! Command-line front end for stepdown specifications.
//!
//! The `stepdown` binary discovers spec (`*.spec`, `*.md`) and concept
//! (`*.cpt`) files, parses them against a shared concept dictionary and
//! offers four subcommands:
//!
//! - `validate` reports parse errors and a summary
//! - `list` prints the selected specs and scenarios
//! - `steps` prints the distinct step texts a runner must implement
//! - `plan` prints every scenario instance with its resolved steps
//!
//! # Configuration
//!
//! - `STEPDOWN_LOG_LEVEL`: log verbosity (trace, debug, info, warn, error)
//! - `STEPDOWN_DATA_DIR`, `STEPDOWN_CASE_SENSITIVE_TAGS`,
//!   `STEPDOWN_SCENARIO_INIT`: see [`stepdown::ParseConfig`]

pub mod commands;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
mod output;
pub mod workspace;
