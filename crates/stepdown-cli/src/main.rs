//! The `stepdown` binary.

use std::io::Write;

use clap::Parser;

use stepdown_cli::commands::{self, Command, Outcome};
use stepdown_cli::config::{CliConfig, LogLevel};
use stepdown_cli::error::CliError;
use stepdown_cli::logging::init_logging;

/// Validate, list and plan Markdown test specifications.
#[derive(Parser, Debug)]
#[command(name = "stepdown", version, about)]
struct Args {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            let fallback = CliConfig::default();
            init_logging(&fallback);
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };
    init_logging(&config);

    let filters = match commands::selection(&args.command, config.parse.case_sensitive_tags) {
        Ok(filters) => filters,
        Err(e) => {
            tracing::error!(error = %e, "invalid arguments");
            std::process::exit(2);
        }
    };

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    let code = match commands::run(&args.command, &filters, &config, &mut writer) {
        Ok(Outcome::Success) => 0,
        Ok(Outcome::Failed) => 1,
        Err(e) => {
            tracing::error!(error = ?e, "stepdown failed");
            1
        }
    };
    if let Err(e) = writer.flush() {
        tracing::error!(error = %e, "failed to flush output");
    }
    std::process::exit(code);
}

fn build_config(args: &Args) -> Result<CliConfig, CliError> {
    let config = CliConfig::from_env()?;
    Ok(config.apply_overrides(args.log_level))
}
