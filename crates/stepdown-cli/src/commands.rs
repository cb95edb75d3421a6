//! Subcommand definitions and their implementations.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use eyre::Result;
use stepdown::{ExecutionPlan, ScenarioFilter, Specification, Step, TagFilter, filter_specs};

use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::{self, PlannedInstance, SpecListing};
use crate::workspace::{Roots, Workspace};

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse every spec and concept file and report problems.
    Validate(SourceArgs),
    /// List specs and scenarios, optionally filtered.
    List(SelectArgs),
    /// Print the distinct step texts runners must implement.
    Steps(StepsArgs),
    /// Print every scenario instance with its resolved steps.
    Plan(SelectArgs),
}

/// Where to look for input files.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Directory (or file) holding specs; may be repeated.
    #[arg(long = "specs", value_name = "DIR", default_value = "specs")]
    pub specs: Vec<PathBuf>,
    /// Directory (or file) holding concepts; defaults to the spec directories.
    #[arg(long = "concepts", value_name = "DIR")]
    pub concepts: Vec<PathBuf>,
}

impl SourceArgs {
    fn roots(&self) -> Roots {
        Roots {
            specs: self.specs.clone(),
            concepts: self.concepts.clone(),
        }
    }
}

/// Inputs plus scenario selection.
#[derive(Debug, Clone, Args)]
pub struct SelectArgs {
    /// Input locations.
    #[command(flatten)]
    pub sources: SourceArgs,
    /// Tag expression such as `smoke & !slow`.
    #[arg(long, value_name = "EXPR")]
    pub tags: Option<String>,
    /// Scenario heading to select; may be repeated.
    #[arg(long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,
    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Inputs plus output format for `steps`.
#[derive(Debug, Clone, Args)]
pub struct StepsArgs {
    /// Input locations.
    #[command(flatten)]
    pub sources: SourceArgs,
    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// Everything parsed and resolved.
    Success,
    /// Problems were reported on the output.
    Failed,
}

/// Build the scenario filters requested by `command`.
///
/// # Errors
///
/// Returns [`CliError::TagExpression`] when the `--tags` expression is
/// malformed. A blank expression selects every scenario.
pub fn selection(command: &Command, case_sensitive: bool) -> Result<Vec<ScenarioFilter>, CliError> {
    let (Command::List(args) | Command::Plan(args)) = command else {
        return Ok(Vec::new());
    };
    let mut filters = Vec::new();
    if let Some(expression) = args.tags.as_deref().filter(|e| !e.trim().is_empty()) {
        filters.push(ScenarioFilter::Tags(TagFilter::parse(
            expression,
            case_sensitive,
        )?));
    }
    if !args.scenarios.is_empty() {
        filters.push(ScenarioFilter::Names(args.scenarios.clone()));
    }
    Ok(filters)
}

/// Run `command`, writing its output to `writer`.
///
/// # Errors
///
/// Returns an error when input files cannot be discovered or read, or when
/// writing output fails. Problems inside the files are reported on `writer`
/// and signalled through [`Outcome::Failed`].
pub fn run(
    command: &Command,
    filters: &[ScenarioFilter],
    config: &CliConfig,
    writer: &mut dyn Write,
) -> Result<Outcome> {
    match command {
        Command::Validate(sources) => validate(sources, config, writer),
        Command::List(args) => list(args, filters, config, writer),
        Command::Steps(args) => steps(args, config, writer),
        Command::Plan(args) => plan(args, filters, config, writer),
    }
}

fn load(sources: &SourceArgs, config: &CliConfig) -> Result<Workspace> {
    let workspace = Workspace::load(&sources.roots(), &config.parse)?;
    workspace.log_warnings();
    Ok(workspace)
}

fn report_errors(workspace: &Workspace, writer: &mut dyn Write) -> Result<usize> {
    let mut count = 0;
    for error in workspace.errors() {
        output::write_parse_error(writer, error)?;
        count += 1;
    }
    Ok(count)
}

fn validate(sources: &SourceArgs, config: &CliConfig, writer: &mut dyn Write) -> Result<Outcome> {
    let workspace = load(sources, config)?;
    let errors = report_errors(&workspace, writer)?;
    let scenarios = workspace
        .specs
        .iter()
        .map(|spec| spec.specification.scenarios.len())
        .sum();
    output::write_summary(writer, workspace.specs.len(), scenarios, errors)?;
    Ok(if errors == 0 {
        Outcome::Success
    } else {
        Outcome::Failed
    })
}

/// Load, report errors, and filter; `None` when errors were reported.
fn selected_specs(
    sources: &SourceArgs,
    filters: &[ScenarioFilter],
    config: &CliConfig,
    writer: &mut dyn Write,
) -> Result<Option<Vec<Specification>>> {
    let workspace = load(sources, config)?;
    if report_errors(&workspace, writer)? > 0 {
        return Ok(None);
    }
    let specs = filter_specs(workspace.into_valid_specs(), filters);
    tracing::debug!(specs = specs.len(), "selected specs");
    Ok(Some(specs))
}

fn list(
    args: &SelectArgs,
    filters: &[ScenarioFilter],
    config: &CliConfig,
    writer: &mut dyn Write,
) -> Result<Outcome> {
    let Some(specs) = selected_specs(&args.sources, filters, config, writer)? else {
        return Ok(Outcome::Failed);
    };
    if args.json {
        let listings: Vec<SpecListing<'_>> = specs.iter().map(SpecListing::from).collect();
        output::write_json(writer, &listings)?;
    } else {
        for spec in &specs {
            output::write_spec_listing(writer, spec)?;
        }
    }
    Ok(Outcome::Success)
}

/// Plain steps keyed by canonical value; the first parameterized spelling
/// seen is kept.
fn collect_step_values(step: &Step, values: &mut BTreeMap<String, String>) {
    if step.is_concept() {
        for nested in step.nested_steps() {
            collect_step_values(nested, values);
        }
    } else if !values.contains_key(&step.value) {
        let value = step.step_value();
        values.insert(value.value, value.parameterized);
    }
}

fn steps(args: &StepsArgs, config: &CliConfig, writer: &mut dyn Write) -> Result<Outcome> {
    let workspace = load(&args.sources, config)?;
    for error in workspace.errors() {
        tracing::warn!("{error}");
    }
    let mut values = BTreeMap::new();
    for step in workspace
        .concepts
        .iter()
        .flat_map(|concept| concept.step().nested_steps())
    {
        collect_step_values(step, &mut values);
    }
    for spec in workspace.into_valid_specs() {
        for step in spec.steps() {
            collect_step_values(step, &mut values);
        }
    }
    let parameterized: Vec<&String> = values.values().collect();
    if args.json {
        output::write_json(writer, &parameterized)?;
    } else {
        for value in parameterized {
            output::write_step_value(writer, value)?;
        }
    }
    Ok(Outcome::Success)
}

fn plan(
    args: &SelectArgs,
    filters: &[ScenarioFilter],
    config: &CliConfig,
    writer: &mut dyn Write,
) -> Result<Outcome> {
    let Some(specs) = selected_specs(&args.sources, filters, config, writer)? else {
        return Ok(Outcome::Failed);
    };
    let mut outcome = Outcome::Success;
    let mut planned = Vec::new();
    for spec in &specs {
        let execution = ExecutionPlan::new(spec, config.parse.scenario_init);
        tracing::debug!(
            spec = %spec.origin,
            instances = execution.instance_count(),
            "planned spec"
        );
        for instance in execution.instances() {
            let resolved = match instance.resolve_steps() {
                Ok(resolved) => resolved,
                Err(error) => {
                    writeln!(
                        writer,
                        "{} :: {}: {error}",
                        spec.origin, instance.scenario.heading.text
                    )?;
                    outcome = Outcome::Failed;
                    continue;
                }
            };
            if args.json {
                planned.push(PlannedInstance::new(&instance, &resolved));
            } else {
                output::write_instance(writer, &instance, &resolved)?;
            }
        }
    }
    if args.json {
        output::write_json(writer, &planned)?;
    }
    Ok(outcome)
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(subcommand)]
        command: Command,
    }

    fn command(args: &[&str]) -> Command {
        let argv = std::iter::once("stepdown").chain(args.iter().copied());
        Harness::try_parse_from(argv).expect("arguments parse").command
    }

    #[test]
    fn specs_default_to_the_specs_directory() {
        let Command::Validate(sources) = command(&["validate"]) else {
            panic!("expected validate");
        };
        assert_eq!(sources.specs, [PathBuf::from("specs")]);
        assert!(sources.concepts.is_empty());
    }

    #[test]
    fn selection_combines_tags_and_names() {
        let parsed = command(&[
            "list",
            "--tags",
            "smoke & !slow",
            "--scenario",
            "Login",
            "--scenario",
            "Logout",
        ]);
        let filters = selection(&parsed, false).expect("valid selection");
        assert_eq!(filters.len(), 2);
        assert!(matches!(
            filters.last(),
            Some(ScenarioFilter::Names(names)) if names.len() == 2
        ));
    }

    #[test]
    fn malformed_tags_are_rejected_before_loading() {
        let parsed = command(&["plan", "--tags", "smoke &", "--specs", "missing"]);
        assert!(matches!(
            selection(&parsed, false),
            Err(CliError::TagExpression(_))
        ));
    }

    #[test]
    fn blank_tags_apply_no_filter() {
        let parsed = command(&["list", "--tags", "  "]);
        let filters = selection(&parsed, false).expect("blank expression is no filter");
        assert!(filters.is_empty());
    }

    #[test]
    fn validate_and_steps_take_no_filters() {
        let filters = selection(&command(&["steps", "--json"]), false).expect("no filters");
        assert!(filters.is_empty());
    }
}
