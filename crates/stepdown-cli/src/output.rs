//! Helpers for rendering command output.

use std::io::Write;

use eyre::{Context, Result};
use serde::Serialize;
use stepdown::{ParseError, ResolvedScenario, ResolvedStep, ScenarioInstance, Specification};

pub(crate) fn write_parse_error(writer: &mut dyn Write, error: &ParseError) -> Result<()> {
    writeln!(writer, "{error}")
        .wrap_err_with(|| format!("failed to write error for {}:{}", error.origin, error.line))
}

pub(crate) fn write_summary(
    writer: &mut dyn Write,
    specs: usize,
    scenarios: usize,
    errors: usize,
) -> Result<()> {
    writeln!(
        writer,
        "{specs} {}, {scenarios} {}, {errors} {}",
        plural(specs, "specification", "specifications"),
        plural(scenarios, "scenario", "scenarios"),
        plural(errors, "error", "errors"),
    )
    .wrap_err("failed to write validation summary")
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    }
}

pub(crate) fn write_spec_listing(writer: &mut dyn Write, spec: &Specification) -> Result<()> {
    writeln!(
        writer,
        "{} :: {}{}",
        spec.origin,
        spec.heading_text(),
        format_tags(spec.tag_values())
    )
    .wrap_err_with(|| format!("failed to write listing for {}", spec.origin))?;
    for scenario in &spec.scenarios {
        writeln!(
            writer,
            "  {} (line {}){}",
            scenario.heading.text,
            scenario.heading.line,
            format_tags(scenario.tag_values())
        )
        .wrap_err_with(|| {
            format!(
                "failed to write scenario {} :: {}",
                spec.origin, scenario.heading.text
            )
        })?;
    }
    Ok(())
}

pub(crate) fn write_step_value(writer: &mut dyn Write, value: &str) -> Result<()> {
    writeln!(writer, "{value}").wrap_err_with(|| format!("failed to write step '{value}'"))
}

fn format_rows(instance: &ScenarioInstance<'_>) -> String {
    let rows: Vec<String> = [
        instance.spec_row.map(|row| format!("spec row {}", row + 1)),
        instance
            .scenario_row
            .map(|row| format!("scenario row {}", row + 1)),
    ]
    .into_iter()
    .flatten()
    .collect();
    if rows.is_empty() {
        String::new()
    } else {
        format!(" ({})", rows.join(", "))
    }
}

pub(crate) fn write_instance(
    writer: &mut dyn Write,
    instance: &ScenarioInstance<'_>,
    resolved: &ResolvedScenario,
) -> Result<()> {
    writeln!(
        writer,
        "{} :: {}{}",
        instance.spec.origin,
        instance.scenario.heading.text,
        format_rows(instance)
    )
    .wrap_err_with(|| {
        format!(
            "failed to write plan entry {} :: {}",
            instance.spec.origin, instance.scenario.heading.text
        )
    })?;
    resolved
        .contexts
        .iter()
        .chain(&resolved.steps)
        .chain(&resolved.teardown)
        .try_for_each(|step| write_resolved_step(writer, step, 1))
}

fn write_resolved_step(writer: &mut dyn Write, step: &ResolvedStep, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    writeln!(writer, "{indent}* {}", step.text())
        .wrap_err_with(|| format!("failed to write step at line {}", step.line))?;
    step.nested
        .iter()
        .try_for_each(|nested| write_resolved_step(writer, nested, depth + 1))
}

pub(crate) fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).wrap_err("failed to serialise JSON output")?;
    writeln!(writer).wrap_err("failed to terminate JSON output")
}

/// JSON form of one listed spec.
#[derive(Debug, Serialize)]
pub(crate) struct SpecListing<'a> {
    file: &'a str,
    heading: &'a str,
    tags: &'a [String],
    scenarios: Vec<ScenarioListing<'a>>,
}

#[derive(Debug, Serialize)]
struct ScenarioListing<'a> {
    heading: &'a str,
    line: usize,
    tags: &'a [String],
}

impl<'a> From<&'a Specification> for SpecListing<'a> {
    fn from(spec: &'a Specification) -> Self {
        Self {
            file: &spec.origin,
            heading: spec.heading_text(),
            tags: spec.tag_values(),
            scenarios: spec
                .scenarios
                .iter()
                .map(|scenario| ScenarioListing {
                    heading: &scenario.heading.text,
                    line: scenario.heading.line,
                    tags: scenario.tag_values(),
                })
                .collect(),
        }
    }
}

/// JSON form of one planned scenario run.
#[derive(Debug, Serialize)]
pub(crate) struct PlannedInstance<'a> {
    file: &'a str,
    spec: &'a str,
    scenario: &'a str,
    spec_row: Option<usize>,
    scenario_row: Option<usize>,
    contexts: Vec<PlannedStep>,
    steps: Vec<PlannedStep>,
    teardown: Vec<PlannedStep>,
}

#[derive(Debug, Serialize)]
struct PlannedStep {
    text: String,
    line: usize,
    concept: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    nested: Vec<PlannedStep>,
}

impl From<&ResolvedStep> for PlannedStep {
    fn from(step: &ResolvedStep) -> Self {
        Self {
            text: step.text(),
            line: step.line,
            concept: step.is_concept,
            nested: step.nested.iter().map(Self::from).collect(),
        }
    }
}

impl<'a> PlannedInstance<'a> {
    pub(crate) fn new(instance: &ScenarioInstance<'a>, resolved: &ResolvedScenario) -> Self {
        let convert = |steps: &[ResolvedStep]| -> Vec<PlannedStep> {
            steps.iter().map(PlannedStep::from).collect()
        };
        Self {
            file: &instance.spec.origin,
            spec: instance.spec.heading_text(),
            scenario: &instance.scenario.heading.text,
            spec_row: instance.spec_row,
            scenario_row: instance.scenario_row,
            contexts: convert(&resolved.contexts),
            steps: convert(&resolved.steps),
            teardown: convert(&resolved.teardown),
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use rstest::rstest;
    use stepdown::{ConceptDictionary, SpecParser, SpecialResolver};

    use super::*;

    fn parse(text: &str) -> Specification {
        let resolver = SpecialResolver::default();
        let dictionary = ConceptDictionary::default();
        let parsed = SpecParser::new(&dictionary, &resolver).parse(text, "cart.spec");
        assert!(parsed.result.is_ok(), "{:?}", parsed.result.errors);
        parsed.specification
    }

    fn render(write: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).expect("write succeeds");
        String::from_utf8(buffer).expect("utf8")
    }

    #[rstest]
    #[case(1, 1, 0, "1 specification, 1 scenario, 0 errors\n")]
    #[case(2, 5, 1, "2 specifications, 5 scenarios, 1 error\n")]
    fn summary_pluralises(
        #[case] specs: usize,
        #[case] scenarios: usize,
        #[case] errors: usize,
        #[case] expected: &str,
    ) {
        let text = render(|writer| write_summary(writer, specs, scenarios, errors));
        assert_eq!(text, expected);
    }

    #[test]
    fn parse_errors_use_the_diagnostic_format() {
        let error = ParseError::new(
            "a.spec",
            3,
            "* enter <pwd>",
            "Dynamic parameter <pwd> could not be resolved",
        );
        let text = render(|writer| write_parse_error(writer, &error));
        assert_eq!(
            text,
            "a.spec:3 Dynamic parameter <pwd> could not be resolved => '* enter <pwd>'\n"
        );
    }

    #[test]
    fn listing_shows_scenarios_with_lines_and_tags() {
        let spec = parse("# Cart\ntags: shop\n## Add item\ntags: smoke, fast\n* add \"apple\"\n");
        let text = render(|writer| write_spec_listing(writer, &spec));
        assert_eq!(text, "cart.spec :: Cart [shop]\n  Add item (line 3) [smoke, fast]\n");
    }

    #[test]
    fn plan_entries_nest_concept_steps() {
        let spec = parse("# Cart\n|item|\n|----|\n|pear|\n## Add item\n* add <item>\n");
        let plan = stepdown::ExecutionPlan::new(&spec, stepdown::ScenarioInit::Eager);
        let instance = plan.instances().next().expect("one instance");
        let resolved = instance.resolve_steps().expect("resolves");
        let text = render(|writer| write_instance(writer, &instance, &resolved));
        assert_eq!(text, "cart.spec :: Add item (spec row 1)\n  * add pear\n");

        let json = serde_json::to_value(PlannedInstance::new(&instance, &resolved))
            .expect("serialises");
        assert_eq!(json["spec_row"], 0);
        assert_eq!(json["steps"][0]["text"], "add pear");
        assert!(json["steps"][0].get("nested").is_none());
    }
}
