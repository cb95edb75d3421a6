//! End-to-end tests: concept files, specs and resources on disk through to
//! resolved scenario instances.

use std::fs;
use std::path::Path;

use rstest::{fixture, rstest};
use stepdown::{
    ConceptDictionary, ExecutionPlan, ParseConfig, ParsedSpec, ResolvedValue, ScenarioFilter,
    ScenarioInit, SpecParser, SpecialResolver, StepArg, TagFilter, arg_position_map, filter_specs,
};
use tempfile::TempDir;

const CONCEPTS: &str = "\
# log in as <user> with <password>
* open the login page
* enter <user> and <password>

# sign in as admin
* log in as \"admin\" with \"secret\"
";

const SPEC: &str = "\
# Accounts
tags: accounts

|user|password|
|ann|pw1|
|bo|pw2|

## Regular users log in
tags: smoke
* log in as <user> with <password>
* see the dashboard

## Administrators
tags: admin, slow
* sign in as admin
* upload <file:banner.txt>

## Bulk import
* import users
|name|role|
|<user>|member|
";

fn write(dir: &Path, name: &str, content: &str) {
    if let Err(err) = fs::write(dir.join(name), content) {
        panic!("write {name}: {err}");
    }
}

#[fixture]
fn workspace() -> TempDir {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("create temp dir: {err}"),
    };
    write(dir.path(), "banner.txt", "WELCOME");
    write(dir.path(), "users.csv", "user,password\ncy,pw3\n");
    dir
}

fn parse(dir: &TempDir, spec: &str) -> ParsedSpec {
    let resolver = SpecialResolver::with_data_dir(dir.path());
    let mut builder = ConceptDictionary::builder(&resolver);
    let concepts = builder.add_file(CONCEPTS, "login.cpt");
    assert!(concepts.is_ok(), "{:?}", concepts.errors);
    let build = builder.build();
    assert!(build.errors.is_empty(), "{:?}", build.errors);
    SpecParser::new(&build.dictionary, &resolver).parse(spec, "accounts.spec")
}

#[rstest]
fn concepts_and_resources_resolve_per_row(workspace: TempDir) {
    let parsed = parse(&workspace, SPEC);
    assert!(parsed.result.is_ok(), "{:?}", parsed.result.errors);
    let spec = &parsed.specification;

    let upload = spec.scenarios.get(1).and_then(|s| s.steps.get(1));
    assert_eq!(
        upload.and_then(|s| s.args.first()),
        Some(&StepArg::SpecialString {
            name: "file:banner.txt".into(),
            value: "WELCOME".into(),
        })
    );

    let plan = ExecutionPlan::new(spec, ScenarioInit::Eager);
    let names: Vec<_> = plan
        .instances()
        .map(|i| (i.scenario.heading.text.as_str(), i.spec_row))
        .collect();
    assert_eq!(names, vec![
        ("Regular users log in", Some(0)),
        ("Bulk import", Some(0)),
        ("Administrators", None),
        ("Regular users log in", Some(1)),
        ("Bulk import", Some(1)),
    ]);

    let Some(second) = plan.instances().nth(3) else {
        panic!("expected a fourth instance");
    };
    let resolved = match second.resolve_steps() {
        Ok(resolved) => resolved,
        Err(err) => panic!("resolve: {err}"),
    };
    let login = resolved
        .steps
        .first()
        .and_then(|step| step.nested.get(1))
        .map(stepdown::ResolvedStep::text);
    assert_eq!(login.as_deref(), Some("enter bo and pw2"));
}

#[rstest]
fn inline_tables_pick_up_the_row(workspace: TempDir) {
    let parsed = parse(&workspace, SPEC);
    let plan = ExecutionPlan::new(&parsed.specification, ScenarioInit::Lazy);
    let tables: Vec<_> = plan
        .instances()
        .filter(|i| i.scenario.heading.text == "Bulk import")
        .filter_map(|i| i.resolve_steps().ok())
        .filter_map(|r| r.steps.first().and_then(|s| s.params.first()).cloned())
        .map(|p| p.value)
        .collect();
    let rows: Vec<_> = tables
        .iter()
        .map(|value| match value {
            ResolvedValue::Table(table) => table.rows.clone(),
            ResolvedValue::Text(text) => panic!("expected a table, got {text}"),
        })
        .collect();
    assert_eq!(rows, vec![
        vec![vec!["ann".to_owned(), "member".to_owned()]],
        vec![vec!["bo".to_owned(), "member".to_owned()]],
    ]);
}

#[rstest]
fn external_data_table_loads_from_the_data_dir(workspace: TempDir) {
    let spec = "# Imported\ntable: users.csv\n## Login\n* log in as <user> with <password>\n";
    let parsed = parse(&workspace, spec);
    assert!(parsed.result.is_ok(), "{:?}", parsed.result.errors);
    assert_eq!(
        parsed.specification.data_table.column_values("user"),
        Some(vec!["cy"])
    );
}

#[rstest]
#[case("smoke", vec!["Regular users log in"])]
#[case("accounts & !slow", vec!["Regular users log in", "Bulk import"])]
#[case("ADMIN, smoke", vec!["Regular users log in", "Administrators"])]
fn tag_expressions_select_scenarios(
    workspace: TempDir,
    #[case] expression: &str,
    #[case] expected: Vec<&str>,
) {
    let parsed = parse(&workspace, SPEC);
    let filter = match TagFilter::parse(expression, false) {
        Ok(filter) => filter,
        Err(err) => panic!("parse {expression}: {err}"),
    };
    let kept = filter_specs(vec![parsed.specification], &[ScenarioFilter::Tags(filter)]);
    let names: Vec<_> = kept
        .iter()
        .flat_map(|spec| &spec.scenarios)
        .map(|s| s.heading.text.as_str())
        .collect();
    assert_eq!(names, expected);
}

#[rstest]
fn missing_resource_is_a_parse_error(workspace: TempDir) {
    let parsed = parse(&workspace, "# Spec\n## S\n* upload <file:absent.txt>\n");
    let Some(error) = parsed.result.errors.first() else {
        panic!("expected an error");
    };
    assert_eq!(error.line, 3);
    assert!(error.message.contains("absent.txt"), "{error}");
}

#[test]
fn step_values_drive_argument_reordering() {
    let resolver = SpecialResolver::default();
    let dictionary = ConceptDictionary::default();
    let parser = SpecParser::new(&dictionary, &resolver);
    let before = parser.parse(
        "# Spec\n|a|b|\n|1|2|\n## S\n* move <a> to <b>\n",
        "before.spec",
    );
    let after = parser.parse(
        "# Spec\n|a|b|\n|1|2|\n## S\n* to <b> move <a>\n",
        "after.spec",
    );
    let value = |parsed: &ParsedSpec| {
        parsed
            .specification
            .steps()
            .next()
            .map(stepdown::Step::step_value)
            .unwrap_or_default()
    };
    let old = value(&before);
    let new = value(&after);
    assert_eq!(old.parameterized, "move <a> to <b>");
    assert_eq!(arg_position_map(&old, &new), vec![Some(1), Some(0)]);
}

#[test]
fn config_builds_a_resolver_for_its_data_dir() {
    let config = ParseConfig::default().with_data_dir("fixtures");
    assert_eq!(config.data_dir, Path::new("fixtures"));
    assert!(format!("{:?}", config.resolver()).contains("SpecialResolver"));
}
