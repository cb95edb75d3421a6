//! Unit tests for concept registration and resolution.

use super::*;
use crate::step_args::StepArg;
use rstest::{fixture, rstest};

const OUTER: &str = "# login as <user>\n* open the app\n* sign in with <user> and \"secret\"\n";
const INNER: &str = "# sign in with <name> and <password>\n* type <name>\n* type <password>\n";

#[fixture]
fn resolver() -> SpecialResolver {
    SpecialResolver::default()
}

fn build(resolver: &SpecialResolver, files: &[(&str, &str)]) -> ConceptBuild {
    let mut builder = ConceptDictionary::builder(resolver);
    for (origin, text) in files {
        let result = builder.add_file(text, origin);
        assert!(result.is_ok(), "{origin} should parse: {:?}", result.errors);
    }
    builder.build()
}

fn messages(result: &ParseResult) -> Vec<&str> {
    result.errors.iter().map(|e| e.message.as_str()).collect()
}

#[rstest]
fn registration_order_does_not_change_resolution(resolver: SpecialResolver) {
    let forward = build(&resolver, &[("a.cpt", OUTER), ("b.cpt", INNER)]);
    let backward = build(&resolver, &[("b.cpt", INNER), ("a.cpt", OUTER)]);
    assert!(forward.errors.is_empty() && backward.errors.is_empty());
    let key = "login as {}";
    let forward_steps = forward.dictionary.get(key).map(|c| c.step().nested_steps().to_vec());
    let backward_steps = backward.dictionary.get(key).map(|c| c.step().nested_steps().to_vec());
    assert!(forward_steps.is_some());
    assert_eq!(forward_steps, backward_steps);
}

#[rstest]
fn nested_invocation_binds_outer_parameters(resolver: SpecialResolver) {
    let built = build(&resolver, &[("a.cpt", OUTER), ("b.cpt", INNER)]);
    let Some(outer) = built.dictionary.get("login as {}") else {
        panic!("outer concept should be registered");
    };
    let nested = outer.step().nested_steps().get(1);
    let lookup = nested.and_then(|s| s.concept()).map(|c| &c.lookup);
    assert_eq!(
        lookup.and_then(|l| l.get("name")),
        Some(&StepArg::Dynamic("user".into()))
    );
    assert_eq!(
        lookup.and_then(|l| l.get("password")),
        Some(&StepArg::Static("secret".into()))
    );
    assert_eq!(nested.map(|s| s.nested_steps().len()), Some(2));
}

#[rstest]
#[case("# greet \"Sam\"\n* say hi\n")]
#[case("# greet \"Sam\"\n* say hi\n* wave\n* leave\n")]
#[case("# read <file:x.txt>\n* noop\n")]
fn rejects_non_dynamic_heading_parameters(resolver: SpecialResolver, #[case] text: &str) {
    let mut builder = ConceptDictionary::builder(&resolver);
    let result = builder.add_file(text, "c.cpt");
    assert!(!result.is_ok());
    assert!(builder.build().dictionary.is_empty());
}

#[rstest]
fn duplicate_concepts_are_reported_at_both_declarations(resolver: SpecialResolver) {
    let mut builder = ConceptDictionary::builder(&resolver);
    let first = builder.add_file("# do <x>\n* a <x>\n", "one.cpt");
    assert!(first.is_ok());
    let second = builder.add_file("\n# do <y>\n* b <y>\n", "two.cpt");
    let locations: Vec<_> = second
        .errors
        .iter()
        .map(|e| (e.origin.as_str(), e.line))
        .collect();
    assert_eq!(locations, vec![("one.cpt", 1), ("two.cpt", 2)]);
    let built = builder.build();
    assert_eq!(built.dictionary.get("do {}").map(Concept::file), Some("one.cpt"));
}

#[rstest]
fn reference_cycles_are_errors_not_hangs(resolver: SpecialResolver) {
    let mut builder = ConceptDictionary::builder(&resolver);
    let text = "# ping\n* pong\n# pong\n* ping\n# outer\n* ping\n";
    assert!(builder.add_file(text, "cycle.cpt").is_ok());
    let built = builder.build();
    assert_eq!(built.errors.len(), 2);
    assert!(
        built
            .errors
            .iter()
            .all(|e| e.message.starts_with("Circular reference found in concept"))
    );
    assert!(!built.dictionary.contains("ping"));
    let outer = built.dictionary.get("outer");
    assert_eq!(
        outer.map(|c| c.step().nested_steps().iter().any(Step::is_concept)),
        Some(false)
    );
}

#[rstest]
#[case("# empty\n", "Concept should have at least one step")]
#[case("* orphan\n# c\n* x\n", "Step is not defined inside a concept heading")]
#[case("# c\n## scenario\n* x\n", "Scenario Heading is not allowed in concept file")]
#[case("# c\n|a|\n* x\n", "Table doesn't belong to any step")]
#[case("# c <a>\n* use <b>\n* fine <a>\n", "Dynamic parameter <b> could not be resolved")]
fn reports_concept_file_errors(
    resolver: SpecialResolver,
    #[case] text: &str,
    #[case] expected: &str,
) {
    let mut builder = ConceptDictionary::builder(&resolver);
    let result = builder.add_file(text, "c.cpt");
    assert_eq!(messages(&result), vec![expected]);
}

#[rstest]
fn concept_steps_accept_inline_tables(resolver: SpecialResolver) {
    let text = "# create <who>\n* insert rows\n|name|\n|<who>|\n|bob|\n";
    let built = build(&resolver, &[("c.cpt", text)]);
    let step = built
        .dictionary
        .get("create {}")
        .and_then(|c| c.step().nested_steps().first().cloned());
    assert_eq!(step.as_ref().map(|s| s.value.as_str()), Some("insert rows {}"));
    assert_eq!(step.map(|s| s.has_inline_table), Some(true));
}

#[rstest]
fn empty_heading_closes_the_open_concept(resolver: SpecialResolver) {
    let mut builder = ConceptDictionary::builder(&resolver);
    let result = builder.add_file("# a\n* x\n#\n* y\n", "c.cpt");
    assert_eq!(messages(&result), vec![
        "Concept heading should have at least one character",
        "Step is not defined inside a concept heading",
    ]);
    let built = builder.build();
    let body: Option<Vec<String>> = built
        .dictionary
        .get("a")
        .map(|c| c.step().nested_steps().iter().map(|s| s.value.clone()).collect());
    assert_eq!(body, Some(vec!["x".to_owned()]));
}

#[rstest]
fn literal_braces_do_not_stand_in_for_arguments(resolver: SpecialResolver) {
    let literal = "# use \\{\\} with <x>\n* noop\n";
    let caller = "# caller\n* use \"A\" with \"B\"\n* use \\{\\} with \"C\"\n";
    let built = build(&resolver, &[("a.cpt", literal), ("b.cpt", caller)]);
    assert!(built.errors.is_empty());
    let body = built
        .dictionary
        .get("caller")
        .map(|c| c.step().nested_steps().to_vec())
        .unwrap_or_default();
    let promoted: Vec<bool> = body.iter().map(Step::is_concept).collect();
    assert_eq!(promoted, vec![false, true]);
    assert_eq!(
        body.get(1).and_then(|s| s.concept()).and_then(|c| c.lookup.get("x")),
        Some(&StepArg::Static("C".into()))
    );
}
