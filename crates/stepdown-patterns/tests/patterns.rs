//! Behavioural tests for the public step-text API.

use rstest::rstest;
use stepdown_patterns::{
    StepParam, StepTextError, StepValue, arg_position_map, extract_step_value, process_step_text,
};

fn processed(text: &str) -> stepdown_patterns::ProcessedStep {
    match process_step_text(text) {
        Ok(step) => step,
        Err(err) => panic!("{text:?} should process: {err}"),
    }
}

#[rstest]
#[case("open the login page")]
#[case("a step with trailing punctuation!")]
#[case("numbers 1 2 3 and symbols #@%")]
fn text_without_parameters_is_unchanged(#[case] text: &str) {
    let step = processed(text);
    assert_eq!(step.canonical, text);
    assert!(step.params.is_empty());
}

#[test]
fn escaped_braces_produce_literal_text() {
    let step = processed("step with \\{braces\\}");
    assert_eq!(step.canonical, "step with {braces}");
    assert!(step.params.is_empty());
}

#[rstest]
#[case("broken {", StepTextError::ReservedCharacter { character: '{', position: 7 })]
#[case("say \"hi", StepTextError::UnterminatedString { start: 4 })]
#[case("use <name", StepTextError::UnterminatedParameter { start: 4 })]
fn rejects_malformed_text(#[case] text: &str, #[case] expected: StepTextError) {
    assert_eq!(process_step_text(text), Err(expected));
}

#[test]
fn escaped_quote_inside_static_parameter() {
    let step = processed("say \"she said \\\"hi\\\"\"");
    assert_eq!(step.canonical, "say {}");
    assert_eq!(step.params, vec![StepParam::Static("she said \"hi\"".into())]);
}

#[test]
fn special_parameter_splits_on_first_colon_and_trims() {
    let step = processed("read < file : C:/data/in.txt >");
    assert_eq!(
        step.params,
        vec![StepParam::Special {
            kind: "file".into(),
            value: "C:/data/in.txt".into(),
        }]
    );
}

#[test]
fn reworded_step_maps_arguments_by_name() {
    let old = match extract_step_value("transfer <amount> from <src> to <dst>", false) {
        Ok(value) => value,
        Err(err) => panic!("old step should extract: {err}"),
    };
    let new = StepValue::new(
        "move {} to {} from {}",
        vec!["amount".into(), "dst".into(), "src".into()],
    );
    assert_eq!(arg_position_map(&old, &new), vec![Some(0), Some(2), Some(1)]);
}
