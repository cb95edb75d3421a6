//! Post-assembly passes: concept promotion and whole-spec validation.

use crate::concept::ConceptDictionary;
use crate::model::{Specification, Step};
use crate::result::ParseResult;

fn promote_all(steps: &mut Vec<Step>, dictionary: &ConceptDictionary, result: &mut ParseResult) {
    let provisional = std::mem::take(steps);
    for step in provisional {
        let fallback = step.clone();
        match dictionary.promote(step) {
            Ok(promoted) => steps.push(promoted),
            Err(err) => {
                result.error(fallback.line, &fallback.line_text, err.to_string());
                steps.push(fallback);
            }
        }
    }
}

/// Replace every step naming a concept with its promoted form.
pub(super) fn promote_concepts(
    spec: &mut Specification,
    dictionary: &ConceptDictionary,
    result: &mut ParseResult,
) {
    if dictionary.is_empty() {
        return;
    }
    promote_all(&mut spec.contexts, dictionary, result);
    for scenario in &mut spec.scenarios {
        promote_all(&mut scenario.steps, dictionary, result);
    }
    promote_all(&mut spec.teardown, dictionary, result);
}

/// Whole-file checks run after every token was handled.
pub(super) fn validate(spec: &Specification, result: &mut ParseResult) {
    if spec.items.is_empty() {
        result.error(0, "", "Spec does not have any elements");
        return;
    }
    if spec.heading.is_none() {
        result.error(0, "", "Spec heading not found");
    }
    let empty_tables = std::iter::once(&spec.data_table)
        .chain(spec.scenarios.iter().map(|s| &s.data_table))
        .filter(|table| table.is_initialized() && table.row_count() == 0);
    for table in empty_tables {
        result.error(table.line(), "", "Data table should have at least 1 data row");
    }
    if spec.heading.is_some() && spec.scenarios.is_empty() {
        result.warn(
            spec.heading.as_ref().map_or(0, |h| h.line),
            "Spec does not have any scenarios",
        );
    }
    for scenario in spec.scenarios.iter().filter(|s| s.steps.is_empty()) {
        result.warn(
            scenario.heading.line,
            format!("Scenario '{}' should have at least one step", scenario.heading.text),
        );
    }
}
