//! Scenario selection.

use crate::model::{Scenario, Specification};

use super::tags::TagFilter;

/// One way of choosing scenarios.
#[derive(Debug, Clone)]
pub enum ScenarioFilter {
    /// Keep scenarios whose spec and scenario tags satisfy the expression.
    Tags(TagFilter),
    /// Keep scenarios whose heading equals one of the names.
    Names(Vec<String>),
    /// Keep scenarios whose span contains one of the lines.
    Lines(Vec<usize>),
}

impl ScenarioFilter {
    /// Whether `scenario` of `spec` passes this filter.
    #[must_use]
    pub fn keeps(&self, spec: &Specification, scenario: &Scenario) -> bool {
        match self {
            Self::Tags(filter) => filter.matches(spec.scenario_tags(scenario)),
            Self::Names(names) => names.iter().any(|name| *name == scenario.heading.text),
            Self::Lines(lines) => lines.iter().any(|line| scenario.span.contains(*line)),
        }
    }

    /// Drop the scenarios of `spec` this filter rejects.
    ///
    /// Returns `None` when no scenario survives.
    #[must_use]
    pub fn apply(&self, mut spec: Specification) -> Option<Specification> {
        spec.retain_scenarios(|spec, scenario| self.keeps(spec, scenario));
        (!spec.scenarios.is_empty()).then_some(spec)
    }
}

/// Apply every filter in turn, keeping only specs with scenarios left.
///
/// Scenario names that occur in none of `specs` are logged.
#[must_use]
pub fn filter_specs(specs: Vec<Specification>, filters: &[ScenarioFilter]) -> Vec<Specification> {
    for filter in filters {
        if let ScenarioFilter::Names(names) = filter {
            for name in names {
                let known = specs
                    .iter()
                    .flat_map(|spec| &spec.scenarios)
                    .any(|scenario| scenario.heading.text == *name);
                if !known {
                    log::warn!("scenario name \"{name}\" not found");
                }
            }
        }
    }
    specs
        .into_iter()
        .filter_map(|spec| {
            filters
                .iter()
                .try_fold(spec, |spec, filter| filter.apply(spec))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Heading, LineSpan, SpecItem, Tags};

    fn scenario(name: &str, start: usize, end: usize, tags: &[&str]) -> Scenario {
        Scenario {
            heading: Heading {
                text: name.into(),
                line: start,
            },
            tags: (!tags.is_empty()).then(|| Tags {
                values: tags.iter().map(|t| (*t).to_owned()).collect(),
                line: start + 1,
            }),
            span: LineSpan { start, end },
            ..Scenario::default()
        }
    }

    fn spec(tags: &[&str]) -> Specification {
        Specification {
            heading: Some(Heading {
                text: "Spec".into(),
                line: 1,
            }),
            tags: Some(Tags {
                values: tags.iter().map(|t| (*t).to_owned()).collect(),
                line: 2,
            }),
            scenarios: vec![
                scenario("Login", 3, 6, &["smoke"]),
                scenario("Logout", 7, 9, &[]),
                scenario("Reset", 10, 14, &["slow"]),
            ],
            items: vec![
                SpecItem::Heading,
                SpecItem::Tags,
                SpecItem::Scenario(0),
                SpecItem::Scenario(1),
                SpecItem::Scenario(2),
            ],
            ..Specification::default()
        }
    }

    fn headings(spec: &Specification) -> Vec<&str> {
        spec.scenarios
            .iter()
            .map(|s| s.heading.text.as_str())
            .collect()
    }

    #[test]
    fn tag_filter_sees_spec_tags() {
        let filter = match TagFilter::parse("api & !slow", false) {
            Ok(filter) => filter,
            Err(err) => panic!("parse tag expression: {err}"),
        };
        let kept = ScenarioFilter::Tags(filter).apply(spec(&["api"]));
        assert_eq!(kept.as_ref().map(headings), Some(vec!["Login", "Logout"]));
    }

    #[test]
    fn specs_without_matches_are_dropped() {
        let filter = ScenarioFilter::Tags(TagFilter::new("missing", false));
        assert!(filter_specs(vec![spec(&[])], &[filter]).is_empty());
    }

    #[test]
    fn line_filter_uses_scenario_spans() {
        let kept = ScenarioFilter::Lines(vec![8, 14]).apply(spec(&[]));
        let Some(kept) = kept else {
            panic!("expected scenarios to survive");
        };
        assert_eq!(headings(&kept), vec!["Logout", "Reset"]);
        assert_eq!(kept.items.last(), Some(&SpecItem::Scenario(1)));
    }

    #[test]
    fn filters_compose() {
        let filters = [
            ScenarioFilter::Names(vec!["Login".into(), "Reset".into(), "Unknown".into()]),
            ScenarioFilter::Tags(TagFilter::new("smoke", false)),
        ];
        let kept = filter_specs(vec![spec(&[])], &filters);
        assert_eq!(kept.iter().map(headings).collect::<Vec<_>>(), vec![vec!["Login"]]);
    }
}
