//! The assembled specification tree.
//!
//! A [`Specification`] exclusively owns its scenarios, steps and tables. The
//! `items` lists record the original interleaving of headings, comments,
//! tags, tables and steps as indices into the owning collections.

mod step;

pub use step::{ConceptInvocation, Step};

use crate::datatable::Table;

/// A spec or scenario heading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Heading {
    /// Heading text without markers.
    pub text: String,
    /// 1-based line number.
    pub line: usize,
}

/// A free-text line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The line with trailing whitespace removed.
    pub text: String,
    /// 1-based line number.
    pub line: usize,
}

/// A tag declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tags {
    /// Tag names, trimmed, without empties.
    pub values: Vec<String>,
    /// Line of the first tag line.
    pub line: usize,
}

/// First and last line covered by a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineSpan {
    /// Heading line.
    pub start: usize,
    /// Last line belonging to the scenario.
    pub end: usize,
}

impl LineSpan {
    /// Whether `line` falls inside the span.
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

/// Entries of a specification in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecItem {
    /// The spec heading.
    Heading,
    /// `comments[n]`.
    Comment(usize),
    /// The spec tags.
    Tags,
    /// The spec data table.
    DataTable,
    /// `contexts[n]`.
    Context(usize),
    /// `scenarios[n]`.
    Scenario(usize),
    /// The teardown marker line.
    TearDown,
    /// `teardown[n]`.
    TearDownStep(usize),
}

/// Entries of a scenario in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioItem {
    /// `comments[n]`.
    Comment(usize),
    /// The scenario tags.
    Tags,
    /// The scenario data table.
    DataTable,
    /// `steps[n]`.
    Step(usize),
}

/// One scenario of a specification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scenario {
    /// Scenario heading.
    pub heading: Heading,
    /// Scenario tags.
    pub tags: Option<Tags>,
    /// Steps in order.
    pub steps: Vec<Step>,
    /// Per-scenario data table; uninitialised when absent.
    pub data_table: Table,
    /// Comments inside the scenario.
    pub comments: Vec<Comment>,
    /// Source order of the scenario's entries.
    pub items: Vec<ScenarioItem>,
    /// Lines covered by the scenario.
    pub span: LineSpan,
}

impl Scenario {
    /// Tag names declared on the scenario.
    #[must_use]
    pub fn tag_values(&self) -> &[String] {
        self.tags.as_ref().map_or(&[], |t| t.values.as_slice())
    }
}

/// A parsed specification file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Specification {
    /// Label the caller supplied for the text.
    pub origin: String,
    /// The spec heading, absent only in failed parses.
    pub heading: Option<Heading>,
    /// Steps before the first scenario, run before every scenario.
    pub contexts: Vec<Step>,
    /// Scenarios in order.
    pub scenarios: Vec<Scenario>,
    /// Spec data table; uninitialised when absent.
    pub data_table: Table,
    /// Spec tags.
    pub tags: Option<Tags>,
    /// Comments outside scenarios.
    pub comments: Vec<Comment>,
    /// Steps after the teardown marker, run after every scenario.
    pub teardown: Vec<Step>,
    /// Source order of the spec's entries.
    pub items: Vec<SpecItem>,
}

impl Specification {
    /// Heading text, or an empty string.
    #[must_use]
    pub fn heading_text(&self) -> &str {
        self.heading.as_ref().map_or("", |h| h.text.as_str())
    }

    /// Tag names declared on the spec.
    #[must_use]
    pub fn tag_values(&self) -> &[String] {
        self.tags.as_ref().map_or(&[], |t| t.values.as_slice())
    }

    /// Spec tags followed by the tags of `scenario`.
    #[must_use]
    pub fn scenario_tags<'a>(&'a self, scenario: &'a Scenario) -> Vec<&'a str> {
        self.tag_values()
            .iter()
            .chain(scenario.tag_values())
            .map(String::as_str)
            .collect()
    }

    /// Every step of the spec: contexts, scenario steps, then teardown.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.contexts
            .iter()
            .chain(self.scenarios.iter().flat_map(|s| s.steps.iter()))
            .chain(self.teardown.iter())
    }

    /// Keep the scenarios for which `keep` returns true, renumbering the
    /// item list so the remaining interleaving is unchanged.
    pub fn retain_scenarios<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Self, &Scenario) -> bool,
    {
        let decisions: Vec<bool> = self.scenarios.iter().map(|s| keep(self, s)).collect();
        let mut renumbered = Vec::with_capacity(decisions.len());
        let mut next = 0;
        for kept in &decisions {
            renumbered.push(kept.then_some(next));
            if *kept {
                next += 1;
            }
        }
        let mut flags = decisions.into_iter();
        self.scenarios.retain(|_| flags.next().unwrap_or(false));
        self.items.retain_mut(|item| match item {
            SpecItem::Scenario(index) => renumbered
                .get(*index)
                .copied()
                .flatten()
                .map(|position| *index = position)
                .is_some(),
            _ => true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(name: &str, line: usize) -> Scenario {
        Scenario {
            heading: Heading {
                text: name.into(),
                line,
            },
            ..Scenario::default()
        }
    }

    #[test]
    fn retain_scenarios_renumbers_items() {
        let mut spec = Specification {
            scenarios: vec![scenario("a", 2), scenario("b", 5), scenario("c", 8)],
            items: vec![
                SpecItem::Heading,
                SpecItem::Scenario(0),
                SpecItem::Comment(0),
                SpecItem::Scenario(1),
                SpecItem::Scenario(2),
            ],
            ..Specification::default()
        };
        spec.retain_scenarios(|_, s| s.heading.text != "b");
        assert_eq!(spec.scenarios.len(), 2);
        assert_eq!(spec.items, vec![
            SpecItem::Heading,
            SpecItem::Scenario(0),
            SpecItem::Comment(0),
            SpecItem::Scenario(1),
        ]);
    }

    #[test]
    fn span_contains_both_ends() {
        let span = LineSpan { start: 3, end: 6 };
        assert!(span.contains(3) && span.contains(6));
        assert!(!span.contains(7));
    }
}
