//! Ordered token handlers building the specification tree.

use crate::datatable::Table;
use crate::lexer::{Scope, ScopeFlag, Token, TokenKind};
use crate::lookup::ArgLookup;
use crate::model::{
    Comment, Heading, LineSpan, Scenario, ScenarioItem, SpecItem, Specification, Step, Tags,
};
use crate::resolver::SpecialResolver;
use crate::result::ParseResult;

use super::steps::{build_row, build_step};

type Matcher<'r> = fn(&Assembler<'r>, &Token) -> bool;
type Handler<'r> = fn(&mut Assembler<'r>, &Token);

const MULTIPLE_TABLES: &str = "Multiple data table present, ignoring table";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableTarget {
    None,
    Inline,
    ScenarioData,
    SpecData,
}

pub(super) struct Assembler<'r> {
    resolver: &'r SpecialResolver,
    spec: Specification,
    result: ParseResult,
    scope: Scope,
    table_target: TableTarget,
}

impl<'r> Assembler<'r> {
    /// First matching entry handles the token.
    const HANDLERS: [(Matcher<'r>, Handler<'r>); 11] = [
        (Self::is_spec_heading, Self::spec_heading),
        (Self::is_scenario_heading, Self::scenario_heading),
        (Self::is_scenario_step, Self::scenario_step),
        (Self::is_context_step, Self::context_step),
        (Self::is_teardown_step, Self::teardown_step),
        (Self::is_teardown, Self::teardown),
        (Self::is_table_header, Self::table_header),
        (Self::is_table_row, Self::table_row),
        (Self::is_tag, Self::tags),
        (Self::is_data_table_ref, Self::data_table_ref),
        (Self::is_comment, Self::comment),
    ];

    pub(super) fn new(resolver: &'r SpecialResolver, origin: &str) -> Self {
        Self {
            resolver,
            spec: Specification {
                origin: origin.to_owned(),
                ..Specification::default()
            },
            result: ParseResult::new(origin),
            scope: Scope::default(),
            table_target: TableTarget::None,
        }
    }

    pub(super) fn dispatch(&mut self, token: &Token) {
        let handler = Self::HANDLERS
            .iter()
            .find(|(matches, _)| matches(self, token))
            .map(|(_, handle)| *handle);
        if let Some(handle) = handler {
            handle(self, token);
        }
        if self.in_scenario() {
            if let Some(scenario) = self.spec.scenarios.last_mut() {
                scenario.span.end = token.line;
            }
        }
    }

    pub(super) fn finish(self) -> (Specification, ParseResult) {
        (self.spec, self.result)
    }

    fn in_scenario(&self) -> bool {
        self.scope.has(ScopeFlag::Scenario) && !self.scope.has(ScopeFlag::TearDown)
    }

    fn is_step_token(token: &Token) -> bool {
        matches!(token.kind, TokenKind::Step | TokenKind::Context)
    }

    fn error(&mut self, token: &Token, message: impl Into<String>) {
        self.result.error(token.line, &token.line_text, message);
    }

    /// Names a step at the current position may reference.
    fn visible_names(&self) -> ArgLookup {
        let mut lookup = ArgLookup::from_table_headers(&self.spec.data_table);
        if self.in_scenario() {
            if let Some(scenario) = self.spec.scenarios.last() {
                lookup.add_headers(&scenario.data_table);
            }
        }
        lookup
    }

    fn build_step(&mut self, token: &Token) -> Option<Step> {
        let visible = self.visible_names();
        build_step(token, Some(&visible), self.resolver, &mut self.result)
    }

    // Matchers

    fn is_spec_heading(&self, token: &Token) -> bool {
        token.kind == TokenKind::SpecHeading
    }

    fn is_scenario_heading(&self, token: &Token) -> bool {
        token.kind == TokenKind::ScenarioHeading
    }

    fn is_scenario_step(&self, token: &Token) -> bool {
        Self::is_step_token(token) && self.in_scenario()
    }

    fn is_context_step(&self, token: &Token) -> bool {
        Self::is_step_token(token)
            && self.scope.has(ScopeFlag::Spec)
            && !self.scope.has_any(&[ScopeFlag::Scenario, ScopeFlag::TearDown])
    }

    fn is_teardown_step(&self, token: &Token) -> bool {
        Self::is_step_token(token) && self.scope.has(ScopeFlag::TearDown)
    }

    fn is_teardown(&self, token: &Token) -> bool {
        token.kind == TokenKind::TearDown
    }

    fn is_table_header(&self, token: &Token) -> bool {
        token.kind == TokenKind::TableHeader
    }

    fn is_table_row(&self, token: &Token) -> bool {
        token.kind == TokenKind::TableRow && self.scope.has(ScopeFlag::Table)
    }

    fn is_tag(&self, token: &Token) -> bool {
        token.kind == TokenKind::Tag
    }

    fn is_data_table_ref(&self, token: &Token) -> bool {
        token.kind == TokenKind::DataTableRef
    }

    fn is_comment(&self, token: &Token) -> bool {
        matches!(token.kind, TokenKind::Comment | TokenKind::TableRow)
    }

    // Handlers

    fn spec_heading(&mut self, token: &Token) {
        if token.value.is_empty() {
            self.error(token, "Spec heading should have at least one character");
            return;
        }
        if self.spec.heading.is_some() {
            self.error(token, "Multiple spec headings found in same file");
            return;
        }
        self.spec.heading = Some(Heading {
            text: token.value.clone(),
            line: token.line,
        });
        self.spec.items.push(SpecItem::Heading);
        self.scope.reset_to(ScopeFlag::Spec);
    }

    fn scenario_heading(&mut self, token: &Token) {
        if self.spec.heading.is_none() {
            self.error(token, "Scenario should be defined after the spec heading");
            return;
        }
        if token.value.is_empty() {
            self.error(token, "Scenario heading should have at least one character");
            return;
        }
        let duplicate = self
            .spec
            .scenarios
            .iter()
            .any(|s| s.heading.text.to_lowercase() == token.value.to_lowercase());
        if duplicate {
            let message = format!(
                "Duplicate scenario definition '{}' found in the same specification",
                token.value
            );
            self.error(token, message);
            return;
        }
        self.spec.scenarios.push(Scenario {
            heading: Heading {
                text: token.value.clone(),
                line: token.line,
            },
            span: LineSpan {
                start: token.line,
                end: token.line,
            },
            ..Scenario::default()
        });
        self.spec
            .items
            .push(SpecItem::Scenario(self.spec.scenarios.len() - 1));
        self.scope
            .retain_then_add(&[ScopeFlag::Spec], ScopeFlag::Scenario);
        self.table_target = TableTarget::None;
    }

    fn scenario_step(&mut self, token: &Token) {
        let step = self.build_step(token);
        self.scope
            .retain_then_add(&[ScopeFlag::Spec, ScopeFlag::Scenario], ScopeFlag::Step);
        let (Some(step), Some(scenario)) = (step, self.spec.scenarios.last_mut()) else {
            return;
        };
        scenario.steps.push(step);
        scenario
            .items
            .push(ScenarioItem::Step(scenario.steps.len() - 1));
    }

    fn context_step(&mut self, token: &Token) {
        let step = self.build_step(token);
        self.scope
            .retain_then_add(&[ScopeFlag::Spec], ScopeFlag::Context);
        if let Some(step) = step {
            self.spec.contexts.push(step);
            self.spec
                .items
                .push(SpecItem::Context(self.spec.contexts.len() - 1));
        }
    }

    fn teardown_step(&mut self, token: &Token) {
        let step = self.build_step(token);
        self.scope
            .retain_then_add(&[ScopeFlag::Spec, ScopeFlag::TearDown], ScopeFlag::Step);
        if let Some(step) = step {
            self.spec.teardown.push(step);
            self.spec
                .items
                .push(SpecItem::TearDownStep(self.spec.teardown.len() - 1));
        }
    }

    fn teardown(&mut self, _token: &Token) {
        self.spec.items.push(SpecItem::TearDown);
        self.scope
            .retain_then_add(&[ScopeFlag::Spec], ScopeFlag::TearDown);
        self.table_target = TableTarget::None;
    }

    fn comment(&mut self, token: &Token) {
        let comment = Comment {
            text: token.line_text.trim_end().to_owned(),
            line: token.line,
        };
        if self.in_scenario() {
            if let Some(scenario) = self.spec.scenarios.last_mut() {
                scenario.comments.push(comment);
                scenario
                    .items
                    .push(ScenarioItem::Comment(scenario.comments.len() - 1));
            }
        } else {
            self.spec.comments.push(comment);
            self.spec
                .items
                .push(SpecItem::Comment(self.spec.comments.len() - 1));
        }
        self.scope.retain_then_add(
            &[ScopeFlag::Spec, ScopeFlag::Scenario, ScopeFlag::TearDown],
            ScopeFlag::Comment,
        );
        self.table_target = TableTarget::None;
    }

    fn last_step_mut(&mut self) -> Option<&mut Step> {
        if self.scope.has(ScopeFlag::TearDown) {
            self.spec.teardown.last_mut()
        } else if self.scope.has(ScopeFlag::Scenario) {
            self.spec
                .scenarios
                .last_mut()
                .and_then(|s| s.steps.last_mut())
        } else {
            self.spec.contexts.last_mut()
        }
    }

    fn table_header(&mut self, token: &Token) {
        let table = match Table::with_headers(token.args.clone(), token.line) {
            Ok(table) => table,
            Err(err) => {
                self.error(token, err.to_string());
                return;
            }
        };
        self.table_target = if self.scope.has_any(&[ScopeFlag::Step, ScopeFlag::Context]) {
            self.last_step_mut().map_or(TableTarget::None, |step| {
                step.attach_inline_table(table);
                TableTarget::Inline
            })
        } else if self.scope.has(ScopeFlag::TearDown) {
            self.result
                .warn(token.line, "Table not associated with a step, ignoring table");
            TableTarget::None
        } else {
            self.attach_data_table(token, table)
        };
        self.scope.add(ScopeFlag::Table);
    }

    fn attach_data_table(&mut self, token: &Token, table: Table) -> TableTarget {
        if self.in_scenario() {
            let Some(scenario) = self.spec.scenarios.last_mut() else {
                return TableTarget::None;
            };
            if scenario.data_table.is_initialized() {
                self.result.warn(token.line, MULTIPLE_TABLES);
                return TableTarget::None;
            }
            scenario.data_table = table;
            scenario.items.push(ScenarioItem::DataTable);
            return TableTarget::ScenarioData;
        }
        if self.spec.data_table.is_initialized() {
            self.result.warn(token.line, MULTIPLE_TABLES);
            return TableTarget::None;
        }
        self.spec.data_table = table;
        self.spec.items.push(SpecItem::DataTable);
        TableTarget::SpecData
    }

    fn table_row(&mut self, token: &Token) {
        let visible = match self.table_target {
            TableTarget::None => return,
            TableTarget::Inline => self.visible_names(),
            TableTarget::ScenarioData => self
                .spec
                .scenarios
                .last()
                .map(|s| ArgLookup::from_table_headers(&s.data_table))
                .unwrap_or_default(),
            TableTarget::SpecData => ArgLookup::from_table_headers(&self.spec.data_table),
        };
        let Some(cells) = build_row(token, &visible, self.resolver, &mut self.result) else {
            return;
        };
        let table = match self.table_target {
            TableTarget::Inline => self.last_step_mut().and_then(Step::inline_table_mut),
            TableTarget::ScenarioData => self
                .spec
                .scenarios
                .last_mut()
                .map(|s| &mut s.data_table),
            TableTarget::SpecData => Some(&mut self.spec.data_table),
            TableTarget::None => None,
        };
        if let Some(table) = table {
            table.add_row(cells);
        }
    }

    fn tags(&mut self, token: &Token) {
        let tags = Tags {
            values: token.args.clone(),
            line: token.line,
        };
        if self.in_scenario() {
            let Some(scenario) = self.spec.scenarios.last_mut() else {
                return;
            };
            if scenario.tags.is_some() {
                self.error(token, "Tags can be defined only once per scenario");
                return;
            }
            scenario.tags = Some(tags);
            scenario.items.push(ScenarioItem::Tags);
        } else {
            if self.spec.tags.is_some() {
                self.error(token, "Tags can be defined only once per specification");
                return;
            }
            self.spec.tags = Some(tags);
            self.spec.items.push(SpecItem::Tags);
        }
        self.scope
            .retain(&[ScopeFlag::Spec, ScopeFlag::Scenario, ScopeFlag::TearDown]);
        self.table_target = TableTarget::None;
    }

    fn data_table_ref(&mut self, token: &Token) {
        if token.value.is_empty() {
            self.error(token, "Table location not specified");
            return;
        }
        match self.resolver.load_table(&token.value) {
            Ok(table) => {
                self.attach_data_table(token, table);
            }
            Err(err) => self.error(token, err.to_string()),
        }
        self.scope
            .retain(&[ScopeFlag::Spec, ScopeFlag::Scenario, ScopeFlag::TearDown]);
        self.table_target = TableTarget::None;
    }
}
