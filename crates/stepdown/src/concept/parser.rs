//! Concept-file parsing.
//!
//! Concept files share the tokenizer with specifications but follow their own
//! state machine: each `#` heading opens a concept whose signature may only
//! use dynamic parameters, and the `*` lines beneath it form the body.

use stepdown_patterns::{StepParam, process_step_text};

use crate::datatable::Table;
use crate::lexer::{LexMode, Scope, ScopeFlag, Token, TokenKind, tokenize};
use crate::lookup::ArgLookup;
use crate::model::Step;
use crate::parser::steps::{build_row, build_step};
use crate::resolver::SpecialResolver;
use crate::result::ParseResult;
use crate::step_args::StepArg;

use super::Concept;

struct Pending {
    heading: Step,
    params: Vec<String>,
    visible: ArgLookup,
    steps: Vec<Step>,
}

struct ConceptParser<'r> {
    resolver: &'r SpecialResolver,
    origin: String,
    scope: Scope,
    current: Option<Pending>,
    concepts: Vec<Concept>,
    result: ParseResult,
}

/// Parse concept-file text into unresolved concept definitions.
pub(crate) fn parse_concepts(
    text: &str,
    origin: &str,
    resolver: &SpecialResolver,
) -> (Vec<Concept>, ParseResult) {
    let tokens = tokenize(text, origin, LexMode::Concept);
    let mut parser = ConceptParser {
        resolver,
        origin: origin.to_owned(),
        scope: Scope::default(),
        current: None,
        concepts: Vec::new(),
        result: tokens.result,
    };
    for token in &tokens.tokens {
        parser.token(token);
    }
    parser.finish_current();
    (parser.concepts, parser.result)
}

impl ConceptParser<'_> {
    fn token(&mut self, token: &Token) {
        match token.kind {
            TokenKind::SpecHeading => self.heading(token),
            TokenKind::Step | TokenKind::Context => self.step(token),
            TokenKind::TableHeader => self.table_header(token),
            TokenKind::TableRow if self.scope.has(ScopeFlag::Table) => self.table_row(token),
            TokenKind::ScenarioHeading => {
                self.result.error(
                    token.line,
                    &token.line_text,
                    "Scenario Heading is not allowed in concept file",
                );
            }
            _ => self.scope.retain(&[ScopeFlag::Concept]),
        }
    }

    fn heading(&mut self, token: &Token) {
        self.finish_current();
        self.scope.reset_to(ScopeFlag::Concept);
        if token.value.is_empty() {
            return;
        }
        let processed = match process_step_text(&token.value) {
            Ok(processed) => processed,
            Err(err) => {
                self.result.error(token.line, &token.line_text, err.to_string());
                return;
            }
        };
        let mut params = Vec::with_capacity(processed.params.len());
        for param in processed.params {
            let StepParam::Dynamic(name) = param else {
                self.result.error(
                    token.line,
                    &token.line_text,
                    "Concept heading can have only Dynamic Parameters",
                );
                return;
            };
            params.push(name);
        }
        let mut visible = ArgLookup::new();
        for name in &params {
            visible.add_name(name.as_str());
        }
        let args = params.iter().cloned().map(StepArg::Dynamic).collect();
        let heading = Step::new(processed.canonical, token.line_text.as_str(), token.line, args);
        self.current = Some(Pending {
            heading,
            params,
            visible,
            steps: Vec::new(),
        });
    }

    fn step(&mut self, token: &Token) {
        let Some(current) = self.current.as_mut() else {
            self.result.error(
                token.line,
                &token.line_text,
                "Step is not defined inside a concept heading",
            );
            return;
        };
        self.scope.retain_then_add(&[ScopeFlag::Concept], ScopeFlag::Step);
        if let Some(step) = build_step(token, Some(&current.visible), self.resolver, &mut self.result)
        {
            current.steps.push(step);
        }
    }

    fn table_header(&mut self, token: &Token) {
        let step = self
            .current
            .as_mut()
            .filter(|_| self.scope.has(ScopeFlag::Step))
            .and_then(|current| current.steps.last_mut());
        let Some(step) = step else {
            self.result
                .error(token.line, &token.line_text, "Table doesn't belong to any step");
            return;
        };
        match Table::with_headers(token.args.clone(), token.line) {
            Ok(table) => {
                step.attach_inline_table(table);
                self.scope.add(ScopeFlag::Table);
            }
            Err(err) => self.result.error(token.line, &token.line_text, err.to_string()),
        }
    }

    fn table_row(&mut self, token: &Token) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        let Some(cells) = build_row(token, &current.visible, self.resolver, &mut self.result)
        else {
            return;
        };
        if let Some(table) = current.steps.last_mut().and_then(Step::inline_table_mut) {
            table.add_row(cells);
        }
    }

    fn finish_current(&mut self) {
        let Some(pending) = self.current.take() else {
            return;
        };
        if pending.steps.is_empty() {
            self.result.error(
                pending.heading.line,
                &pending.heading.line_text,
                "Concept should have at least one step",
            );
            return;
        }
        let step = Step::concept_definition(
            pending.heading,
            &pending.params,
            pending.steps,
            &self.origin,
        );
        self.concepts
            .push(Concept::new(step, pending.params, self.origin.clone()));
    }
}
