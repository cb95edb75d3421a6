//! Building steps and table rows from tokens.
//!
//! Shared by the specification assembler and the concept parser. Dynamic
//! references are checked against the lookup of names visible at the token;
//! special parameters are resolved immediately.

use stepdown_patterns::{StepParam, process_step_text};

use crate::datatable::TableCell;
use crate::lexer::Token;
use crate::lookup::ArgLookup;
use crate::model::Step;
use crate::resolver::SpecialResolver;
use crate::result::ParseResult;
use crate::step_args::StepArg;

pub(crate) fn unresolved_message(name: &str) -> String {
    format!("Dynamic parameter <{name}> could not be resolved")
}

/// Build a plain step from a step token.
///
/// With `visible` set, every dynamic parameter must be declared there.
/// Content collected from a `"""` block becomes the final argument.
/// Problems are recorded in `result` and yield `None`.
pub(crate) fn build_step(
    token: &Token,
    visible: Option<&ArgLookup>,
    resolver: &SpecialResolver,
    result: &mut ParseResult,
) -> Option<Step> {
    if token.value.is_empty() {
        result.error(token.line, &token.line_text, "Step should not be blank");
        return None;
    }
    let processed = match process_step_text(&token.value) {
        Ok(processed) => processed,
        Err(err) => {
            result.error(token.line, &token.line_text, err.to_string());
            return None;
        }
    };
    let mut args = Vec::with_capacity(processed.params.len());
    for param in processed.params {
        let arg = match param {
            StepParam::Static(value) => StepArg::Static(value),
            StepParam::Dynamic(name) => {
                if visible.is_some_and(|lookup| !lookup.contains(&name)) {
                    result.error(token.line, &token.line_text, unresolved_message(&name));
                    return None;
                }
                StepArg::Dynamic(name)
            }
            StepParam::Special { kind, value } => match resolver.resolve(&kind, &value) {
                Ok(arg) => arg,
                Err(err) => {
                    result.error(token.line, &token.line_text, err.to_string());
                    return None;
                }
            },
        };
        args.push(arg);
    }
    let mut step = Step::new(
        processed.canonical,
        token.line_text.clone(),
        token.line,
        args,
    );
    if let Some(content) = token.args.first() {
        step.attach_multiline(content.as_str());
    }
    Some(step)
}

/// Convert the cells of a table-row token.
///
/// `<name>` cells become dynamic and must be declared in `visible`;
/// `<file:path>` cells are replaced by the file's contents.
pub(crate) fn build_row(
    token: &Token,
    visible: &ArgLookup,
    resolver: &SpecialResolver,
    result: &mut ParseResult,
) -> Option<Vec<TableCell>> {
    let mut cells = Vec::with_capacity(token.args.len());
    for raw in &token.args {
        let Some(inner) = raw.strip_prefix('<').and_then(|c| c.strip_suffix('>')) else {
            cells.push(TableCell::literal(raw.as_str()));
            continue;
        };
        if let Some((kind, value)) = inner.split_once(':') {
            match resolver.resolve(kind.trim(), value.trim()) {
                Ok(StepArg::SpecialString { value, .. }) => cells.push(TableCell::literal(value)),
                Ok(other) => {
                    let message = format!(
                        "Special parameter <{}> cannot be used in a table cell",
                        other.name()
                    );
                    result.error(token.line, &token.line_text, message);
                    return None;
                }
                Err(err) => {
                    result.error(token.line, &token.line_text, err.to_string());
                    return None;
                }
            }
            continue;
        }
        if !visible.contains(inner) {
            result.error(token.line, &token.line_text, unresolved_message(inner));
            return None;
        }
        cells.push(TableCell::dynamic(inner));
    }
    Some(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;
    use crate::resolver::InMemoryResources;

    fn token(value: &str, args: &[&str]) -> Token {
        Token {
            kind: TokenKind::Step,
            line: 7,
            line_text: format!("* {value}"),
            value: value.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }

    fn resolver() -> SpecialResolver {
        SpecialResolver::new(InMemoryResources::default().with("motd.txt", "welcome"))
    }

    fn visible(names: &[&str]) -> ArgLookup {
        let mut lookup = ArgLookup::new();
        for name in names {
            lookup.add_name(*name);
        }
        lookup
    }

    #[test]
    fn builds_step_with_resolved_special_param() {
        let mut result = ParseResult::new("t");
        let step = build_step(
            &token("show <file:motd.txt> to <user>", &[]),
            Some(&visible(&["user"])),
            &resolver(),
            &mut result,
        );
        assert!(result.is_ok());
        let step = step.unwrap_or_else(|| panic!("step should build"));
        assert_eq!(step.value, "show {} to {}");
        assert!(matches!(step.args.first(), Some(StepArg::SpecialString { value, .. }) if value == "welcome"));
    }

    #[test]
    fn undeclared_dynamic_parameter_fails_at_the_line() {
        let mut result = ParseResult::new("t");
        let step = build_step(
            &token("enter <pwd>", &[]),
            Some(&ArgLookup::new()),
            &resolver(),
            &mut result,
        );
        assert!(step.is_none());
        let error = result.errors.first().map(|e| (e.line, e.message.clone()));
        assert_eq!(error, Some((7, unresolved_message("pwd"))));
    }

    #[test]
    fn unchecked_steps_accept_any_reference() {
        let mut result = ParseResult::new("t");
        let step = build_step(&token("greet <name>", &[]), None, &resolver(), &mut result);
        assert!(step.is_some_and(|s| s.args == vec![StepArg::Dynamic("name".into())]));
    }

    #[test]
    fn multiline_token_content_is_the_last_argument() {
        let mut result = ParseResult::new("t");
        let step = build_step(&token("send to <who>", &["dear all\nbye"]), None, &resolver(), &mut result);
        let step = step.unwrap_or_else(|| panic!("step should build"));
        assert_eq!(step.value, "send to {} {}");
        assert_eq!(step.args, vec![
            StepArg::Dynamic("who".into()),
            StepArg::Static("dear all\nbye".into()),
        ]);
    }

    #[test]
    fn blank_step_is_rejected() {
        let mut result = ParseResult::new("t");
        assert!(build_step(&token("", &[]), None, &resolver(), &mut result).is_none());
        assert_eq!(
            result.errors.first().map(|e| e.message.as_str()),
            Some("Step should not be blank")
        );
    }

    #[test]
    fn row_cells_are_typed_and_checked() {
        let mut result = ParseResult::new("t");
        let cells = build_row(
            &token("", &["plain", "<id>", "<file:motd.txt>"]),
            &visible(&["id"]),
            &resolver(),
            &mut result,
        );
        assert_eq!(cells, Some(vec![
            TableCell::literal("plain"),
            TableCell::dynamic("id"),
            TableCell::literal("welcome"),
        ]));

        let rejected = build_row(&token("", &["<nope>"]), &visible(&[]), &resolver(), &mut result);
        assert!(rejected.is_none());
        assert!(!result.is_ok());
    }
}
