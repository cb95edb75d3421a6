//! Line tokenizer.
//!
//! Each non-blank line is classified in a fixed order: scenario heading,
//! spec heading, `=`/`-` underline, step, tag, table row, `table:` reference,
//! teardown marker, and finally comment. Classification depends on the
//! current [`scope::Scope`], so a step is a context step until the first
//! scenario opens, and a table row is a header until a table is open.
//!
//! A `"""` line directly under a step opens a multiline argument; every line
//! up to the closing `"""` is taken verbatim and becomes the step's argument.

mod scope;
mod table;

pub(crate) use scope::{Scope, ScopeFlag};

use std::sync::LazyLock;

use regex::Regex;

use crate::datatable::validate_headers;
use crate::result::ParseResult;

static TABLE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^table\s*:").unwrap_or_else(|_| unreachable!("table reference regex is valid"))
});

const TEARDOWN_MIN_LEN: usize = 3;
const MULTILINE_FENCE: &str = "\"\"\"";

/// Classification of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `# heading` or a line underlined with `=`; a concept heading in
    /// concept files.
    SpecHeading,
    /// `## heading` or a line underlined with `-`.
    ScenarioHeading,
    /// A `*` line after the first scenario heading.
    Step,
    /// A `*` line before the first scenario heading.
    Context,
    /// A `tags:` line, including continuation lines.
    Tag,
    /// The first row of a table.
    TableHeader,
    /// A data row of an open table.
    TableRow,
    /// A `table: <location>` external data table reference.
    DataTableRef,
    /// A line of underscores opening the teardown section.
    TearDown,
    /// Anything else.
    Comment,
}

/// One classified line. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Classification.
    pub kind: TokenKind,
    /// 1-based line number.
    pub line: usize,
    /// The line as written.
    pub line_text: String,
    /// The meaningful text: heading or step text without markers, trimmed.
    pub value: String,
    /// Tag names, table cells, or the content of a step's multiline
    /// argument.
    pub args: Vec<String>,
}

/// Which file grammar to tokenize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexMode {
    /// A specification: one `#` heading, then scenarios.
    #[default]
    Specification,
    /// A concept file: any number of `#` concept headings.
    Concept,
}

/// Tokens of one file plus the syntax errors found while classifying.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
    /// Accepted tokens in line order.
    pub tokens: Vec<Token>,
    /// Syntax errors. The offending lines produce no token, except an empty
    /// concept heading, which still closes the concept above it.
    pub result: ParseResult,
}

struct MultilineBlock {
    line: usize,
    raw: String,
    lines: Vec<String>,
}

struct Lexer {
    mode: LexMode,
    scope: Scope,
    seen_heading: bool,
    after_step: bool,
    block: Option<MultilineBlock>,
    tokens: Vec<Token>,
    result: ParseResult,
}

/// Tokenize `text`, attributing errors to `origin`.
///
/// # Examples
/// ```
/// use stepdown::{LexMode, TokenKind, tokenize};
/// let tokens = tokenize("# Spec\n* ctx\n## Scenario\n* step\n", "a.spec", LexMode::Specification);
/// let kinds: Vec<_> = tokens.tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, vec![
///     TokenKind::SpecHeading,
///     TokenKind::Context,
///     TokenKind::ScenarioHeading,
///     TokenKind::Step,
/// ]);
/// ```
#[must_use]
pub fn tokenize(text: &str, origin: &str, mode: LexMode) -> Tokens {
    let mut lexer = Lexer {
        mode,
        scope: Scope::default(),
        seen_heading: false,
        after_step: false,
        block: None,
        tokens: Vec::new(),
        result: ParseResult::new(origin),
    };
    for (index, raw) in text.lines().enumerate() {
        lexer.line(index + 1, raw);
    }
    if let Some(block) = lexer.block.take() {
        lexer.result.error(
            block.line,
            &block.raw,
            "Multiline string argument is not terminated",
        );
    }
    Tokens {
        tokens: lexer.tokens,
        result: lexer.result,
    }
}

fn is_underline(line: &str, marker: char) -> bool {
    !line.is_empty() && line.chars().all(|ch| ch == marker)
}

fn tag_body(line: &str) -> Option<&str> {
    ["tags:", "tags :"].iter().find_map(|prefix| {
        line.get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .and_then(|_| line.get(prefix.len()..))
    })
}

fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

impl Lexer {
    fn token(kind: TokenKind, line: usize, raw: &str, value: &str) -> Token {
        Token {
            kind,
            line,
            line_text: raw.to_owned(),
            value: value.trim().to_owned(),
            args: Vec::new(),
        }
    }

    fn line(&mut self, line: usize, raw: &str) {
        let trimmed = raw.trim();
        if let Some(block) = self.block.as_mut() {
            if trimmed == MULTILINE_FENCE {
                self.close_block();
            } else {
                block.lines.push(raw.to_owned());
            }
            return;
        }
        if std::mem::take(&mut self.after_step) && trimmed == MULTILINE_FENCE {
            self.block = Some(MultilineBlock {
                line,
                raw: raw.to_owned(),
                lines: Vec::new(),
            });
            return;
        }
        if trimmed.is_empty() {
            self.scope.retain(&[
                ScopeFlag::Spec,
                ScopeFlag::Scenario,
                ScopeFlag::Step,
                ScopeFlag::Context,
                ScopeFlag::TearDown,
            ]);
            return;
        }

        if trimmed.starts_with("##") && !trimmed.starts_with("###") {
            let value = trimmed.trim_start_matches('#');
            self.scenario_heading(Self::token(TokenKind::ScenarioHeading, line, raw, value));
        } else if trimmed.starts_with('#') && !trimmed.starts_with("##") {
            let value = trimmed.trim_start_matches('#');
            self.spec_heading(Self::token(TokenKind::SpecHeading, line, raw, value));
        } else if is_underline(trimmed, '=') && self.scope.has(ScopeFlag::Comment) {
            self.promote_comment(TokenKind::SpecHeading);
        } else if is_underline(trimmed, '-') && self.scope.has(ScopeFlag::Comment) {
            self.promote_comment(TokenKind::ScenarioHeading);
        } else if trimmed.starts_with('*') && !trimmed.starts_with("**") {
            let value = trimmed.trim_start_matches('*');
            self.step(Self::token(TokenKind::Step, line, raw, value));
        } else if let Some(body) = tag_body(trimmed) {
            self.tag(Self::token(TokenKind::Tag, line, raw, body));
        } else if self.scope.has(ScopeFlag::Tags) {
            self.tag_continuation(trimmed);
        } else if table::is_table_row(trimmed) {
            self.table_row(line, raw, trimmed);
        } else if TABLE_REF_RE.is_match(trimmed) {
            let location = trimmed.split_once(':').map_or("", |(_, rest)| rest);
            let mut token = Self::token(TokenKind::DataTableRef, line, raw, location);
            token.args = vec![token.value.clone()];
            self.accept(token);
        } else if is_underline(trimmed, '_') {
            self.teardown(Self::token(TokenKind::TearDown, line, raw, trimmed));
        } else {
            let token = Self::token(TokenKind::Comment, line, raw, raw.trim_end());
            self.push_comment(token);
        }
    }

    /// Push `token`, leaving table, tag and comment scope.
    fn accept(&mut self, token: Token) {
        self.scope.retain(&[
            ScopeFlag::Spec,
            ScopeFlag::Scenario,
            ScopeFlag::Step,
            ScopeFlag::Context,
            ScopeFlag::TearDown,
        ]);
        self.tokens.push(token);
    }

    /// Hand the collected block to the step token above it.
    fn close_block(&mut self) {
        let Some(block) = self.block.take() else {
            return;
        };
        if let Some(step) = self.tokens.last_mut() {
            step.args = vec![block.lines.join("\n")];
        }
    }

    fn push_comment(&mut self, token: Token) {
        self.scope.retain(&[
            ScopeFlag::Spec,
            ScopeFlag::Scenario,
            ScopeFlag::TearDown,
        ]);
        self.scope.add(ScopeFlag::Comment);
        self.tokens.push(token);
    }

    fn reject(&mut self, token: &Token, message: &str) {
        self.result.error(token.line, &token.line_text, message);
    }

    fn spec_heading(&mut self, token: Token) {
        if self.mode == LexMode::Concept {
            if token.value.is_empty() {
                self.reject(&token, "Concept heading should have at least one character");
            }
            self.seen_heading = true;
            self.scope.reset_to(ScopeFlag::Concept);
            self.tokens.push(token);
            return;
        }
        if token.value.is_empty() {
            self.reject(&token, "Spec heading should have at least one character");
        } else if self.seen_heading {
            self.reject(&token, "Multiple spec headings found in same file");
        } else {
            self.seen_heading = true;
            self.scope.reset_to(ScopeFlag::Spec);
            self.tokens.push(token);
        }
    }

    fn scenario_heading(&mut self, token: Token) {
        if token.value.is_empty() {
            self.reject(&token, "Scenario heading should have at least one character");
        } else if self.mode == LexMode::Specification && !self.seen_heading {
            self.reject(&token, "Scenario should be defined after the spec heading");
        } else {
            self.scope.retain_then_add(&[ScopeFlag::Spec], ScopeFlag::Scenario);
            self.tokens.push(token);
        }
    }

    fn promote_comment(&mut self, kind: TokenKind) {
        let Some(mut token) = self.tokens.pop() else {
            return;
        };
        self.scope.remove(ScopeFlag::Comment);
        token.kind = kind;
        token.value = token.value.trim().to_owned();
        match kind {
            TokenKind::SpecHeading => self.spec_heading(token),
            _ => self.scenario_heading(token),
        }
    }

    fn step(&mut self, mut token: Token) {
        if self.mode == LexMode::Specification && !self.seen_heading {
            self.reject(&token, "Step should be defined after the spec heading");
            return;
        }
        let keep = [ScopeFlag::Spec, ScopeFlag::Scenario, ScopeFlag::TearDown, ScopeFlag::Concept];
        if self.scope.has(ScopeFlag::Scenario) {
            self.scope.retain_then_add(&keep, ScopeFlag::Step);
        } else {
            token.kind = TokenKind::Context;
            self.scope.retain_then_add(&keep, ScopeFlag::Context);
        }
        self.tokens.push(token);
        self.after_step = true;
    }

    fn tag(&mut self, mut token: Token) {
        token.args = split_tags(&token.value);
        let continues = token.value.ends_with(',');
        self.accept(token);
        if continues {
            self.scope.add(ScopeFlag::Tags);
        }
    }

    fn tag_continuation(&mut self, trimmed: &str) {
        let Some(previous) = self.tokens.last_mut() else {
            return;
        };
        previous.value = format!("{} {trimmed}", previous.value);
        previous.args.extend(split_tags(trimmed));
        if !trimmed.ends_with(',') {
            self.scope.remove(ScopeFlag::Tags);
        }
    }

    fn table_row(&mut self, line: usize, raw: &str, trimmed: &str) {
        let cells = table::split_cells(trimmed);
        self.scope.remove(ScopeFlag::Comment);
        if !self.scope.has(ScopeFlag::Table) {
            self.scope.add(ScopeFlag::Table);
            self.scope.remove(ScopeFlag::TableData);
            if let Err(err) = validate_headers(&cells) {
                self.result.error(line, raw, err.to_string());
                return;
            }
            let mut token = Self::token(TokenKind::TableHeader, line, raw, trimmed);
            token.args = cells;
            self.tokens.push(token);
            return;
        }
        let after_header = !self.scope.has(ScopeFlag::TableData);
        self.scope.add(ScopeFlag::TableData);
        if after_header && table::is_separator(&cells) {
            return;
        }
        let mut token = Self::token(TokenKind::TableRow, line, raw, trimmed);
        token.args = cells;
        self.tokens.push(token);
    }

    fn teardown(&mut self, token: Token) {
        if token.value.chars().count() < TEARDOWN_MIN_LEN {
            self.reject(&token, "Teardown should have at least three underscore characters");
            return;
        }
        self.scope.retain_then_add(&[ScopeFlag::Spec], ScopeFlag::TearDown);
        self.tokens.push(token);
    }
}
