//! Boolean tag expressions.
//!
//! An expression is normalised (whitespace removed, `&&` to `&`, `||` and `,`
//! to `|`), split on the operators `& | ( ) !`, and every remaining run of
//! text is a tag name. Names are replaced by their membership in the tag set,
//! negations are folded away, and the resulting boolean expression is
//! evaluated with `&` binding tighter than `|`.

use hashbrown::HashSet;

use thiserror::Error;

/// A malformed tag expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tag expression at byte {offset}: {reason}")]
pub struct TagExprError {
    /// Byte offset into the normalised expression.
    pub offset: usize,
    /// What went wrong.
    pub reason: String,
}

impl TagExprError {
    fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Name(String),
    Value(bool),
    And,
    Or,
    Not,
    Open,
    Close,
}

impl Term {
    fn describe(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Value(value) => value.to_string(),
            Self::And => "'&'".to_owned(),
            Self::Or => "'|'".to_owned(),
            Self::Not => "'!'".to_owned(),
            Self::Open => "'('".to_owned(),
            Self::Close => "')'".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Spanned {
    term: Term,
    start: usize,
}

/// A tag expression ready to be evaluated against tag sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    expression: String,
    terms: Vec<Spanned>,
    case_sensitive: bool,
}

/// Normalise a tag name or expression: whitespace is dropped and, unless
/// `case_sensitive`, letters are lowercased.
#[must_use]
pub fn sanitize_tag(tag: &str, case_sensitive: bool) -> String {
    let compact: String = tag.chars().filter(|ch| !ch.is_whitespace()).collect();
    if case_sensitive {
        compact
    } else {
        compact.to_lowercase()
    }
}

fn normalize(expression: &str) -> String {
    expression
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .replace("&&", "&")
        .replace("||", "|")
        .replace(',', "|")
}

fn split_terms(expression: &str, case_sensitive: bool) -> Vec<Spanned> {
    let mut terms = Vec::new();
    let mut word = String::new();
    let mut word_start = 0;
    for (index, ch) in expression.char_indices() {
        let term = match ch {
            '&' => Term::And,
            '|' => Term::Or,
            '!' => Term::Not,
            '(' => Term::Open,
            ')' => Term::Close,
            other => {
                if word.is_empty() {
                    word_start = index;
                }
                word.push(other);
                continue;
            }
        };
        if !word.is_empty() {
            terms.push(Spanned {
                term: Term::Name(sanitize_tag(&word, case_sensitive)),
                start: word_start,
            });
            word.clear();
        }
        terms.push(Spanned { term, start: index });
    }
    if !word.is_empty() {
        terms.push(Spanned {
            term: Term::Name(sanitize_tag(&word, case_sensitive)),
            start: word_start,
        });
    }
    terms
}

impl TagFilter {
    /// Prepare `expression` without checking its structure.
    ///
    /// A filter built this way never fails: [`TagFilter::matches`] treats a
    /// malformed expression as matching nothing.
    #[must_use]
    pub fn new(expression: &str, case_sensitive: bool) -> Self {
        let expression = normalize(expression);
        let terms = split_terms(&expression, case_sensitive);
        Self {
            expression,
            terms,
            case_sensitive,
        }
    }

    /// Prepare `expression` and reject it if it is malformed.
    ///
    /// # Errors
    /// Returns [`TagExprError`] describing the first structural problem.
    ///
    /// # Examples
    /// ```
    /// use stepdown::TagFilter;
    /// let filter = TagFilter::parse("a & (b | c)", false).unwrap();
    /// assert!(filter.matches(["a", "c"]));
    /// assert!(!filter.matches(["a"]));
    /// assert!(TagFilter::parse("a & ", false).is_err());
    /// ```
    pub fn parse(expression: &str, case_sensitive: bool) -> Result<Self, TagExprError> {
        let filter = Self::new(expression, case_sensitive);
        filter.validate()?;
        Ok(filter)
    }

    /// The normalised expression text.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Check the expression's structure by evaluating it with every tag
    /// present.
    ///
    /// # Errors
    /// Returns [`TagExprError`] describing the first structural problem.
    pub fn validate(&self) -> Result<(), TagExprError> {
        let substituted = self
            .terms
            .iter()
            .map(|spanned| match spanned.term {
                Term::Name(_) => Spanned {
                    term: Term::Value(true),
                    start: spanned.start,
                },
                _ => spanned.clone(),
            })
            .collect();
        reduce_and_evaluate(substituted, self.expression.len()).map(|_| ())
    }

    /// Evaluate the expression against `tags`.
    ///
    /// # Errors
    /// Returns [`TagExprError`] when the expression is malformed.
    pub fn evaluate<'a, I>(&self, tags: I) -> Result<bool, TagExprError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let set: HashSet<String> = tags
            .into_iter()
            .map(|tag| sanitize_tag(tag, self.case_sensitive))
            .collect();
        let substituted = self
            .terms
            .iter()
            .map(|spanned| match &spanned.term {
                Term::Name(name) => Spanned {
                    term: Term::Value(set.contains(name)),
                    start: spanned.start,
                },
                _ => spanned.clone(),
            })
            .collect();
        reduce_and_evaluate(substituted, self.expression.len())
    }

    /// Whether `tags` satisfy the expression; a malformed expression matches
    /// nothing.
    pub fn matches<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.evaluate(tags).unwrap_or_else(|err| {
            log::debug!("tag expression '{}' excluded a scenario: {err}", self.expression);
            false
        })
    }
}

fn reduce_and_evaluate(terms: Vec<Spanned>, end: usize) -> Result<bool, TagExprError> {
    let reduced = fold_negations(terms, end)?;
    evaluate_terms(&reduced, end)
}

/// Index of the `)` closing the `(` at `open`.
fn matching_close(terms: &[Spanned], open: usize) -> Option<usize> {
    let mut depth = 0_usize;
    for (index, spanned) in terms.iter().enumerate().skip(open) {
        match spanned.term {
            Term::Open => depth += 1,
            Term::Close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Replace every `!value` and `!( ... )` with the complemented value until
/// no negation remains.
fn fold_negations(mut terms: Vec<Spanned>, end: usize) -> Result<Vec<Spanned>, TagExprError> {
    while let Some(not) = terms.iter().rposition(|s| s.term == Term::Not) {
        let start = terms.get(not).map_or(end, |s| s.start);
        let operand = terms.get(not + 1).map(|s| s.term.clone());
        let (value, last) = match operand {
            Some(Term::Value(value)) => (value, not + 1),
            Some(Term::Open) => {
                let close = matching_close(&terms, not + 1)
                    .ok_or_else(|| TagExprError::new(start, "missing ')'"))?;
                let inner = terms.get(not + 2..close).map(<[Spanned]>::to_vec).unwrap_or_default();
                let inner_end = terms.get(close).map_or(end, |s| s.start);
                (evaluate_terms(&inner, inner_end)?, close)
            }
            Some(other) => {
                let at = terms.get(not + 1).map_or(end, |s| s.start);
                return Err(TagExprError::new(
                    at,
                    format!("expected tag or '(' after '!' but found {}", other.describe()),
                ));
            }
            None => return Err(TagExprError::new(end, "expected tag or '(' after '!'")),
        };
        let tail = terms.split_off(last + 1);
        terms.truncate(not);
        terms.push(Spanned {
            term: Term::Value(!value),
            start,
        });
        terms.extend(tail);
    }
    Ok(terms)
}

fn evaluate_terms(terms: &[Spanned], end: usize) -> Result<bool, TagExprError> {
    let mut evaluator = Evaluator {
        terms,
        position: 0,
        end,
    };
    let value = evaluator.or()?;
    evaluator.peek().map_or(Ok(value), |spanned| {
        Err(TagExprError::new(
            spanned.start,
            format!("unexpected token {}", spanned.term.describe()),
        ))
    })
}

struct Evaluator<'a> {
    terms: &'a [Spanned],
    position: usize,
    end: usize,
}

impl Evaluator<'_> {
    fn peek(&self) -> Option<&Spanned> {
        self.terms.get(self.position)
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.end, |s| s.start)
    }

    fn or(&mut self) -> Result<bool, TagExprError> {
        let mut value = self.and()?;
        while self.peek().is_some_and(|s| s.term == Term::Or) {
            self.position += 1;
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<bool, TagExprError> {
        let mut value = self.primary()?;
        while self.peek().is_some_and(|s| s.term == Term::And) {
            self.position += 1;
            let rhs = self.primary()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn primary(&mut self) -> Result<bool, TagExprError> {
        let offset = self.offset();
        match self.peek().map(|s| s.term.clone()) {
            Some(Term::Value(value)) => {
                self.position += 1;
                Ok(value)
            }
            Some(Term::Open) => {
                self.position += 1;
                let value = self.or()?;
                if self.peek().is_some_and(|s| s.term == Term::Close) {
                    self.position += 1;
                    Ok(value)
                } else {
                    Err(TagExprError::new(offset, "missing ')'"))
                }
            }
            Some(other) => Err(TagExprError::new(
                offset,
                format!("expected tag or '(' but found {}", other.describe()),
            )),
            None => Err(TagExprError::new(offset, "expected tag or '('")),
        }
    }
}
