//! Specification assembly.
//!
//! [`SpecParser`] tokenizes specification text and drives an ordered table of
//! token handlers that build the [`Specification`] tree. Concept invocations
//! are promoted through a shared, read-only [`ConceptDictionary`] once each
//! step is complete, and special parameters are resolved through the
//! [`SpecialResolver`].

mod handlers;
pub(crate) mod steps;
mod validate;

use crate::concept::ConceptDictionary;
use crate::lexer::{LexMode, Token, tokenize};
use crate::model::Specification;
use crate::resolver::SpecialResolver;
use crate::result::ParseResult;

/// A specification together with the problems found while parsing it.
#[derive(Debug, Clone, Default)]
pub struct ParsedSpec {
    /// The assembled tree. Only trustworthy when `result.is_ok()`.
    pub specification: Specification,
    /// Errors and warnings.
    pub result: ParseResult,
}

/// Parses specification text against a concept dictionary.
///
/// The parser only borrows its collaborators, so one dictionary and resolver
/// can serve many parsers on many threads.
#[derive(Debug, Clone, Copy)]
pub struct SpecParser<'a> {
    dictionary: &'a ConceptDictionary,
    resolver: &'a SpecialResolver,
}

impl<'a> SpecParser<'a> {
    /// A parser promoting steps through `dictionary`.
    #[must_use]
    pub fn new(dictionary: &'a ConceptDictionary, resolver: &'a SpecialResolver) -> Self {
        Self {
            dictionary,
            resolver,
        }
    }

    /// Parse `text`, attributing problems to `origin`.
    ///
    /// # Examples
    /// ```
    /// use stepdown::{ConceptDictionary, SpecParser, SpecialResolver};
    /// let resolver = SpecialResolver::default();
    /// let dictionary = ConceptDictionary::default();
    /// let parsed = SpecParser::new(&dictionary, &resolver)
    ///     .parse("# Spec\n|id|name|\n|1|a|\n|2|b|\n", "table.spec");
    /// assert!(parsed.result.is_ok());
    /// assert_eq!(parsed.specification.data_table.row_count(), 2);
    /// ```
    #[must_use]
    pub fn parse(&self, text: &str, origin: &str) -> ParsedSpec {
        let tokens = tokenize(text, origin, LexMode::Specification);
        let mut parsed = self.assemble(&tokens.tokens, origin);
        let mut result = tokens.result;
        result.absorb(parsed.result);
        parsed.result = result;
        parsed
    }

    /// Assemble an already tokenized specification.
    #[must_use]
    pub fn assemble(&self, tokens: &[Token], origin: &str) -> ParsedSpec {
        let mut assembler = handlers::Assembler::new(self.resolver, origin);
        for token in tokens {
            assembler.dispatch(token);
        }
        let (mut specification, mut result) = assembler.finish();
        validate::promote_concepts(&mut specification, self.dictionary, &mut result);
        validate::validate(&specification, &mut result);
        ParsedSpec {
            specification,
            result,
        }
    }
}
