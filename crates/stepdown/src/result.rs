//! Structured parse diagnostics.
//!
//! Parsing never panics on malformed input. Every problem is recorded as a
//! [`ParseError`] (fatal for the file) or a [`Warning`] (the offending item is
//! ignored) and collected into a [`ParseResult`] for the caller to surface.

use std::fmt;

use thiserror::Error;

/// A fatal problem found while parsing one file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}:{line} {message} => '{line_text}'")]
pub struct ParseError {
    /// Label the caller supplied for the parsed text, usually a file name.
    pub origin: String,
    /// 1-based line number, or 0 when the error concerns the whole file.
    pub line: usize,
    /// The offending line as written.
    pub line_text: String,
    /// Human readable description.
    pub message: String,
}

impl ParseError {
    /// Create an error attributed to `origin` at `line`.
    #[must_use]
    pub fn new(
        origin: impl Into<String>,
        line: usize,
        line_text: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            line,
            line_text: line_text.into(),
            message: message.into(),
        }
    }
}

/// A non-fatal problem; the item it concerns was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Label of the parsed text.
    pub origin: String,
    /// 1-based line number.
    pub line: usize,
    /// Human readable description.
    pub message: String,
}

impl Warning {
    /// Create a warning attributed to `origin` at `line`.
    #[must_use]
    pub fn new(origin: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.origin, self.line, self.message)
    }
}

/// Errors and warnings collected while parsing one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Label of the parsed text.
    pub origin: String,
    /// Fatal problems. Any entry marks the file as failed.
    pub errors: Vec<ParseError>,
    /// Non-fatal problems.
    pub warnings: Vec<Warning>,
}

impl ParseResult {
    /// An empty result for `origin`.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Whether parsing succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record a fatal error at `line`.
    pub fn error(&mut self, line: usize, line_text: &str, message: impl Into<String>) {
        self.errors
            .push(ParseError::new(self.origin.clone(), line, line_text, message));
    }

    /// Record a warning at `line`.
    pub fn warn(&mut self, line: usize, message: impl Into<String>) {
        let warning = Warning::new(self.origin.clone(), line, message);
        log::debug!("{warning}");
        self.warnings.push(warning);
    }

    /// Append everything recorded in `other`.
    pub fn absorb(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}
