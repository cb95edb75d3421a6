//! Runner-facing step values.
//!
//! [`StepValue`] is the identity a runner matches step implementations
//! against: the canonical value, the argument names or literals in order, and
//! a human readable form with each placeholder replaced by `<arg>`.

use crate::errors::StepTextError;
use crate::step_text::{PARAMETER_PLACEHOLDER, process_step_text};

/// Argument name reported for a step's inline table.
pub const INLINE_TABLE_ARG: &str = "table";

/// Canonical identity of a step for matching and refactoring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepValue {
    /// Canonical value with `{}` placeholders.
    pub value: String,
    /// Argument names (dynamic), literals (static) or descriptors (special).
    pub args: Vec<String>,
    /// Canonical value with each placeholder replaced by `<arg>`.
    pub parameterized: String,
}

impl StepValue {
    /// Build a step value from its canonical text and argument names.
    ///
    /// # Examples
    /// ```
    /// use stepdown_patterns::StepValue;
    /// let value = StepValue::new("login as {} with {}", vec!["user".into(), "pwd".into()]);
    /// assert_eq!(value.parameterized, "login as <user> with <pwd>");
    /// ```
    #[must_use]
    pub fn new(value: impl Into<String>, args: Vec<String>) -> Self {
        let value = value.into();
        let parameterized = parameterize(&value, &args);
        Self {
            value,
            args,
            parameterized,
        }
    }
}

fn parameterize(value: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(value.len());
    let mut args = args.iter();
    let mut pieces = value.split(PARAMETER_PLACEHOLDER).peekable();
    while let Some(piece) = pieces.next() {
        out.push_str(piece);
        if pieces.peek().is_none() {
            break;
        }
        let Some(arg) = args.next() else {
            out.push_str(PARAMETER_PLACEHOLDER);
            continue;
        };
        out.push('<');
        out.push_str(arg);
        out.push('>');
    }
    out
}

/// Extract a [`StepValue`] straight from step text.
///
/// No reference validation happens here: dynamic names are reported as
/// written. When `has_inline_table` is set, one extra placeholder and the
/// [`INLINE_TABLE_ARG`] argument are appended.
///
/// # Errors
/// Propagates [`StepTextError`] from scanning the text.
pub fn extract_step_value(text: &str, has_inline_table: bool) -> Result<StepValue, StepTextError> {
    let processed = process_step_text(text)?;
    let mut value = processed.canonical;
    let mut args: Vec<String> = processed.params.iter().map(|param| param.name()).collect();
    if has_inline_table {
        value.push(' ');
        value.push_str(PARAMETER_PLACEHOLDER);
        args.push(INLINE_TABLE_ARG.to_owned());
    }
    Ok(StepValue::new(value, args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_value(text: &str, table: bool) -> StepValue {
        match extract_step_value(text, table) {
            Ok(value) => value,
            Err(err) => panic!("{text:?} should extract: {err}"),
        }
    }

    #[test]
    fn reports_names_and_literals() {
        let value = expect_value("enter \"admin\" and <pwd>", false);
        assert_eq!(value.value, "enter {} and {}");
        assert_eq!(value.args, vec!["admin".to_owned(), "pwd".to_owned()]);
        assert_eq!(value.parameterized, "enter <admin> and <pwd>");
    }

    #[test]
    fn appends_inline_table_placeholder() {
        let value = expect_value("create users", true);
        assert_eq!(value.value, "create users {}");
        assert_eq!(value.args, vec![INLINE_TABLE_ARG.to_owned()]);
        assert_eq!(value.parameterized, "create users <table>");
    }

    #[test]
    fn leaves_surplus_placeholders_untouched() {
        assert_eq!(parameterize("{} and {}", &["a".to_owned()]), "<a> and {}");
    }

    #[test]
    fn propagates_scan_errors() {
        assert!(extract_step_value("broken \"quote", false).is_err());
    }
}
