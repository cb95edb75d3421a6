//! Step-text processing: canonical values and typed parameters.

mod lexer;
mod param;
#[cfg(test)]
pub(crate) mod test_support;

use crate::errors::StepTextError;
use lexer::{Segment, scan_step_text};

/// Normalised placeholder substituted for every parameter in a canonical value.
pub const PARAMETER_PLACEHOLDER: &str = "{}";

/// A parameter recognised in step text, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepParam {
    /// A `"quoted"` literal.
    Static(String),
    /// A `<name>` reference to a data-table column or concept parameter.
    Dynamic(String),
    /// A `<kind:value>` descriptor resolved from an external resource.
    Special {
        /// Resolver name, such as `file` or `table`.
        kind: String,
        /// Resolver input, such as a path.
        value: String,
    },
}

impl StepParam {
    /// The text a runner sees as this parameter's name.
    ///
    /// Static parameters report their literal, dynamic parameters their
    /// reference name and special parameters their full `kind:value`
    /// descriptor.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Static(value) | Self::Dynamic(value) => value.clone(),
            Self::Special { kind, value } => format!("{kind}:{value}"),
        }
    }
}

/// The canonical form of one step line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessedStep {
    /// Step text with each parameter replaced by [`PARAMETER_PLACEHOLDER`].
    pub canonical: String,
    /// Parameters in the order their placeholders appear.
    pub params: Vec<StepParam>,
}

/// Scan step text into its canonical value and parameter list.
///
/// A backslash escapes the following character. Escaped braces, quotes,
/// angle brackets and backslashes appear bare in the canonical value; any
/// other escaped character keeps its backslash. Inside parameters `\t` and
/// `\n` become tab and newline.
///
/// # Errors
/// Returns [`StepTextError`] for an unescaped `{` or `}` in plain text and
/// for quotes or angle brackets left open at the end of the line.
///
/// # Examples
/// ```
/// use stepdown_patterns::{StepParam, process_step_text};
/// let step = process_step_text("enter \"admin\" and <pwd>").unwrap_or_default();
/// assert_eq!(step.canonical, "enter {} and {}");
/// assert_eq!(
///     step.params,
///     vec![StepParam::Static("admin".into()), StepParam::Dynamic("pwd".into())]
/// );
/// ```
pub fn process_step_text(text: &str) -> Result<ProcessedStep, StepTextError> {
    let mut canonical = String::with_capacity(text.len());
    let mut params = Vec::new();
    for segment in scan_step_text(text)? {
        let param = match segment {
            Segment::Literal(literal) => {
                canonical.push_str(&literal);
                continue;
            }
            Segment::Quoted(literal) => StepParam::Static(literal),
            Segment::Angle { prefix, body } => param::angle_param(prefix, body),
        };
        canonical.push_str(PARAMETER_PLACEHOLDER);
        params.push(param);
    }
    Ok(ProcessedStep {
        canonical: canonical.trim().to_owned(),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_ok(text: &str) -> ProcessedStep {
        match process_step_text(text) {
            Ok(step) => step,
            Err(err) => panic!("{text:?} should process: {err}"),
        }
    }

    #[test]
    fn plain_text_is_its_own_canonical_value() {
        let step = expect_ok("open the login page");
        assert_eq!(step.canonical, "open the login page");
        assert!(step.params.is_empty());
    }

    #[test]
    fn escaped_braces_survive_as_literal_text() {
        let step = expect_ok("step with \\{braces\\}");
        assert_eq!(step.canonical, "step with {braces}");
        assert!(step.params.is_empty());
    }

    #[test]
    fn mixes_all_parameter_kinds() {
        let step = expect_ok("load <file:users.csv> as <alias> into \"db\"");
        assert_eq!(step.canonical, "load {} as {} into {}");
        assert_eq!(
            step.params,
            vec![
                StepParam::Special {
                    kind: "file".into(),
                    value: "users.csv".into(),
                },
                StepParam::Dynamic("alias".into()),
                StepParam::Static("db".into()),
            ]
        );
    }

    #[test]
    fn trims_canonical_value_around_parameters() {
        let step = expect_ok("\"a\" ");
        assert_eq!(step.canonical, "{}");
    }

    #[test]
    fn special_param_name_joins_kind_and_value() {
        let param = StepParam::Special {
            kind: "table".into(),
            value: "rows.csv".into(),
        };
        assert_eq!(param.name(), "table:rows.csv");
    }
}
