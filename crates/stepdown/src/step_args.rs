//! Step arguments.

use crate::datatable::Table;
use stepdown_patterns::INLINE_TABLE_ARG;

/// One argument of a step, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepArg {
    /// A quoted literal, or the content of a multiline argument.
    Static(String),
    /// A reference resolved through the nearest enclosing lookup.
    Dynamic(String),
    /// An inline table written under the step.
    Table(Table),
    /// Text loaded from an external resource while parsing.
    SpecialString {
        /// The `kind:value` descriptor as written.
        name: String,
        /// Loaded content.
        value: String,
    },
    /// A table loaded from an external resource while parsing.
    SpecialTable {
        /// The `kind:value` descriptor as written.
        name: String,
        /// Loaded table.
        table: Table,
    },
}

impl StepArg {
    /// The name reported for the argument: its literal, reference name,
    /// descriptor, or `table` for inline tables.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Static(value) | Self::Dynamic(value) => value,
            Self::Table(_) => INLINE_TABLE_ARG,
            Self::SpecialString { name, .. } | Self::SpecialTable { name, .. } => name,
        }
    }
}
