//! Steps and concept invocations.

use stepdown_patterns::{PARAMETER_PLACEHOLDER, StepValue};

use crate::concept::Concept;
use crate::datatable::Table;
use crate::lookup::{ArgLookup, LookupError};
use crate::step_args::StepArg;

/// Expansion carried by a step that invokes a concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptInvocation {
    /// The concept body, with nested invocations already expanded.
    pub steps: Vec<Step>,
    /// Concept parameters bound to this invocation's arguments.
    pub lookup: ArgLookup,
    /// Label of the file declaring the concept.
    pub origin: String,
}

/// One step line, possibly expanded into a concept invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Canonical value with `{}` placeholders.
    pub value: String,
    /// The line as written.
    pub line_text: String,
    /// 1-based line number.
    pub line: usize,
    /// Arguments in placeholder order.
    pub args: Vec<StepArg>,
    /// Whether the last argument is an inline table.
    pub has_inline_table: bool,
    concept: Option<ConceptInvocation>,
}

impl Step {
    /// A plain step.
    #[must_use]
    pub fn new(
        value: impl Into<String>,
        line_text: impl Into<String>,
        line: usize,
        args: Vec<StepArg>,
    ) -> Self {
        Self {
            value: value.into(),
            line_text: line_text.into(),
            line,
            args,
            has_inline_table: false,
            concept: None,
        }
    }

    /// Whether the step invokes a concept.
    #[must_use]
    pub fn is_concept(&self) -> bool {
        self.concept.is_some()
    }

    /// The invocation details of a concept step.
    #[must_use]
    pub fn concept(&self) -> Option<&ConceptInvocation> {
        self.concept.as_ref()
    }

    /// Nested steps of a concept step; empty for plain steps.
    #[must_use]
    pub fn nested_steps(&self) -> &[Self] {
        self.concept.as_ref().map_or(&[], |c| c.steps.as_slice())
    }

    /// Attach an inline table as the final argument.
    pub fn attach_inline_table(&mut self, table: Table) {
        self.value.push(' ');
        self.value.push_str(PARAMETER_PLACEHOLDER);
        self.args.push(StepArg::Table(table));
        self.has_inline_table = true;
    }

    /// Attach the content of a `"""` block as a literal argument.
    pub fn attach_multiline(&mut self, content: impl Into<String>) {
        self.value.push(' ');
        self.value.push_str(PARAMETER_PLACEHOLDER);
        self.args.push(StepArg::Static(content.into()));
    }

    /// The inline table, when one is attached.
    pub(crate) fn inline_table_mut(&mut self) -> Option<&mut Table> {
        if !self.has_inline_table {
            return None;
        }
        match self.args.last_mut() {
            Some(StepArg::Table(table)) => Some(table),
            _ => None,
        }
    }

    /// Runner-facing identity of the step.
    #[must_use]
    pub fn step_value(&self) -> StepValue {
        StepValue::new(
            self.value.clone(),
            self.args.iter().map(|arg| arg.name().to_owned()).collect(),
        )
    }

    /// Whether any argument or inline-table cell references one of `names`.
    #[must_use]
    pub fn references_any(&self, names: &[String]) -> bool {
        self.args.iter().any(|arg| match arg {
            StepArg::Dynamic(name) => names.contains(name),
            StepArg::Table(table) => table.references_any(names),
            _ => false,
        })
    }

    /// Wrap a concept definition as a step carrying its body and a lookup
    /// declaring its parameters.
    pub(crate) fn concept_definition(
        heading: Self,
        params: &[String],
        steps: Vec<Self>,
        origin: &str,
    ) -> Self {
        let mut lookup = ArgLookup::new();
        for name in params {
            lookup.add_name(name.as_str());
        }
        Self {
            concept: Some(ConceptInvocation {
                steps,
                lookup,
                origin: origin.to_owned(),
            }),
            ..heading
        }
    }

    /// Replace the body of a concept definition.
    pub(crate) fn with_body(mut self, steps: Vec<Self>) -> Self {
        if let Some(invocation) = self.concept.as_mut() {
            invocation.steps = steps;
        }
        self
    }

    /// Turn a provisional step into an invocation of `concept`.
    ///
    /// The concept body is copied and the concept's declared parameters are
    /// bound positionally to this step's arguments in a fresh lookup.
    ///
    /// # Errors
    /// Returns [`LookupError`] if a declared parameter is missing from the
    /// concept's lookup, which indicates a malformed concept definition.
    pub fn promote(provisional: Self, concept: &Concept) -> Result<Self, LookupError> {
        let template = concept.invocation();
        let mut lookup = template.map(|t| t.lookup.clone()).unwrap_or_default();
        for (name, arg) in concept.params().zip(&provisional.args) {
            lookup.bind(name, arg.clone())?;
        }
        Ok(Self {
            concept: Some(ConceptInvocation {
                steps: template.map(|t| t.steps.clone()).unwrap_or_default(),
                lookup,
                origin: concept.file().to_owned(),
            }),
            ..provisional
        })
    }
}
