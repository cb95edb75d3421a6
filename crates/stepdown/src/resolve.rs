//! Run-time argument resolution.
//!
//! A step's dynamic arguments name parameters declared by an enclosing
//! concept or by a data-table column. Resolution walks a chain of frames:
//! each concept invocation contributes its own lookup, whose bound values
//! were written in the invoking scope and are therefore resolved one frame
//! further out. The outermost frame holds the data-table row.

use stepdown_patterns::PARAMETER_PLACEHOLDER;
use thiserror::Error;

use crate::datatable::Table;
use crate::lookup::{ArgLookup, LookupError};
use crate::model::Step;
use crate::step_args::StepArg;

/// Failure to give every argument of a step a concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// No enclosing scope binds the parameter.
    #[error("line {line}: dynamic parameter <{name}> has no value")]
    Unbound {
        /// Parameter name.
        name: String,
        /// Line of the step referencing it.
        line: usize,
    },
    /// A data-table row could not be bound.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// How an argument was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A quoted literal.
    Static,
    /// A `<name>` reference.
    Dynamic,
    /// An inline table.
    Table,
    /// Text loaded from a `kind:value` descriptor.
    SpecialString,
    /// A table loaded from a `kind:value` descriptor.
    SpecialTable,
}

impl From<&StepArg> for ParamKind {
    fn from(arg: &StepArg) -> Self {
        match arg {
            StepArg::Static(_) => Self::Static,
            StepArg::Dynamic(_) => Self::Dynamic,
            StepArg::Table(_) => Self::Table,
            StepArg::SpecialString { .. } => Self::SpecialString,
            StepArg::SpecialTable { .. } => Self::SpecialTable,
        }
    }
}

/// A table whose cells are all concrete text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Rows of cell text in header order.
    pub rows: Vec<Vec<String>>,
}

/// The concrete value of an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    /// Plain text.
    Text(String),
    /// A table.
    Table(ResolvedTable),
}

/// One argument after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParam {
    /// The argument's name as written.
    pub name: String,
    /// How the argument was written.
    pub kind: ParamKind,
    /// Its concrete value.
    pub value: ResolvedValue,
}

/// A step with concrete arguments, ready for a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    /// Canonical value with `{}` placeholders.
    pub value: String,
    /// The line as written.
    pub line_text: String,
    /// 1-based line number.
    pub line: usize,
    /// Arguments in placeholder order.
    pub params: Vec<ResolvedParam>,
    /// Resolved concept body; empty for plain steps.
    pub nested: Vec<ResolvedStep>,
    /// Whether the step invokes a concept.
    pub is_concept: bool,
}

impl ResolvedStep {
    /// The canonical value with each placeholder replaced by its text, or by
    /// `<table>` for table arguments.
    #[must_use]
    pub fn text(&self) -> String {
        let mut pieces = self.value.split(PARAMETER_PLACEHOLDER);
        let mut text = pieces.next().unwrap_or_default().to_owned();
        let mut params = self.params.iter();
        for piece in pieces {
            match params.next().map(|param| &param.value) {
                Some(ResolvedValue::Text(value)) => text.push_str(value),
                Some(ResolvedValue::Table(_)) => text.push_str("<table>"),
                None => text.push_str(PARAMETER_PLACEHOLDER),
            }
            text.push_str(piece);
        }
        text
    }
}

struct Frame<'a> {
    lookup: &'a ArgLookup,
    parent: Option<&'a Frame<'a>>,
}

/// Resolve `step` against `lookup`, usually the bindings of one data-table
/// row.
///
/// # Errors
/// Returns [`ArgumentError::Unbound`] when a dynamic argument has no value in
/// any enclosing scope.
pub fn resolve_step(step: &Step, lookup: &ArgLookup) -> Result<ResolvedStep, ArgumentError> {
    resolve_in(
        step,
        &Frame {
            lookup,
            parent: None,
        },
    )
}

/// Resolve every step of `steps` against `lookup`.
///
/// # Errors
/// Returns the first [`ArgumentError`] encountered.
pub fn resolve_steps(steps: &[Step], lookup: &ArgLookup) -> Result<Vec<ResolvedStep>, ArgumentError> {
    steps.iter().map(|step| resolve_step(step, lookup)).collect()
}

fn resolve_in(step: &Step, frame: &Frame<'_>) -> Result<ResolvedStep, ArgumentError> {
    let params = step
        .args
        .iter()
        .map(|arg| resolve_arg(arg, frame, step.line))
        .collect::<Result<Vec<_>, _>>()?;
    let nested = match step.concept() {
        Some(invocation) => {
            let inner = Frame {
                lookup: &invocation.lookup,
                parent: Some(frame),
            };
            invocation
                .steps
                .iter()
                .map(|nested| resolve_in(nested, &inner))
                .collect::<Result<Vec<_>, _>>()?
        }
        None => Vec::new(),
    };
    Ok(ResolvedStep {
        value: step.value.clone(),
        line_text: step.line_text.clone(),
        line: step.line,
        params,
        nested,
        is_concept: step.is_concept(),
    })
}

fn resolve_arg(arg: &StepArg, frame: &Frame<'_>, line: usize) -> Result<ResolvedParam, ArgumentError> {
    let value = match arg {
        StepArg::Static(value) | StepArg::SpecialString { value, .. } => {
            ResolvedValue::Text(value.clone())
        }
        StepArg::Dynamic(name) => resolve_name(name, frame, line)?,
        StepArg::Table(table) | StepArg::SpecialTable { table, .. } => {
            ResolvedValue::Table(resolve_table(table, frame, line)?)
        }
    };
    Ok(ResolvedParam {
        name: arg.name().to_owned(),
        kind: ParamKind::from(arg),
        value,
    })
}

fn resolve_name(name: &str, frame: &Frame<'_>, line: usize) -> Result<ResolvedValue, ArgumentError> {
    let unbound = || ArgumentError::Unbound {
        name: name.to_owned(),
        line,
    };
    match (frame.lookup.get(name), frame.parent) {
        (Some(bound), Some(parent)) => Ok(resolve_arg(bound, parent, line)?.value),
        (Some(StepArg::Dynamic(_)), None) => Err(unbound()),
        (Some(bound), None) => Ok(resolve_arg(bound, frame, line)?.value),
        (None, Some(parent)) => resolve_name(name, parent, line),
        (None, None) => Err(unbound()),
    }
}

fn resolve_table(table: &Table, frame: &Frame<'_>, line: usize) -> Result<ResolvedTable, ArgumentError> {
    let rows = (0..table.row_count())
        .map(|row| {
            table
                .row(row)
                .unwrap_or_default()
                .into_iter()
                .map(|cell| {
                    if cell.is_dynamic() {
                        match resolve_name(cell.value(), frame, line)? {
                            ResolvedValue::Text(text) => Ok(text),
                            ResolvedValue::Table(_) => Ok(format!("<{}>", cell.value())),
                        }
                    } else {
                        Ok(cell.value().to_owned())
                    }
                })
                .collect::<Result<Vec<_>, ArgumentError>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResolvedTable {
        headers: table.headers().to_vec(),
        rows,
    })
}
