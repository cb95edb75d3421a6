//! Step-text parsing utilities for stepdown.
//!
//! The crate turns the text of a single step line into a canonical value plus
//! typed parameter descriptors. The parser crate uses the full descriptors to
//! build step arguments, while runner-facing tooling relies on the simpler
//! [`StepValue`] view and the argument reordering helper.

mod errors;
mod reorder;
mod step_text;
mod value;

pub use errors::StepTextError;
pub use reorder::arg_position_map;
pub use step_text::{PARAMETER_PLACEHOLDER, ProcessedStep, StepParam, process_step_text};
pub use value::{INLINE_TABLE_ARG, StepValue, extract_step_value};
