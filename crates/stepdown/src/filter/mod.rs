//! Tag expressions and scenario selection.

mod scenario;
mod tags;

pub use scenario::{ScenarioFilter, filter_specs};
pub use tags::{TagExprError, TagFilter, sanitize_tag};
