//! Tables attached to steps and specifications.
//!
//! A [`Table`] stores ordered, unique headers and one column of typed cells
//! per header. A table without headers is *uninitialised*, which is distinct
//! from an initialised table holding no rows.

mod import;
mod error;
mod table;

pub use error::DataTableError;
pub use table::{CellKind, Table, TableCell};
pub(crate) use table::validate_headers;

#[cfg(test)]
mod tests;
