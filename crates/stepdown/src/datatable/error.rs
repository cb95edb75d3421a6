//! Error types surfaced while building tables.

use thiserror::Error;

/// Errors that can arise when building a [`Table`](super::Table).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DataTableError {
    /// A header cell was empty.
    #[error("Table header should not be blank")]
    BlankHeader {
        /// 1-based column index of the blank cell.
        column_index: usize,
    },
    /// The header row repeats a column name.
    #[error("Table header cannot have repeated column values")]
    DuplicateHeader {
        /// The repeated column name.
        column: String,
    },
    /// CSV content had no header line.
    #[error("CSV data has no header row")]
    EmptyCsv,
    /// CSV content could not be read.
    #[error("invalid CSV data: {0}")]
    Csv(#[from] ::csv::Error),
}
