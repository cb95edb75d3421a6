//! Loading tables from CSV text.

use super::{DataTableError, Table, TableCell};

impl Table {
    /// Parse CSV text whose first record holds the headers.
    ///
    /// Fields are trimmed and every cell is literal. Records shorter than the
    /// header row are padded.
    ///
    /// # Errors
    /// Returns [`DataTableError`] for malformed CSV, missing or invalid
    /// headers.
    pub fn from_csv(text: &str) -> Result<Self, DataTableError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(::csv::Trim::All)
            .from_reader(text.as_bytes());
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
        if headers.is_empty() {
            return Err(DataTableError::EmptyCsv);
        }
        let mut table = Self::with_headers(headers, 0)?;
        for record in reader.records() {
            let record = record?;
            table.add_row(record.iter().map(TableCell::literal).collect());
        }
        Ok(table)
    }
}
