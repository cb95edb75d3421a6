//! Column-oriented table storage.

use hashbrown::HashMap;

use super::error::DataTableError;

/// How a cell's text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellKind {
    /// Literal text.
    #[default]
    Static,
    /// A `<name>` reference resolved against a data-table column or concept
    /// parameter.
    Dynamic,
}

/// One table cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableCell {
    value: String,
    kind: CellKind,
}

impl TableCell {
    /// A literal cell.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: CellKind::Static,
        }
    }

    /// A cell referencing the parameter `name`.
    #[must_use]
    pub fn dynamic(name: impl Into<String>) -> Self {
        Self {
            value: name.into(),
            kind: CellKind::Dynamic,
        }
    }

    /// Cell text, or the referenced name for dynamic cells.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cell interpretation.
    #[must_use]
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Whether the cell references a parameter.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.kind == CellKind::Dynamic
    }
}

/// Ordered headers and per-column cells.
///
/// # Examples
/// ```
/// use stepdown::{Table, TableCell};
/// let mut table = Table::with_headers(vec!["id".into(), "name".into()], 1).unwrap_or_default();
/// table.add_row(vec![TableCell::literal("1"), TableCell::literal("a")]);
/// assert_eq!(table.row_count(), 1);
/// assert_eq!(table.column_values("name"), Some(vec!["a"]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    columns: Vec<Vec<TableCell>>,
    line: usize,
}

/// Check a header row for blank or repeated names.
pub(crate) fn validate_headers<S: AsRef<str>>(headers: &[S]) -> Result<(), DataTableError> {
    let mut seen = HashMap::with_capacity(headers.len());
    for (position, header) in headers.iter().enumerate() {
        let header = header.as_ref();
        if header.is_empty() {
            return Err(DataTableError::BlankHeader {
                column_index: position + 1,
            });
        }
        if seen.insert(header, position).is_some() {
            return Err(DataTableError::DuplicateHeader {
                column: header.to_owned(),
            });
        }
    }
    Ok(())
}

impl Table {
    /// Create an initialised table with no rows, declared at `line`.
    ///
    /// # Errors
    /// Returns [`DataTableError`] when a header is blank or repeated.
    pub fn with_headers(headers: Vec<String>, line: usize) -> Result<Self, DataTableError> {
        validate_headers(&headers)?;
        let index = headers
            .iter()
            .enumerate()
            .map(|(position, header)| (header.clone(), position))
            .collect();
        let columns = vec![Vec::new(); headers.len()];
        Ok(Self {
            headers,
            index,
            columns,
            line,
        })
    }

    /// Whether the table has headers.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.headers.is_empty()
    }

    /// Column headers in declaration order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Line of the header row, or 0 for tables loaded from elsewhere.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Append a row, padding short rows with empty cells and dropping extras.
    ///
    /// Rows added to an uninitialised table are ignored.
    pub fn add_row(&mut self, cells: Vec<TableCell>) {
        let mut cells = cells.into_iter();
        for column in &mut self.columns {
            column.push(cells.next().unwrap_or_default());
        }
    }

    /// Number of data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// The cells of column `header`.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&[TableCell]> {
        let position = self.index.get(header)?;
        self.columns.get(*position).map(Vec::as_slice)
    }

    /// The text of column `header`, top to bottom.
    #[must_use]
    pub fn column_values(&self, header: &str) -> Option<Vec<&str>> {
        self.get(header)
            .map(|cells| cells.iter().map(TableCell::value).collect())
    }

    /// The cells of row `row` in column order.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<Vec<&TableCell>> {
        self.columns
            .iter()
            .map(|column| column.get(row))
            .collect::<Option<Vec<_>>>()
            .filter(|cells| !cells.is_empty())
    }

    /// All rows as text.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<String>> {
        (0..self.row_count())
            .filter_map(|row| self.row(row))
            .map(|cells| cells.into_iter().map(|c| c.value().to_owned()).collect())
            .collect()
    }

    /// Every cell, column by column.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.columns.iter().flatten()
    }

    /// Whether any cell references one of `names`.
    #[must_use]
    pub fn references_any(&self, names: &[String]) -> bool {
        self.cells()
            .any(|cell| cell.is_dynamic() && names.iter().any(|n| n == cell.value()))
    }
}
