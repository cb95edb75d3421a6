//! Ordered parameter bindings.
//!
//! An [`ArgLookup`] maps parameter names to optional bound arguments while
//! keeping declaration order. Concept invocations receive their own copy of
//! the concept's lookup, so cloning is always deep.

use hashbrown::HashMap;
use thiserror::Error;

use crate::datatable::Table;
use crate::step_args::StepArg;

/// Misuse of an [`ArgLookup`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// A value was bound to a name that was never declared.
    #[error("Accessing an invalid parameter ({name})")]
    UnknownParameter {
        /// The undeclared name.
        name: String,
    },
    /// A table row outside the table was requested.
    #[error("row {row} is out of range for a table with {rows} rows")]
    RowOutOfRange {
        /// Requested zero-based row.
        row: usize,
        /// Rows available.
        rows: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    name: String,
    value: Option<StepArg>,
}

/// Ordered name to argument bindings.
///
/// # Examples
/// ```
/// use stepdown::{ArgLookup, StepArg};
/// let mut lookup = ArgLookup::new();
/// lookup.add_name("user");
/// assert!(lookup.bind("user", StepArg::Static("sam".into())).is_ok());
/// assert!(lookup.bind("nobody", StepArg::Static("x".into())).is_err());
/// assert_eq!(lookup.get("user"), Some(&StepArg::Static("sam".into())));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgLookup {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl ArgLookup {
    /// An empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` as an unbound slot. Re-declaring a name is a no-op.
    pub fn add_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.index.contains_key(&name) {
            return;
        }
        self.index.insert(name.clone(), self.slots.len());
        self.slots.push(Slot { name, value: None });
    }

    /// Bind `value` to the declared `name`.
    ///
    /// # Errors
    /// Returns [`LookupError::UnknownParameter`] when `name` was never
    /// declared. Callers validate references before binding, so this signals
    /// internal misuse.
    pub fn bind(&mut self, name: &str, value: StepArg) -> Result<(), LookupError> {
        let slot = self
            .index
            .get(name)
            .and_then(|position| self.slots.get_mut(*position))
            .ok_or_else(|| LookupError::UnknownParameter {
                name: name.to_owned(),
            })?;
        slot.value = Some(value);
        Ok(())
    }

    /// Whether `name` was declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The value bound to `name`, if declared and bound.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StepArg> {
        let position = self.index.get(name)?;
        self.slots.get(*position)?.value.as_ref()
    }

    /// Declared names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name.as_str())
    }

    /// Number of declared names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no names are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Declare every header of `table`.
    pub fn add_headers(&mut self, table: &Table) {
        for header in table.headers() {
            self.add_name(header.as_str());
        }
    }

    /// A lookup declaring the headers of `table`, with nothing bound.
    #[must_use]
    pub fn from_table_headers(table: &Table) -> Self {
        let mut lookup = Self::new();
        lookup.add_headers(table);
        lookup
    }

    /// A lookup binding each header of `table` to its value in `row`.
    ///
    /// Dynamic cells referring to another column of the same row take that
    /// column's literal value.
    ///
    /// # Errors
    /// Returns [`LookupError::RowOutOfRange`] when `row` does not exist.
    pub fn from_table_row(table: &Table, row: usize) -> Result<Self, LookupError> {
        let mut lookup = Self::new();
        lookup.bind_table_row(table, row)?;
        Ok(lookup)
    }

    /// Declare the headers of `table` and bind them to `row`, keeping existing
    /// bindings for other names.
    ///
    /// # Errors
    /// Returns [`LookupError::RowOutOfRange`] when `row` does not exist.
    pub fn bind_table_row(&mut self, table: &Table, row: usize) -> Result<(), LookupError> {
        let cells = table.row(row).ok_or(LookupError::RowOutOfRange {
            row,
            rows: table.row_count(),
        })?;
        for (header, cell) in table.headers().iter().zip(&cells) {
            let value = if cell.is_dynamic() {
                table
                    .headers()
                    .iter()
                    .position(|h| h == cell.value())
                    .and_then(|position| cells.get(position))
                    .filter(|referenced| !referenced.is_dynamic())
                    .map_or_else(|| format!("<{}>", cell.value()), |c| c.value().to_owned())
            } else {
                cell.value().to_owned()
            };
            self.add_name(header.as_str());
            self.bind(header, StepArg::Static(value))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatable::TableCell;

    fn people() -> Table {
        let mut table = match Table::with_headers(vec!["id".into(), "name".into()], 1) {
            Ok(table) => table,
            Err(err) => panic!("headers should be valid: {err}"),
        };
        table.add_row(vec![TableCell::literal("1"), TableCell::literal("a")]);
        table.add_row(vec![TableCell::literal("2"), TableCell::dynamic("id")]);
        table
    }

    #[test]
    fn preserves_declaration_order_and_ignores_redeclaration() {
        let mut lookup = ArgLookup::new();
        lookup.add_name("b");
        lookup.add_name("a");
        lookup.add_name("b");
        assert_eq!(lookup.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn declared_but_unbound_names_return_none() {
        let lookup = ArgLookup::from_table_headers(&people());
        assert!(lookup.contains("id"));
        assert_eq!(lookup.get("id"), None);
    }

    #[test]
    fn row_binding_reads_back_in_column_order() {
        let table = people();
        let lookup = match ArgLookup::from_table_row(&table, 0) {
            Ok(lookup) => lookup,
            Err(err) => panic!("row 0 exists: {err}"),
        };
        let values: Vec<_> = lookup.names().filter_map(|n| lookup.get(n)).collect();
        assert_eq!(values, vec![
            &StepArg::Static("1".into()),
            &StepArg::Static("a".into())
        ]);
    }

    #[test]
    fn dynamic_row_cells_take_the_referenced_column() {
        let lookup = match ArgLookup::from_table_row(&people(), 1) {
            Ok(lookup) => lookup,
            Err(err) => panic!("row 1 exists: {err}"),
        };
        assert_eq!(lookup.get("name"), Some(&StepArg::Static("2".into())));
    }

    #[test]
    fn missing_row_is_reported() {
        assert_eq!(
            ArgLookup::from_table_row(&people(), 5),
            Err(LookupError::RowOutOfRange { row: 5, rows: 2 })
        );
    }

    #[test]
    fn clones_are_independent() {
        let mut original = ArgLookup::new();
        original.add_name("x");
        let mut copy = original.clone();
        assert!(copy.bind("x", StepArg::Static("1".into())).is_ok());
        assert_eq!(original.get("x"), None);
    }
}
