//! Unit tests for table storage and CSV loading.

use super::*;

fn table(headers: &[&str]) -> Table {
    match Table::with_headers(headers.iter().map(|h| (*h).to_owned()).collect(), 1) {
        Ok(table) => table,
        Err(err) => panic!("headers should be valid: {err}"),
    }
}

fn literal_row(values: &[&str]) -> Vec<TableCell> {
    values.iter().map(|v| TableCell::literal(*v)).collect()
}

#[test]
fn uninitialised_table_differs_from_empty_table() {
    let empty = table(&["id"]);
    assert!(empty.is_initialized());
    assert_eq!(empty.row_count(), 0);
    assert!(!Table::default().is_initialized());
}

#[test]
fn rejects_blank_and_duplicate_headers() {
    assert!(matches!(
        Table::with_headers(vec!["a".into(), String::new()], 1),
        Err(DataTableError::BlankHeader { column_index: 2 })
    ));
    assert!(matches!(
        Table::with_headers(vec!["a".into(), "a".into()], 1),
        Err(DataTableError::DuplicateHeader { column }) if column == "a"
    ));
}

#[test]
fn pads_short_rows_and_drops_extra_cells() {
    let mut t = table(&["a", "b"]);
    t.add_row(literal_row(&["1"]));
    t.add_row(literal_row(&["2", "3", "4"]));
    assert_eq!(t.rows(), vec![vec!["1".to_owned(), String::new()], vec![
        "2".to_owned(),
        "3".to_owned()
    ]]);
}

#[test]
fn detects_dynamic_references() {
    let mut t = table(&["user"]);
    t.add_row(vec![TableCell::dynamic("login")]);
    assert!(t.references_any(&["login".to_owned()]));
    assert!(!t.references_any(&["other".to_owned()]));
}

#[test]
fn loads_csv_with_header_row() {
    let t = match Table::from_csv("id, name\n1, alice\n2\n") {
        Ok(t) => t,
        Err(err) => panic!("csv should load: {err}"),
    };
    assert_eq!(t.headers(), ["id".to_owned(), "name".to_owned()]);
    assert_eq!(t.column_values("name"), Some(vec!["alice", ""]));
}

#[test]
fn csv_with_repeated_headers_is_rejected() {
    assert!(Table::from_csv("a,a\n1,2\n").is_err());
}
