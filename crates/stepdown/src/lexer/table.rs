//! Table-row helpers for the tokenizer.

/// Whether `line` looks like `| ... |`.
pub(crate) fn is_table_row(line: &str) -> bool {
    line.len() > 1 && line.starts_with('|') && line.ends_with('|')
}

/// Split a table row into trimmed cells, honouring `\|` escapes.
pub(crate) fn split_cells(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some(other) => {
                    cell.push('\\');
                    cell.push(other);
                }
                None => cell.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut cell).trim().to_owned()),
            other => cell.push(other),
        }
    }
    cells.push(cell.trim().to_owned());
    cells
}

/// Whether every non-empty cell is a run of `-`, with at least one such cell.
pub(crate) fn is_separator(cells: &[String]) -> bool {
    let mut non_empty = cells.iter().filter(|c| !c.is_empty()).peekable();
    non_empty.peek().is_some() && non_empty.all(|c| c.chars().all(|ch| ch == '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("|a|b|", &["a", "b"])]
    #[case("| spaced | out |", &["spaced", "out"])]
    #[case("|a \\| b|c|", &["a | b", "c"])]
    #[case("||", &[""])]
    fn splits_cells(#[case] line: &str, #[case] expected: &[&str]) {
        assert_eq!(split_cells(line), expected);
    }

    #[rstest]
    #[case(&["---", "--"], true)]
    #[case(&["---", ""], true)]
    #[case(&["", ""], false)]
    #[case(&["-x-"], false)]
    fn detects_separators(#[case] cells: &[&str], #[case] expected: bool) {
        let cells: Vec<String> = cells.iter().map(|c| (*c).to_owned()).collect();
        assert_eq!(is_separator(&cells), expected);
    }

    #[test]
    fn single_pipe_is_not_a_row() {
        assert!(!is_table_row("|"));
        assert!(is_table_row("|x|"));
    }
}
