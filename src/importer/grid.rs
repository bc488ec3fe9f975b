//! Tabular parser: raw file text to a rectangular grid of trimmed string cells.
//!
//! Decoding is attempted with three strategies in order: strict CSV, permissive
//! CSV, and a hand-rolled quote-aware scanner that keeps multi-line fields
//! together even when the quoting would defeat a CSV reader.

use std::fmt;

use tracing::{debug, warn};

use crate::error::ParseError;
use crate::importer::cell_ref::column_to_letters;

/// Rows of string cells, padded so every row has the same width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl Grid {
    /// Build a grid from ragged rows: cells are trimmed and short rows padded.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.into_iter().map(|c| c.trim().to_string()).collect();
                cells.resize(width, String::new());
                cells
            })
            .collect();
        Self { rows, width }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text, or `""` when the position lies outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl fmt::Display for Grid {
    /// A1-labelled dump, used by the `inspect` command.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}", "")?;
        for col in 0..self.width {
            write!(f, " | {}", column_to_letters(col))?;
        }
        writeln!(f)?;
        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{:>5}", i + 1)?;
            for cell in row {
                write!(f, " | {}", cell.replace('\n', "\\n"))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A way of decoding CSV text, tried in the order given to [`parse_with_strategies`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Strict,
    Permissive,
    Manual,
}

/// Strict, permissive, then manual scanning.
pub const ALL_STRATEGIES: [Strategy; 3] = [Strategy::Strict, Strategy::Permissive, Strategy::Manual];

/// Decode CSV text into a [`Grid`], falling back through all strategies.
pub fn parse(contents: &str) -> Result<Grid, ParseError> {
    parse_with_strategies(contents, &ALL_STRATEGIES)
}

/// Decode with each strategy in turn; the first one yielding rows wins.
pub fn parse_with_strategies(contents: &str, strategies: &[Strategy]) -> Result<Grid, ParseError> {
    if contents.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let mut last_error = String::from("no decoding strategy was attempted");
    for &strategy in strategies {
        let result = match strategy {
            Strategy::Strict => parse_csv(contents, false).map_err(|e| e.to_string()),
            Strategy::Permissive => parse_csv(contents, true).map_err(|e| e.to_string()),
            Strategy::Manual => Some(tokenize(contents))
                .filter(|rows| !rows.is_empty())
                .ok_or_else(|| "no rows could be recovered".to_string()),
        };

        match result {
            Ok(rows) => {
                debug!("{strategy:?} decoding produced {} rows", rows.len());
                return Ok(Grid::from_rows(rows));
            }
            Err(e) => {
                warn!("{strategy:?} decoding failed: {e}");
                last_error = e;
            }
        }
    }

    Err(ParseError::UnparsableFile(last_error))
}

fn parse_csv(contents: &str, flexible: bool) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(flexible)
        .from_reader(contents.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "no records",
        )));
    }
    Ok(rows)
}

/// Quote-aware line scanner.
///
/// Every `"` toggles the in-quotes flag and is dropped. Commas split fields
/// and line ends split rows only outside quotes; a line end inside quotes is
/// kept as `\n` in the field and the row continues on the next line. Rows
/// whose fields are all blank are discarded.
///
/// This is the last fallback of [`parse`]; the permissive csv reader accepts
/// almost any `&str`, so it is rarely handed off to in practice.
pub fn tokenize(contents: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for line in contents.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        for c in line.chars() {
            match c {
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }

        if in_quotes {
            current.push('\n');
            continue;
        }

        fields.push(std::mem::take(&mut current));
        push_row(&mut rows, std::mem::take(&mut fields));
    }

    // Unterminated quote at end of input: keep what was collected.
    if in_quotes {
        if current.ends_with('\n') {
            current.pop();
        }
        fields.push(current);
        push_row(&mut rows, fields);
    }

    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, fields: Vec<String>) {
    if fields.iter().any(|f| !f.trim().is_empty()) {
        rows.push(fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_empty_file() {
        assert!(matches!(parse(""), Err(ParseError::EmptyFile)));
        assert!(matches!(parse("  \n\t\n"), Err(ParseError::EmptyFile)));
    }

    #[test]
    fn test_parse_pads_and_trims() {
        let grid = parse("a, b ,c\n d\n").unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.rows()[0], strings(&["a", "b", "c"]));
        assert_eq!(grid.rows()[1], strings(&["d", "", ""]));
    }

    #[test]
    fn test_parse_keeps_quoted_multiline_field() {
        let grid = parse("2025-01-01,\"line one\nline two\",7\n2025-01-02,x,8\n").unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.cell(0, 1), "line one\nline two");
        assert_eq!(grid.cell(1, 2), "8");
    }

    #[test]
    fn test_cell_out_of_bounds_is_empty() {
        let grid = parse("a,b\n").unwrap();
        assert_eq!(grid.cell(0, 1), "b");
        assert_eq!(grid.cell(0, 9), "");
        assert_eq!(grid.cell(9, 0), "");
    }

    #[test]
    fn test_tokenize_embedded_newline_is_one_row() {
        let rows = tokenize("\"line one\nline two\"");
        assert_eq!(rows, vec![strings(&["line one\nline two"])]);
    }

    #[test]
    fn test_tokenize_commas_inside_quotes() {
        let rows = tokenize("a,\"b, c\",d\r\ne,f,g\r\n");
        assert_eq!(rows, vec![strings(&["a", "b, c", "d"]), strings(&["e", "f", "g"])]);
    }

    #[test]
    fn test_tokenize_discards_blank_rows() {
        let rows = tokenize("a,b\n , \n\nc,d\n");
        assert_eq!(rows, vec![strings(&["a", "b"]), strings(&["c", "d"])]);
    }

    #[test]
    fn test_tokenize_unterminated_quote_keeps_tail() {
        let rows = tokenize("a,\"open\nstill open");
        assert_eq!(rows, vec![strings(&["a", "open\nstill open"])]);
    }

    #[test]
    fn test_tokenize_drops_quote_characters() {
        let rows = tokenize("say \"\"hi\"\",x");
        assert_eq!(rows, vec![strings(&["say hi", "x"])]);
    }

    #[test]
    fn test_strict_failure_falls_back_to_manual_scan() {
        // ragged rows fail strict decoding
        let grid = parse_with_strategies(
            "a,\"b\nc\",d\ne\n",
            &[Strategy::Strict, Strategy::Manual],
        )
        .unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.cell(0, 1), "b\nc");
        assert_eq!(grid.rows()[1], strings(&["e", "", ""]));
    }

    #[test]
    fn test_unrecoverable_input_is_unparsable() {
        let err = parse_with_strategies("x,y\nz\n", &[Strategy::Strict]).unwrap_err();
        assert!(matches!(err, ParseError::UnparsableFile(_)));

        let err = parse_with_strategies("q", &[]).unwrap_err();
        assert!(matches!(err, ParseError::UnparsableFile(_)));

        let err = parse_with_strategies("\"\",\"\"\n , ", &[Strategy::Manual]).unwrap_err();
        assert!(matches!(err, ParseError::UnparsableFile(_)));
    }

    #[test]
    fn test_display_labels_columns_and_rows() {
        let grid = Grid::from_rows(vec![strings(&["x", "y"])]);
        let text = grid.to_string();
        assert!(text.contains("| A | B"));
        assert!(text.contains("    1 | x | y"));
    }
}
