pub mod cell_ref;
pub mod date;
pub mod grid;
pub mod layout;
pub mod mapping;
pub mod merge;
pub mod mood;
pub mod session;

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::ParseError;
use grid::Grid;

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Read a file into a [`Grid`], choosing the reader by extension.
pub fn read_grid(path: &Path) -> Result<Grid, ParseError> {
    if !path.exists() {
        return Err(ParseError::FileNotFound(path.to_path_buf()));
    }

    let is_workbook = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));

    if is_workbook {
        let rows = parse_workbook(path)?;
        if rows.iter().all(|r| r.iter().all(|c| c.trim().is_empty())) {
            return Err(ParseError::EmptyFile);
        }
        return Ok(Grid::from_rows(rows));
    }

    let bytes = std::fs::read(path)?;
    grid::parse(&String::from_utf8_lossy(&bytes))
}

/// Read the first worksheet of a workbook as rows of display strings.
///
/// Date cells become `yyyy-MM-dd` so they resolve with the first fallback format.
pub fn parse_workbook(path: &Path) -> Result<Vec<Vec<String>>, ParseError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ParseError::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .ok_or(ParseError::NoWorksheets)?
        .clone();
    debug!("Reading worksheet '{sheet_name}' from {}", path.display());

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    // calamine ranges start at the first used cell; pad so A1 stays at (0, 0).
    let (row_offset, col_offset) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_offset];
    rows.extend(range.rows().map(|row| {
        std::iter::repeat_n(String::new(), col_offset)
            .chain(row.iter().map(cell_to_string))
            .collect()
    }));

    Ok(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| naive.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(s) => s.split('T').next().unwrap_or_default().to_string(),
        Data::Empty => String::new(),
        _ => cell.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn test_missing_file() {
        let err = read_grid(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound(_)));
    }

    #[test]
    fn test_csv_file_is_read_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "2025-01-01,7\n2025-01-02,8,extra\n").unwrap();

        let grid = read_grid(&path).unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.cell(1, 2), "extra");
    }

    #[test]
    fn test_broken_workbook_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");
        std::fs::write(&path, "not a zip").unwrap();

        assert!(matches!(read_grid(&path), Err(ParseError::Workbook(_))));
    }

    #[test]
    fn test_cell_to_string() {
        // 45658 is 2025-01-01 in the 1900 date system
        let date = Data::DateTime(ExcelDateTime::new(
            45658.0,
            ExcelDateTimeType::DateTime,
            false,
        ));
        assert_eq!(cell_to_string(&date), "2025-01-01");
        assert_eq!(
            cell_to_string(&Data::DateTimeIso("2025-02-03T08:00:00".to_string())),
            "2025-02-03"
        );
        assert_eq!(cell_to_string(&Data::Float(7.5)), "7.5");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
