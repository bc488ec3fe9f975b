//! A1-style cell references.
//!
//! Converts spreadsheet notation ("A1", "B5:D5", "AA10") to zero-based
//! row/column coordinates and back.

use std::fmt;
use std::str::FromStr;

use crate::error::CellRefError;

/// A single cell, zero-based on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

/// A rectangular block of cells with inclusive bounds.
///
/// `start_row <= end_row` and `start_col <= end_col` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl CellRange {
    /// Range covering the two corners, in whichever order they were given.
    pub fn spanning(a: CellRef, b: CellRef) -> Self {
        Self {
            start_row: a.row.min(b.row),
            start_col: a.col.min(b.col),
            end_row: a.row.max(b.row),
            end_col: a.col.max(b.col),
        }
    }

    pub fn single(cell: CellRef) -> Self {
        Self::spanning(cell, cell)
    }

    pub fn spans_rows(&self) -> bool {
        self.end_row != self.start_row
    }

    pub fn start(&self) -> CellRef {
        CellRef {
            row: self.start_row,
            col: self.start_col,
        }
    }

    pub fn end(&self) -> CellRef {
        CellRef {
            row: self.end_row,
            col: self.end_col,
        }
    }
}

/// Parse "B3" into `{ row: 2, col: 1 }`. Input is trimmed and upper-cased first.
pub fn parse_reference(text: &str) -> Result<CellRef, CellRefError> {
    let normalized = text.trim().to_ascii_uppercase();
    let invalid = || CellRefError::InvalidReference(text.to_string());

    let split = normalized
        .find(|c: char| !c.is_ascii_uppercase())
        .ok_or_else(invalid)?;
    let (letters, digits) = normalized.split_at(split);
    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let col = letters_to_column(letters).ok_or_else(invalid)?;
    let row = digits
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(invalid)?;

    Ok(CellRef { row, col })
}

/// Parse either a single reference or `REF:REF`.
pub fn parse_range(text: &str) -> Result<CellRange, CellRefError> {
    let parts: Vec<&str> = text.split(':').collect();
    let invalid = |_| CellRefError::InvalidRange(text.to_string());

    match parts.as_slice() {
        [single] => parse_reference(single).map(CellRange::single).map_err(invalid),
        [start, end] => {
            let start = parse_reference(start).map_err(invalid)?;
            let end = parse_reference(end).map_err(invalid)?;
            Ok(CellRange::spanning(start, end))
        }
        _ => Err(CellRefError::InvalidRange(text.to_string())),
    }
}

/// Bijective base-26 column letters to a zero-based index ("A" -> 0, "AA" -> 26).
///
/// Returns `None` for empty input, non-letters, or overflow.
pub fn letters_to_column(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    // u128 so the bijective value of usize::MAX (usize::MAX + 1) still fits
    let mut acc = 0u128;
    for b in letters.bytes() {
        let b = b.to_ascii_uppercase();
        if !b.is_ascii_uppercase() {
            return None;
        }
        let digit = u128::from(b - b'A') + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    usize::try_from(acc - 1).ok()
}

/// Zero-based column index to letters (0 -> "A", 25 -> "Z", 26 -> "AA").
pub fn column_to_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index as u128 + 1;
    while n > 0 {
        n -= 1;
        // n % 26 < 26, fits in u8
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

impl FromStr for CellRef {
    type Err = CellRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_reference(s)
    }
}

impl FromStr for CellRange {
    type Err = CellRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_range(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start() == self.end() {
            write!(f, "{}", self.start())
        } else {
            write!(f, "{}:{}", self.start(), self.end())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A1", 0, 0)]
    #[case("B3", 2, 1)]
    #[case("Z10", 9, 25)]
    #[case("AA1", 0, 26)]
    #[case("AZ7", 6, 51)]
    #[case("  c5 ", 4, 2)]
    fn test_parse_reference(#[case] text: &str, #[case] row: usize, #[case] col: usize) {
        assert_eq!(parse_reference(text), Ok(CellRef { row, col }));
    }

    #[rstest]
    #[case("")]
    #[case("A")]
    #[case("12")]
    #[case("A0")]
    #[case("1A")]
    #[case("A1B")]
    #[case("A-1")]
    #[case("A 1")]
    fn test_parse_reference_rejects(#[case] text: &str) {
        assert_eq!(
            parse_reference(text),
            Err(CellRefError::InvalidReference(text.to_string()))
        );
    }

    #[test]
    fn test_parse_reference_overflow() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(parse_reference(&huge).is_err());
    }

    #[test]
    fn test_parse_range() {
        let range = parse_range("B5:D5").unwrap();
        assert_eq!(
            range,
            CellRange {
                start_row: 4,
                start_col: 1,
                end_row: 4,
                end_col: 3
            }
        );
        assert!(!range.spans_rows());

        let single = parse_range("C2").unwrap();
        assert_eq!(single.start(), single.end());
        assert_eq!(single.to_string(), "C2");
    }

    #[test]
    fn test_parse_range_normalizes_reversed_corners() {
        let range = parse_range("D8:B2").unwrap();
        assert_eq!(range.start(), CellRef { row: 1, col: 1 });
        assert_eq!(range.end(), CellRef { row: 7, col: 3 });
        assert_eq!(range.to_string(), "B2:D8");
    }

    #[rstest]
    #[case("A1:")]
    #[case(":A1")]
    #[case("A1:B2:C3")]
    #[case("A1-B2")]
    fn test_parse_range_rejects(#[case] text: &str) {
        assert_eq!(
            parse_range(text),
            Err(CellRefError::InvalidRange(text.to_string()))
        );
    }

    #[test]
    fn test_column_letters_round_trip() {
        for n in (0..20_000).chain([usize::MAX / 2, usize::MAX - 1, usize::MAX]) {
            let letters = column_to_letters(n);
            assert_eq!(letters_to_column(&letters), Some(n), "column {n} ({letters})");
        }
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(25), "Z");
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(701), "ZZ");
        assert_eq!(column_to_letters(702), "AAA");
        assert_eq!(letters_to_column(&format!("{}A", column_to_letters(usize::MAX))), None);
    }

    #[test]
    fn test_reference_round_trip() {
        for row in [0usize, 1, 9, 99, 4095] {
            for col in [0usize, 1, 25, 26, 700, 16_383] {
                let text = format!("{}{}", column_to_letters(col), row + 1);
                assert_eq!(parse_reference(&text), Ok(CellRef { row, col }));
            }
        }
    }
}
