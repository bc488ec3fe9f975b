//! Layout detection and extraction of candidate entries from a grid.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use tracing::debug;

use crate::importer::cell_ref::{CellRange, column_to_letters};
use crate::importer::date::parse_date;
use crate::importer::grid::Grid;
use crate::importer::mapping::MappingConfig;
use crate::importer::mood::parse_mood;
use crate::store::Segment;

/// Whether each day occupies a row or a column of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    RowBased,
    ColumnBased,
}

/// Row-based if the date range or any mood range spans more than one row.
pub fn classify(date_range: CellRange, mood_ranges: impl IntoIterator<Item = CellRange>) -> Layout {
    if date_range.spans_rows() || mood_ranges.into_iter().any(|r| r.spans_rows()) {
        Layout::RowBased
    } else {
        Layout::ColumnBased
    }
}

/// A day's worth of extracted values, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEntry {
    pub date: NaiveDate,
    moods: [Option<f64>; 3],
    notes: [Option<String>; 3],
}

impl CandidateEntry {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            moods: [None, None, None],
            notes: [None, None, None],
        }
    }

    pub fn with_mood(mut self, segment: Segment, mood: f64) -> Self {
        self.moods[usize::from(segment.index())] = Some(mood);
        self
    }

    pub fn with_notes(mut self, segment: Segment, notes: impl Into<String>) -> Self {
        self.notes[usize::from(segment.index())] = Some(notes.into());
        self
    }

    pub fn mood(&self, segment: Segment) -> Option<f64> {
        self.moods[usize::from(segment.index())]
    }

    pub fn notes(&self, segment: Segment) -> Option<&str> {
        self.notes[usize::from(segment.index())].as_deref()
    }

    pub fn has_mood(&self) -> bool {
        self.moods.iter().any(Option::is_some)
    }
}

/// Extraction output: retained entries plus per-row diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub entries: Vec<CandidateEntry>,
    pub diagnostics: Vec<String>,
    pub cancelled: bool,
}

/// Walk the configured ranges and collect entries carrying at least one mood.
///
/// Row-based sheets read every field from the date's row at the field range's
/// first column. Column-based sheets read each field from its range's row, at
/// the same offset from the range start as the date column has from the date
/// range start.
pub fn extract(grid: &Grid, config: &MappingConfig, cancel: Option<&AtomicBool>) -> Extraction {
    let layout = classify(config.date_range(), config.mood_ranges());
    debug!("Detected {layout:?} layout");
    match layout {
        Layout::RowBased => extract_rows(grid, config, cancel),
        Layout::ColumnBased => extract_columns(grid, config, cancel),
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

fn extract_rows(grid: &Grid, config: &MappingConfig, cancel: Option<&AtomicBool>) -> Extraction {
    let dates = config.date_range();
    let mut out = Extraction::default();

    for row in dates.start_row..=dates.end_row {
        if is_cancelled(cancel) {
            out.cancelled = true;
            break;
        }
        if row >= grid.row_count() {
            out.diagnostics.push(format!(
                "Rows {}-{}: beyond the end of the sheet ({} rows), skipped",
                row + 1,
                dates.end_row + 1,
                grid.row_count()
            ));
            break;
        }

        let date_text = grid.cell(row, dates.start_col);
        if date_text.is_empty() {
            debug!("Row {}: empty date cell, skipped", row + 1);
            continue;
        }
        let Some(date) = parse_date(date_text, config.date_format()) else {
            out.diagnostics
                .push(format!("Row {}: could not parse date '{}'", row + 1, date_text));
            continue;
        };

        let entry = read_entry(grid, config, date, |range| Some((row, range.start_col)));
        if entry.has_mood() {
            out.entries.push(entry);
        } else {
            debug!("Row {}: no mood values, skipped", row + 1);
        }
    }

    out
}

fn extract_columns(grid: &Grid, config: &MappingConfig, cancel: Option<&AtomicBool>) -> Extraction {
    let dates = config.date_range();
    let mut out = Extraction::default();

    for col in dates.start_col..=dates.end_col {
        if is_cancelled(cancel) {
            out.cancelled = true;
            break;
        }
        if col >= grid.col_count() {
            out.diagnostics.push(format!(
                "Columns {}-{}: beyond the end of the sheet ({} columns), skipped",
                column_to_letters(col),
                column_to_letters(dates.end_col),
                grid.col_count()
            ));
            break;
        }

        let date_text = grid.cell(dates.start_row, col);
        if date_text.is_empty() {
            debug!("Column {}: empty date cell, skipped", column_to_letters(col));
            continue;
        }
        let Some(date) = parse_date(date_text, config.date_format()) else {
            out.diagnostics.push(format!(
                "Column {}: could not parse date '{}'",
                column_to_letters(col),
                date_text
            ));
            continue;
        };

        let offset = col - dates.start_col;
        // a column past usize::MAX is simply outside the grid
        let entry = read_entry(grid, config, date, |range| {
            range
                .start_col
                .checked_add(offset)
                .map(|col| (range.start_row, col))
        });
        if entry.has_mood() {
            out.entries.push(entry);
        } else {
            debug!("Column {}: no mood values, skipped", column_to_letters(col));
        }
    }

    out
}

fn read_entry(
    grid: &Grid,
    config: &MappingConfig,
    date: NaiveDate,
    locate: impl Fn(CellRange) -> Option<(usize, usize)>,
) -> CandidateEntry {
    let cell = |range: Option<CellRange>| {
        range
            .and_then(&locate)
            .map_or("", |(row, col)| grid.cell(row, col))
    };

    let mut entry = CandidateEntry::new(date);
    for segment in Segment::ALL {
        if let Some(mood) = parse_mood(cell(config.mood_range(segment))) {
            entry = entry.with_mood(segment, mood);
        }
        let notes = cell(config.notes_range(segment));
        if !notes.is_empty() {
            entry = entry.with_notes(segment, notes);
        }
    }
    entry
}
