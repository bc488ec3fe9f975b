//! Which ranges of the sheet hold which mood fields.

use serde::{Deserialize, Serialize};

use crate::error::{CellRefError, ImportError};
use crate::importer::cell_ref::{CellRange, parse_range};
use crate::store::Segment;

/// Validated range configuration that drives one import run.
///
/// Every range is parsed when it is set, so a malformed range is rejected
/// before any file is read.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    date_range: CellRange,
    date_format: String,
    moods: [Option<CellRange>; 3],
    notes: [Option<CellRange>; 3],
}

impl MappingConfig {
    pub fn new(date_range: &str, date_format: impl Into<String>) -> Result<Self, CellRefError> {
        Ok(Self {
            date_range: parse_range(date_range)?,
            date_format: date_format.into(),
            moods: [None; 3],
            notes: [None; 3],
        })
    }

    pub fn with_mood(mut self, segment: Segment, range: &str) -> Result<Self, CellRefError> {
        self.moods[usize::from(segment.index())] = Some(parse_range(range)?);
        Ok(self)
    }

    pub fn with_notes(mut self, segment: Segment, range: &str) -> Result<Self, CellRefError> {
        self.notes[usize::from(segment.index())] = Some(parse_range(range)?);
        Ok(self)
    }

    pub fn date_range(&self) -> CellRange {
        self.date_range
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn mood_range(&self, segment: Segment) -> Option<CellRange> {
        self.moods[usize::from(segment.index())]
    }

    pub fn notes_range(&self, segment: Segment) -> Option<CellRange> {
        self.notes[usize::from(segment.index())]
    }

    /// Configured mood ranges, in segment order.
    pub fn mood_ranges(&self) -> impl Iterator<Item = CellRange> + '_ {
        self.moods.iter().flatten().copied()
    }

    pub fn has_any_mood(&self) -> bool {
        self.moods.iter().any(Option::is_some)
    }
}

/// Serialized mapping, as stored in a JSON mapping file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingFile {
    pub date_range: String,
    pub date_format: String,
    pub morning: Option<String>,
    pub midday: Option<String>,
    pub evening: Option<String>,
    pub morning_notes: Option<String>,
    pub midday_notes: Option<String>,
    pub evening_notes: Option<String>,
    pub attach_notes_without_mood: bool,
}

impl MappingFile {
    pub fn from_json(text: &str) -> Result<Self, ImportError> {
        serde_json::from_str(text).map_err(|e| ImportError::Mapping(e.to_string()))
    }

    pub fn policy(&self) -> MergePolicy {
        MergePolicy {
            attach_notes_without_mood: self.attach_notes_without_mood,
        }
    }
}

impl TryFrom<MappingFile> for MappingConfig {
    type Error = ImportError;

    fn try_from(file: MappingFile) -> Result<Self, Self::Error> {
        if file.date_range.trim().is_empty() {
            return Err(ImportError::Mapping("a date range is required".to_string()));
        }

        let mut config = MappingConfig::new(&file.date_range, file.date_format)?;
        let moods = [file.morning, file.midday, file.evening];
        let notes = [file.morning_notes, file.midday_notes, file.evening_notes];

        for (segment, (mood, note)) in Segment::ALL.into_iter().zip(moods.into_iter().zip(notes)) {
            if let Some(range) = mood.filter(|r| !r.trim().is_empty()) {
                config = config.with_mood(segment, &range)?;
            }
            if let Some(range) = note.filter(|r| !r.trim().is_empty()) {
                config = config.with_notes(segment, &range)?;
            }
        }

        Ok(config)
    }
}

/// How candidate entries are merged into existing records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergePolicy {
    /// Save notes for a segment that has notes but no mood value, as long as
    /// the stored record has neither a rating nor a note.
    pub attach_notes_without_mood: bool,
}
