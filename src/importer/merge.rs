//! No-overwrite merge of candidate entries into a mood store.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::importer::layout::CandidateEntry;
use crate::importer::mapping::MergePolicy;
use crate::store::{MoodStore, Segment};

/// Result of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// False only for whole-file failures.
    pub success: bool,
    /// Segments whose rating was written.
    pub imported: usize,
    /// Segments left alone because a rating was already stored.
    pub skipped: usize,
    /// Segments that only received a note.
    pub notes_attached: usize,
    /// Candidate entries produced by extraction.
    pub total: usize,
    pub errors: Vec<String>,
    pub error: Option<String>,
}

impl ImportReport {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Merge every mood-bearing segment of `candidates` into `store`.
///
/// Stored ratings are never overwritten. A failure on one segment is recorded
/// in `errors` and the remaining segments are still merged.
pub fn merge<S: MoodStore + ?Sized>(
    candidates: &[CandidateEntry],
    store: &mut S,
    policy: MergePolicy,
    cancel: Option<&AtomicBool>,
) -> ImportReport {
    let mut report = ImportReport {
        success: true,
        total: candidates.len(),
        ..ImportReport::default()
    };

    'entries: for entry in candidates {
        for segment in Segment::ALL {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                report.errors.push("Import cancelled before all entries were merged".to_string());
                break 'entries;
            }

            let result = match entry.mood(segment) {
                Some(rating) => merge_rating(store, entry, segment, rating, &mut report),
                None if policy.attach_notes_without_mood => match entry.notes(segment) {
                    Some(notes) => attach_notes(store, entry, segment, notes, &mut report),
                    None => Ok(()),
                },
                None => Ok(()),
            };

            if let Err(e) = result {
                warn!("Failed to merge {} {}: {e}", entry.date, segment);
                report
                    .errors
                    .push(format!("{} ({}): {}", entry.date, segment, e));
            }
        }
    }

    debug!(
        "Merged {} entries: {} imported, {} skipped",
        report.total, report.imported, report.skipped
    );
    report
}

fn merge_rating<S: MoodStore + ?Sized>(
    store: &mut S,
    entry: &CandidateEntry,
    segment: Segment,
    rating: f64,
    report: &mut ImportReport,
) -> Result<(), StoreError> {
    let existing = store.load_mood(entry.date, segment)?;

    if existing.as_ref().is_some_and(|m| m.rating.is_some()) {
        report.skipped += 1;
        return Ok(());
    }

    let note = entry
        .notes(segment)
        .map(str::to_string)
        .or_else(|| existing.map(|m| m.note))
        .unwrap_or_default();
    store.save_mood(entry.date, segment, Some(rating), &note)?;
    report.imported += 1;
    Ok(())
}

fn attach_notes<S: MoodStore + ?Sized>(
    store: &mut S,
    entry: &CandidateEntry,
    segment: Segment,
    notes: &str,
    report: &mut ImportReport,
) -> Result<(), StoreError> {
    let existing = store.load_mood(entry.date, segment)?;

    if existing.is_some_and(|m| m.rating.is_some() || !m.note.is_empty()) {
        return Ok(());
    }

    store.save_mood(entry.date, segment, None, notes)?;
    report.notes_attached += 1;
    Ok(())
}
