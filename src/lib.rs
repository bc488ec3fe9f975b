//! Import mood ratings from spreadsheets exported by other mood trackers.
//!
//! A [`MappingConfig`] names the ranges that hold dates, mood values and
//! notes; an [`ImportSession`] parses the file, extracts one candidate entry
//! per day and merges it into a [`MoodStore`] without overwriting ratings
//! that are already stored.

pub mod error;
pub mod importer;
pub mod store;

pub use error::{CellRefError, ImportError, ParseError, StoreError};
pub use importer::layout::{CandidateEntry, Layout};
pub use importer::mapping::{MappingConfig, MappingFile, MergePolicy};
pub use importer::merge::ImportReport;
pub use importer::session::{ImportSession, ImportStage};
pub use store::{CsvMoodStore, MemoryStore, MoodStore, Segment, StoredMood};
