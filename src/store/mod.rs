//! Mood storage collaborator.
//!
//! The importer only needs to read and write single (date, segment) records;
//! [`MoodStore`] is that narrow interface.

pub mod csv_store;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use csv_store::CsvMoodStore;

/// One of the three daily windows a mood is recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Morning,
    Midday,
    Evening,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Morning, Segment::Midday, Segment::Evening];

    pub fn index(self) -> u8 {
        match self {
            Segment::Morning => 0,
            Segment::Midday => 1,
            Segment::Evening => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Morning => "morning",
            Segment::Midday => "midday",
            Segment::Evening => "evening",
        };
        f.write_str(name)
    }
}

/// A persisted mood record for one (date, segment).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredMood {
    pub rating: Option<f64>,
    pub note: String,
}

pub trait MoodStore {
    fn load_mood(&self, date: NaiveDate, segment: Segment) -> Result<Option<StoredMood>, StoreError>;

    fn save_mood(
        &mut self,
        date: NaiveDate,
        segment: Segment,
        rating: Option<f64>,
        note: &str,
    ) -> Result<(), StoreError>;
}

/// Ordered in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<(NaiveDate, Segment), StoredMood>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: NaiveDate, segment: Segment) -> Option<&StoredMood> {
        self.records.get(&(date, segment))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Segment, &StoredMood)> {
        self.records.iter().map(|((d, s), m)| (*d, *s, m))
    }

    pub fn insert(&mut self, date: NaiveDate, segment: Segment, mood: StoredMood) {
        self.records.insert((date, segment), mood);
    }
}

impl MoodStore for MemoryStore {
    fn load_mood(&self, date: NaiveDate, segment: Segment) -> Result<Option<StoredMood>, StoreError> {
        Ok(self.records.get(&(date, segment)).cloned())
    }

    fn save_mood(
        &mut self,
        date: NaiveDate,
        segment: Segment,
        rating: Option<f64>,
        note: &str,
    ) -> Result<(), StoreError> {
        self.records.insert(
            (date, segment),
            StoredMood {
                rating,
                note: note.to_string(),
            },
        );
        Ok(())
    }
}
