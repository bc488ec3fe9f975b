use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{MemoryStore, MoodStore, Segment, StoredMood};
use crate::error::StoreError;

#[derive(Debug, Serialize, Deserialize)]
struct MoodRecord {
    date: NaiveDate,
    segment: u8,
    rating: Option<f64>,
    note: String,
}

/// Mood store persisted as a CSV file with header `date,segment,rating,note`.
///
/// Records are held in memory; [`CsvMoodStore::flush`] rewrites the file.
#[derive(Debug)]
pub struct CsvMoodStore {
    path: PathBuf,
    records: MemoryStore,
    dirty: bool,
}

impl CsvMoodStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut records = MemoryStore::new();

        if path.exists() {
            let mut reader = csv::Reader::from_path(&path)?;
            for (i, result) in reader.deserialize::<MoodRecord>().enumerate() {
                let record = result?;
                let segment = Segment::from_index(record.segment).ok_or_else(|| {
                    StoreError::InvalidRecord {
                        // header is line 1
                        line: i as u64 + 2,
                        msg: format!("segment {} is not 0, 1 or 2", record.segment),
                    }
                })?;
                records.insert(
                    record.date,
                    segment,
                    StoredMood {
                        rating: record.rating,
                        note: record.note,
                    },
                );
            }
            debug!("Loaded {} mood records from {}", records.len(), path.display());
        }

        Ok(Self {
            path,
            records,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write all records, sorted by date then segment.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(&self.path)?;

        for (date, segment, mood) in self.records.iter() {
            writer.serialize(MoodRecord {
                date,
                segment: segment.index(),
                rating: mood.rating,
                note: mood.note.clone(),
            })?;
        }

        writer.flush()?;
        self.dirty = false;
        debug!("Wrote {} mood records to {}", self.records.len(), self.path.display());
        Ok(())
    }
}

impl MoodStore for CsvMoodStore {
    fn load_mood(&self, date: NaiveDate, segment: Segment) -> Result<Option<StoredMood>, StoreError> {
        self.records.load_mood(date, segment)
    }

    fn save_mood(
        &mut self,
        date: NaiveDate,
        segment: Segment,
        rating: Option<f64>,
        note: &str,
    ) -> Result<(), StoreError> {
        self.records.save_mood(date, segment, rating, note)?;
        self.dirty = true;
        Ok(())
    }
}
