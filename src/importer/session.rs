//! One import run: parse, extract, merge.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::{info, warn};

use crate::error::{ImportError, ParseError};
use crate::importer::grid::{self, Grid};
use crate::importer::layout::{self, Extraction};
use crate::importer::mapping::{MappingConfig, MergePolicy};
use crate::importer::merge::{self, ImportReport};
use crate::importer::read_grid;
use crate::store::MoodStore;

/// Progress of an [`ImportSession`]. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Idle,
    Parsing,
    ParseFailed,
    Parsed,
    Extracting,
    Extracted,
    Merging,
    Completed,
}

impl ImportStage {
    fn can_advance_to(self, next: ImportStage) -> bool {
        use ImportStage::*;
        matches!(
            (self, next),
            (Idle, Parsing)
                | (Parsing, ParseFailed)
                | (Parsing, Parsed)
                | (Parsed, Extracting)
                | (Extracting, Extracted)
                | (Extracted, Merging)
                | (Merging, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ImportStage::ParseFailed | ImportStage::Completed)
    }
}

/// State for a single import run. Build a new session for every file.
#[derive(Debug)]
pub struct ImportSession {
    config: MappingConfig,
    policy: MergePolicy,
    stage: ImportStage,
    cancel: Option<Arc<AtomicBool>>,
    extraction: Option<Extraction>,
}

impl ImportSession {
    pub fn new(config: MappingConfig) -> Self {
        Self {
            config,
            policy: MergePolicy::default(),
            stage: ImportStage::Idle,
            cancel: None,
            extraction: None,
        }
    }

    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Flag checked before each row, column and merged entry.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// The extraction result, once the session has got that far.
    pub fn extraction(&self) -> Option<&Extraction> {
        self.extraction.as_ref()
    }

    /// Import CSV text.
    pub fn run_text<S: MoodStore + ?Sized>(
        &mut self,
        contents: &str,
        store: &mut S,
    ) -> Result<ImportReport, ImportError> {
        self.run_with(|| grid::parse(contents), store)
    }

    /// Import a file; spreadsheets are read by extension, anything else as CSV.
    pub fn run_path<S: MoodStore + ?Sized>(
        &mut self,
        path: &Path,
        store: &mut S,
    ) -> Result<ImportReport, ImportError> {
        self.run_with(|| read_grid(path), store)
    }

    /// Import an already-parsed grid.
    pub fn run_grid<S: MoodStore + ?Sized>(
        &mut self,
        grid: Grid,
        store: &mut S,
    ) -> Result<ImportReport, ImportError> {
        self.run_with(|| Ok(grid), store)
    }

    fn run_with<S: MoodStore + ?Sized>(
        &mut self,
        load: impl FnOnce() -> Result<Grid, ParseError>,
        store: &mut S,
    ) -> Result<ImportReport, ImportError> {
        self.advance(ImportStage::Parsing)?;

        if !self.config.has_any_mood() {
            self.advance(ImportStage::ParseFailed)?;
            return Ok(ImportReport::failed("No mood ranges are configured"));
        }

        let grid = match load() {
            Ok(grid) if grid.is_empty() => {
                self.advance(ImportStage::ParseFailed)?;
                return Ok(ImportReport::failed(ParseError::EmptyFile.to_string()));
            }
            Ok(grid) => grid,
            Err(e) => {
                warn!("Import failed while parsing: {e}");
                self.advance(ImportStage::ParseFailed)?;
                return Ok(ImportReport::failed(e.to_string()));
            }
        };
        self.advance(ImportStage::Parsed)?;
        info!(
            "Parsed grid with {} rows and {} columns",
            grid.row_count(),
            grid.col_count()
        );

        self.advance(ImportStage::Extracting)?;
        let extraction = layout::extract(&grid, &self.config, self.cancel.as_deref());
        self.advance(ImportStage::Extracted)?;
        info!(
            "Extracted {} candidate entries ({} diagnostics)",
            extraction.entries.len(),
            extraction.diagnostics.len()
        );

        self.advance(ImportStage::Merging)?;
        let mut report = merge::merge(
            &extraction.entries,
            store,
            self.policy,
            self.cancel.as_deref(),
        );
        let mut errors = extraction.diagnostics.clone();
        if extraction.cancelled {
            errors.push("Import cancelled before all rows were read".to_string());
        }
        errors.append(&mut report.errors);
        report.errors = errors;
        self.extraction = Some(extraction);
        self.advance(ImportStage::Completed)?;

        info!(
            "Import complete: {} imported, {} skipped, {} total",
            report.imported, report.skipped, report.total
        );
        Ok(report)
    }

    fn advance(&mut self, next: ImportStage) -> Result<(), ImportError> {
        if !self.stage.can_advance_to(next) {
            return Err(ImportError::InvalidStage {
                from: self.stage,
                to: next,
            });
        }
        self.stage = next;
        Ok(())
    }
}
