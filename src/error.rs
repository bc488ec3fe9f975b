use std::path::PathBuf;

use thiserror::Error;

use crate::importer::session::ImportStage;

/// Failure to read an A1-style reference or range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellRefError {
    #[error("Invalid cell reference: '{0}'")]
    InvalidReference(String),

    #[error("Invalid cell range: '{0}'")]
    InvalidRange(String),
}

/// Whole-file failures while turning input into a grid.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File is empty")]
    EmptyFile,

    #[error("Could not parse file with any CSV strategy: {0}")]
    UnparsableFile(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open workbook: {0}")]
    Workbook(String),

    #[error("No worksheets found in workbook")]
    NoWorksheets,
}

/// Failures raised by a mood storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid store record at line {line}: {msg}")]
    InvalidRecord { line: u64, msg: String },

    #[error("{0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    CellRef(#[from] CellRefError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid mapping: {0}")]
    Mapping(String),

    #[error("Import session cannot move from {from:?} to {to:?}")]
    InvalidStage { from: ImportStage, to: ImportStage },
}
