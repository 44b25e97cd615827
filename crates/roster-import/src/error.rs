//! Error types for `roster-import`.
//!
//! Only problems with the source as a whole are errors; per-row problems end
//! up in the [`crate::ImportReport`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("import source not found: {}", .0.display())]
  SourceNotFound(PathBuf),

  #[error("failed to read import source: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed CSV header: {0}")]
  Csv(#[from] csv::Error),

  #[error("failed to read spreadsheet: {0}")]
  Sheet(#[from] calamine::Error),

  #[error("spreadsheet has no worksheet: {}", .0.display())]
  EmptyWorkbook(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
