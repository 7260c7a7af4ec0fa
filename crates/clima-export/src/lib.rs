//! Flat tabular export of analysis results
//!
//! Every core result type flattens to rows of scalar fields through the
//! `Tabular` trait; `CsvSink` writes those rows out as one CSV file per
//! table. Structured (nested) access is covered by the `Serialize`
//! derives on the result types themselves.

pub mod tables;

pub use tables::*;

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Flat tabular form of a result type
///
/// Header and rows contain only scalar fields, so every implementor can
/// round-trip through CSV and simple table renderers.
pub trait Tabular {
    fn header(&self) -> Vec<&'static str>;
    fn rows(&self) -> Vec<Vec<String>>;
}

/// CSV file writer for tabular results
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> ExportResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Write one table to `<dir>/<name>.csv`
    pub fn write<T: Tabular + ?Sized>(&self, name: &str, table: &T) -> ExportResult<PathBuf> {
        let path = self.dir.join(format!("{}.csv", name));
        let mut writer = csv::Writer::from_path(&path)?;

        writer.write_record(table.header())?;
        for row in table.rows() {
            writer.write_record(&row)?;
        }
        writer.flush()?;

        tracing::debug!(path = %path.display(), "table exported");
        Ok(path)
    }
}
