//! Append-only CSV result file.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::debug;

use super::WriteError;
use crate::model::PaperRecord;

/// Appends [`PaperRecord`] rows to a CSV file.
///
/// The header row is written only when the file is new or empty, so
/// re-opening an existing result file never duplicates it. Every row is
/// flushed as soon as it is written.
#[derive(Debug)]
pub struct ResultWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl ResultWriter {
    /// Opens (or creates) the result file at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the directory or file cannot be created, or the
    /// header cannot be written.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| WriteError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| WriteError::io(&path, e))?;
        let is_empty = file
            .metadata()
            .map_err(|e| WriteError::io(&path, e))?
            .len()
            == 0;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_empty {
            debug!(path = %path.display(), "writing CSV header");
            writer
                .write_record(PaperRecord::HEADER)
                .map_err(|e| WriteError::csv(&path, e))?;
            writer.flush().map_err(|e| WriteError::io(&path, e))?;
        }

        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    /// Appends one row and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the row cannot be written.
    pub fn append(&mut self, record: &PaperRecord) -> Result<(), WriteError> {
        self.writer
            .write_record(record.fields())
            .map_err(|e| WriteError::csv(&self.path, e))?;
        self.writer
            .flush()
            .map_err(|e| WriteError::io(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Number of rows appended through this writer.
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Path of the result file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
