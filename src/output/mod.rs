//! Tabular result output.
//!
//! One CSV row per processed paper: `Year,Title,Authors,Abstract,PDF Link`.
//! [`ResultWriter`] owns the file; [`RecordSink`] runs it on a dedicated task
//! so concurrent workers submit rows through a channel instead of appending
//! to the file themselves.

mod sink;
mod writer;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use sink::{DEFAULT_CHANNEL_CAPACITY, RecordSender, RecordSink};
pub use writer::ResultWriter;

/// Errors raised while writing the result file.
#[derive(Debug, Error)]
pub enum WriteError {
    /// File system error opening or flushing the result file.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization error.
    #[error("CSV error on {path}: {source}")]
    Csv {
        /// The result file path.
        path: PathBuf,
        /// The underlying csv error.
        #[source]
        source: csv::Error,
    },

    /// The writer task is no longer accepting rows.
    #[error("result writer closed")]
    Closed,

    /// The writer task panicked or was cancelled.
    #[error("result writer task failed: {0}")]
    TaskFailed(String),
}

impl WriteError {
    /// Creates an IO error.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates a CSV error.
    pub fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}
