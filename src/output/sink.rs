//! Single-writer task that owns the result file.
//!
//! Workers never touch the CSV file directly. They push rows into a bounded
//! channel through a [`RecordSender`]; one blocking task drains the channel and
//! appends each row with [`ResultWriter::append`], so rows can never interleave.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{ResultWriter, WriteError};
use crate::model::PaperRecord;

/// Default number of rows buffered between workers and the writer task.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Cloneable handle for submitting rows to the writer task.
#[derive(Debug, Clone)]
pub struct RecordSender {
    tx: mpsc::Sender<PaperRecord>,
}

impl RecordSender {
    /// Queues a row for writing, waiting if the channel is full.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Closed`] if the writer task has stopped.
    pub async fn send(&self, record: PaperRecord) -> Result<(), WriteError> {
        self.tx.send(record).await.map_err(|_| WriteError::Closed)
    }
}

/// Owner of the writer task; resolves to the row count once all senders drop.
#[derive(Debug)]
pub struct RecordSink {
    handle: JoinHandle<Result<usize, WriteError>>,
}

impl RecordSink {
    /// Moves `writer` onto a blocking task and returns the submission handle.
    #[must_use]
    pub fn spawn(writer: ResultWriter, capacity: usize) -> (RecordSender, Self) {
        let (tx, mut rx) = mpsc::channel::<PaperRecord>(capacity.max(1));

        let handle = tokio::task::spawn_blocking(move || {
            let mut writer = writer;
            while let Some(record) = rx.blocking_recv() {
                if let Err(e) = writer.append(&record) {
                    error!(path = %writer.path().display(), error = %e, "failed to append row");
                    return Err(e);
                }
            }
            debug!(rows = writer.rows_written(), "writer task drained");
            Ok(writer.rows_written())
        });

        (RecordSender { tx }, Self { handle })
    }

    /// Waits for the writer task to drain and returns the number of rows written.
    ///
    /// Every [`RecordSender`] must be dropped first, otherwise this waits forever.
    ///
    /// # Errors
    ///
    /// Returns the writer's [`WriteError`], or [`WriteError::TaskFailed`] if the
    /// task panicked.
    pub async fn finish(self) -> Result<usize, WriteError> {
        self.handle
            .await
            .map_err(|e| WriteError::TaskFailed(e.to_string()))?
    }
}
