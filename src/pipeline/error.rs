use thiserror::Error;

use crate::source::SourceError;
use crate::writer::WriterError;

/// Errors raised by the chunked sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The columnar writer rejected a batch; its rows were not persisted
    #[error("failed to write chunk {chunk} ({rows_lost} buffered rows lost): {source}")]
    WriteFailed {
        /// 1-based index of the failed flush
        chunk: usize,
        /// Rows that were in the buffer when the flush failed
        rows_lost: usize,
        /// Underlying writer error
        #[source]
        source: WriterError,
    },
}

impl SinkError {
    /// Number of buffered rows that were not persisted.
    pub fn rows_lost(&self) -> usize {
        match self {
            SinkError::WriteFailed { rows_lost, .. } => *rows_lost,
        }
    }
}

/// Errors that terminate a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The scan source failed on a scan. Rows produced before it were flushed.
    #[error("failed to read scan {scan}: {source}")]
    Source {
        /// Scan number that could not be read
        scan: u32,
        /// Underlying source error
        #[source]
        source: SourceError,
    },

    /// Writing to the output artifact failed
    #[error(transparent)]
    Sink(#[from] SinkError),
}
