//! Bounded-memory chunked output.

use std::fmt;
use std::mem;

use log::{debug, info};

use crate::writer::{ColumnarWriter, OutputRow, WriteMode};

use super::error::SinkError;

/// Default number of buffered rows that triggers a flush.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Write mode of the next flush. Moves from `Creating` to `Appending` once, after
/// the first successful flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Nothing persisted yet; the next flush creates the artifact
    Creating,
    /// The artifact exists; further flushes append to it
    Appending,
}

impl SinkState {
    fn write_mode(self) -> WriteMode {
        match self {
            SinkState::Creating => WriteMode::Create,
            SinkState::Appending => WriteMode::Append,
        }
    }
}

/// Counters of a sink's flushes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Rows handed to the writer successfully
    pub rows_written: usize,
    /// Row count of each successful flush, in order
    pub batch_sizes: Vec<usize>,
}

impl SinkStats {
    /// Number of successful flushes
    pub fn flushes(&self) -> usize {
        self.batch_sizes.len()
    }
}

impl fmt::Display for SinkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows in {} chunks", self.rows_written, self.flushes())
    }
}

/// Buffers rows and hands them to a [`ColumnarWriter`] in fixed-size batches.
///
/// # Example
///
/// ```
/// use mzparquet::pipeline::ChunkedSink;
/// use mzparquet::writer::{ColumnarWriter, OutputRow, Quantity, WriteMode, WriterError};
///
/// #[derive(Default)]
/// struct Collect(Vec<(WriteMode, usize)>);
///
/// impl ColumnarWriter for Collect {
///     fn write_batch(&mut self, rows: Vec<OutputRow>, mode: WriteMode) -> Result<(), WriterError> {
///         self.0.push((mode, rows.len()));
///         Ok(())
///     }
/// }
///
/// let row = OutputRow {
///     scan: 1, level: 1, rt: 0.5, mz: 400.0, intensity: Quantity::Float(1.0),
///     ion_mobility: None, isolation_lower: None, isolation_upper: None,
///     precursor_scan: None, precursor_mz: None, precursor_charge: None,
/// };
///
/// let mut sink = ChunkedSink::new(Collect::default(), 2);
/// for _ in 0..3 {
///     sink.push(row)?;
/// }
/// let (writer, stats) = sink.finish()?;
///
/// assert_eq!(writer.0, vec![(WriteMode::Create, 2), (WriteMode::Append, 1)]);
/// assert_eq!(stats.rows_written, 3);
/// # Ok::<(), mzparquet::pipeline::SinkError>(())
/// ```
pub struct ChunkedSink<W> {
    writer: W,
    threshold: usize,
    buffer: Vec<OutputRow>,
    state: SinkState,
    stats: SinkStats,
}

impl<W: ColumnarWriter> ChunkedSink<W> {
    /// Sink flushing every `threshold` rows. A threshold of 0 is treated as 1.
    pub fn new(writer: W, threshold: usize) -> Self {
        Self {
            writer,
            threshold: threshold.max(1),
            buffer: Vec::new(),
            state: SinkState::Creating,
            stats: SinkStats::default(),
        }
    }

    /// Flush threshold in rows
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Current state
    pub fn state(&self) -> SinkState {
        self.state
    }

    /// Rows waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Buffer a row, flushing when the buffer reaches the threshold.
    pub fn push(&mut self, row: OutputRow) -> Result<(), SinkError> {
        self.buffer.push(row);
        if self.buffer.len() >= self.threshold {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush any remaining rows and return the writer with the flush counters.
    pub fn finish(mut self) -> Result<(W, SinkStats), SinkError> {
        if !self.buffer.is_empty() {
            self.flush()?;
        }
        debug!("Sink finished: {}", self.stats);
        Ok((self.writer, self.stats))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        let rows = mem::take(&mut self.buffer);
        let count = rows.len();
        let chunk = self.stats.flushes() + 1;
        let mode = self.state.write_mode();

        info!("writing chunk {} ({} rows, {:?})", chunk, count, mode);
        self.writer
            .write_batch(rows, mode)
            .map_err(|source| SinkError::WriteFailed {
                chunk,
                rows_lost: count,
                source,
            })?;

        self.state = SinkState::Appending;
        self.stats.rows_written += count;
        self.stats.batch_sizes.push(count);
        Ok(())
    }
}

impl<W> fmt::Debug for ChunkedSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedSink")
            .field("threshold", &self.threshold)
            .field("buffered", &self.buffer.len())
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}
