use super::error::WriterError;
use super::types::OutputRow;

/// How a batch is written to the output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create the artifact, replacing any existing file
    Create,
    /// Append the batch to the existing artifact
    Append,
}

/// Destination for flattened rows.
///
/// Implementations take ownership of each batch. A call either persists the whole
/// batch or leaves the artifact exactly as it was before the call.
pub trait ColumnarWriter {
    /// Write `rows` to the artifact using `mode`.
    fn write_batch(&mut self, rows: Vec<OutputRow>, mode: WriteMode) -> Result<(), WriterError>;
}

impl<W: ColumnarWriter + ?Sized> ColumnarWriter for &mut W {
    fn write_batch(&mut self, rows: Vec<OutputRow>, mode: WriteMode) -> Result<(), WriterError> {
        (**self).write_batch(rows, mode)
    }
}

impl<W: ColumnarWriter + ?Sized> ColumnarWriter for Box<W> {
    fn write_batch(&mut self, rows: Vec<OutputRow>, mode: WriteMode) -> Result<(), WriterError> {
        (**self).write_batch(rows, mode)
    }
}
