//! # mzparquet Writer Module
//!
//! Writes flattened peak rows to the mzparquet Parquet format.
//!
//! ## Design Principles
//!
//! 1. **Chunked Writes**: Rows arrive in bounded batches through the
//!    [`ColumnarWriter`] trait; the first batch creates the file and every later
//!    batch is appended to it.
//!
//! 2. **Atomic Batches**: Each batch is staged in a temporary file and renamed over
//!    the target, so the artifact on disk always reflects the last complete batch.
//!
//! 3. **RLE Optimization**: Scan-level columns repeat for every peak of a scan and are
//!    dictionary encoded.
//!
//! 4. **Configurable Compression**: ZSTD level 1 by default, favoring write speed.

mod columnar;
mod config;
mod error;
mod metadata;
mod stats;
mod types;
mod writer_impl;

#[cfg(test)]
mod tests;

pub use columnar::{ColumnarWriter, WriteMode};
pub use config::{CompressionType, Precision, WriterConfig};
pub use error::WriterError;
pub use metadata::{OutputMetadata, SourceFileInfo};
pub use stats::{summarize_output, OutputSummary, WriterStats};
pub use types::{round_to_u32, OutputRow, Quantity};
pub use writer_impl::ParquetBatchWriter;
