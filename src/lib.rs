//! # mzparquet - Flat Peak Tables from Mass Spectrometry Runs
//!
//! `mzparquet` converts the scans of a mass spectrometry acquisition into a single
//! flat Parquet table with one row per detected peak. Every row carries its scan's
//! MS level and retention time together with the resolved precursor linkage, so
//! MS2 peaks can be joined back to the survey scan that produced them with plain
//! SQL or dataframe code.
//!
//! ## Key Features
//!
//! - **Peak selection**: centroided peaks are preferred; scans without centroids
//!   fall back to the profile-derived peak list.
//!
//! - **Precursor linkage**: each MSn scan points at the most recent scan one MS level
//!   below it, refined by instrument trailer values (monoisotopic m/z, master scan,
//!   charge state).
//!
//! - **Bounded memory**: rows are buffered and flushed in fixed-size chunks. The first
//!   chunk creates the file and later chunks are appended, each flush replacing the
//!   file atomically.
//!
//! - **Configurable precision**: intensities and charges are stored as `Float32` or
//!   rounded `UInt32`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mzparquet::pipeline::{Pipeline, PipelineConfig};
//! use mzparquet::source::{MemoryScan, MemoryScanSource};
//! use mzparquet::writer::{OutputMetadata, ParquetBatchWriter, WriterConfig};
//!
//! let source = MemoryScanSource::new()
//!     .with_scan(MemoryScan::ms1(0.5).with_centroids(vec![400.2, 512.7], vec![1.2e5, 8.0e4]))
//!     .with_scan(MemoryScan::msn(2, 0.51, 512.7, 1.6).with_centroids(vec![175.1], vec![3.1e3]));
//!
//! let writer = ParquetBatchWriter::new("run.mzparquet", &OutputMetadata::new(), WriterConfig::default())?;
//! let stats = Pipeline::new(&source, PipelineConfig::default()).run(writer)?;
//! println!("Wrote {} rows", stats.rows);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! With the `thermo` feature, [`source::thermo::ThermoScanSource`] reads scans
//! directly from Thermo RAW files.
//!
//! ## Reading mzparquet Files
//!
//! ```sql
//! -- DuckDB
//! SELECT scan, mz, intensity FROM read_parquet('run.mzparquet')
//! WHERE level = 2 AND precursor_mz BETWEEN 500 AND 600;
//! ```
//!
//! ## Architecture
//!
//! - [`source`]: the [`ScanSource`](source::ScanSource) trait and scan sources
//! - [`pipeline`]: peak extraction, precursor resolution, flattening and chunked output
//! - [`schema`]: Arrow schema of the output table
//! - [`writer`]: Parquet writer with create/append batch semantics

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod pipeline;
pub mod schema;
pub mod source;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::pipeline::{
        ChunkedSink, Pipeline, PipelineConfig, PipelineError, PrecursorResolver, RunStats,
        SinkError,
    };
    pub use crate::schema::{columns, create_mzparquet_schema, MZPARQUET_FORMAT_VERSION};
    pub use crate::source::{
        MemoryScan, MemoryScanSource, PeakList, ScanHeader, ScanRange, ScanSource, SourceError,
        Trailer,
    };
    pub use crate::writer::{
        summarize_output, ColumnarWriter, CompressionType, OutputMetadata, OutputRow,
        ParquetBatchWriter, Precision, Quantity, WriteMode, WriterConfig, WriterError,
    };
}
