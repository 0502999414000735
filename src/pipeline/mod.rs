//! Scan-to-row conversion pipeline.
//!
//! The [`Pipeline`] visits every scan of a [`ScanSource`] in increasing order and
//! pushes one [`OutputRow`](crate::writer::OutputRow) per peak into a
//! [`ChunkedSink`]:
//!
//! ```text
//! ScanSource -> extract_peaks -> PrecursorResolver -> flatten -> ChunkedSink -> ColumnarWriter
//! ```
//!
//! Only the resolver carries state from one scan to the next.

mod error;
pub mod extractor;
pub mod flattener;
pub mod resolver;
pub mod sink;


use std::fmt;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::source::{ScanSource, SourceError};
use crate::writer::{ColumnarWriter, Precision};

pub use error::{PipelineError, SinkError};
pub use extractor::{extract_peaks, PeakSelection};
pub use flattener::{flatten, ScanAttributes};
pub use resolver::{PrecursorInfo, PrecursorResolver, PrecursorState};
pub use sink::{ChunkedSink, SinkState, SinkStats, DEFAULT_CHUNK_SIZE};

/// Settings of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Buffered rows per flush
    pub chunk_size: usize,
    /// Representation of intensity and charge
    pub precision: Precision,
    /// Percentage of the scan range between progress messages; 0 disables them
    pub progress_step: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            precision: Precision::Float,
            progress_step: 10,
        }
    }
}

impl PipelineConfig {
    /// Set the flush threshold
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the intensity and charge representation
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
}

/// Counters collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Scans visited
    pub scans: u64,
    /// Survey scans (MS level 1 or lower)
    pub ms1_scans: u64,
    /// MS2 scans
    pub ms2_scans: u64,
    /// Scans above MS level 2
    pub msn_scans: u64,
    /// Scans whose peaks came from the profile-derived list
    pub fallback_scans: u64,
    /// Scans that produced no rows
    pub empty_scans: u64,
    /// Rows produced
    pub rows: u64,
    /// Flush counters of the sink
    pub sink: SinkStats,
}

impl RunStats {
    fn count_level(&mut self, ms_level: u32) {
        match ms_level {
            0 | 1 => self.ms1_scans += 1,
            2 => self.ms2_scans += 1,
            _ => self.msn_scans += 1,
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scans (MS1: {}, MS2: {}, MSn: {}), {} rows, {} profile fallbacks, {} empty scans, {}",
            self.scans,
            self.ms1_scans,
            self.ms2_scans,
            self.msn_scans,
            self.rows,
            self.fallback_scans,
            self.empty_scans,
            self.sink
        )
    }
}

/// Converts the scans of a source into flat rows.
///
/// # Example
///
/// ```
/// use mzparquet::pipeline::{Pipeline, PipelineConfig};
/// use mzparquet::source::{MemoryScan, MemoryScanSource};
/// use mzparquet::writer::{ColumnarWriter, OutputRow, WriteMode, WriterError};
///
/// #[derive(Default)]
/// struct Collect(Vec<OutputRow>);
///
/// impl ColumnarWriter for Collect {
///     fn write_batch(&mut self, rows: Vec<OutputRow>, _mode: WriteMode) -> Result<(), WriterError> {
///         self.0.extend(rows);
///         Ok(())
///     }
/// }
///
/// let source = MemoryScanSource::starting_at(10)
///     .with_scan(MemoryScan::ms1(1.0).with_centroids(vec![500.0], vec![1e5]))
///     .with_scan(MemoryScan::msn(2, 1.1, 500.0, 2.0).with_centroids(vec![150.0, 250.0], vec![10.0, 20.0]));
///
/// let mut collected = Collect::default();
/// let stats = Pipeline::new(&source, PipelineConfig::default()).run(&mut collected)?;
///
/// assert_eq!(stats.rows, 3);
/// assert_eq!(collected.0[1].precursor_scan, Some(10));
/// # Ok::<(), mzparquet::pipeline::PipelineError>(())
/// ```
#[derive(Debug)]
pub struct Pipeline<S> {
    source: S,
    config: PipelineConfig,
}

impl<S: ScanSource> Pipeline<S> {
    /// Pipeline over `source`
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Convert every scan and hand the rows to `writer`.
    ///
    /// The sink is finished even when the source fails part way, so the artifact
    /// holds every row produced before the failing scan.
    pub fn run<W: ColumnarWriter>(&self, writer: W) -> Result<RunStats, PipelineError> {
        let mut sink = ChunkedSink::new(writer, self.config.chunk_size);
        let mut stats = RunStats::default();

        match self.convert_scans(&mut sink, &mut stats) {
            Ok(()) => {
                let (_, sink_stats) = sink.finish()?;
                stats.sink = sink_stats;
                info!("Conversion complete: {}", stats);
                Ok(stats)
            }
            Err(PipelineError::Source { scan, source }) => {
                if let Err(e) = sink.finish() {
                    error!("Failed to flush rows before scan {}: {}", scan, e);
                }
                Err(PipelineError::Source { scan, source })
            }
            Err(e) => Err(e),
        }
    }

    fn convert_scans<W: ColumnarWriter>(
        &self,
        sink: &mut ChunkedSink<W>,
        stats: &mut RunStats,
    ) -> Result<(), PipelineError> {
        let range = self.source.scan_range();
        let total = range.len();
        let precision = self.config.precision;
        let mut resolver = PrecursorResolver::new(precision);
        let mut progress = Progress::new(total, self.config.progress_step);

        info!("Converting scans {}..={} ({} scans)", range.first, range.last, total);

        for scan in range.iter() {
            let source_error = |source: SourceError| PipelineError::Source { scan, source };

            let header = self.source.header(scan).map_err(source_error)?;
            let selection = extract_peaks(&self.source, scan).map_err(source_error)?;
            let trailer = self.source.trailer(scan).map_err(source_error)?;

            let precursor = resolver.resolve(scan, &header, &trailer);
            let attributes =
                ScanAttributes::new(scan, header.ms_level, header.retention_time, precursor);

            let peaks = selection.peaks();
            for row in flatten(attributes, peaks, precision) {
                sink.push(row)?;
            }

            stats.scans += 1;
            stats.count_level(header.ms_level);
            stats.rows += peaks.len() as u64;
            if selection.is_fallback() {
                stats.fallback_scans += 1;
            }
            if peaks.is_empty() {
                stats.empty_scans += 1;
            }

            progress.advance(scan);
        }

        Ok(())
    }
}

/// Emits a log line each time another `step` percent of the range is done.
struct Progress {
    total: u64,
    done: u64,
    step: u64,
    next_percent: u64,
}

impl Progress {
    fn new(total: u64, step: u8) -> Self {
        let step = u64::from(step);
        Self {
            total,
            done: 0,
            step,
            next_percent: step,
        }
    }

    fn advance(&mut self, scan: u32) {
        self.done += 1;
        if self.step == 0 || self.total == 0 {
            return;
        }
        let percent = self.done * 100 / self.total;
        if percent >= self.next_percent {
            info!("{}% ({} of {} scans, at scan {})", percent, self.done, self.total, scan);
            while self.next_percent <= percent {
                self.next_percent += self.step;
            }
        }
    }
}
