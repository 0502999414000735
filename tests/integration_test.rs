//! Integration tests for mzparquet
//!
//! These tests run the whole pipeline from an in-memory scan source to a Parquet
//! file on disk and read the file back.

use arrow::array::{Array, Float32Array, UInt32Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use mzparquet::pipeline::{Pipeline, PipelineConfig, PipelineError};
use mzparquet::schema::{columns, KEY_PRECISION, KEY_SOURCE_FILE};
use mzparquet::source::{
    MemoryScan, MemoryScanSource, PeakList, ScanHeader, ScanRange, ScanSource, SourceError,
    Trailer,
};
use mzparquet::writer::{
    summarize_output, OutputMetadata, ParquetBatchWriter, Precision, SourceFileInfo,
    WriterConfig,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;
use tempfile::tempdir;

/// Survey scan followed by `fragments` MS2 scans, repeated `cycles` times.
fn dda_run(cycles: usize, fragments: usize, peaks: usize) -> MemoryScanSource {
    let mut source = MemoryScanSource::new();
    let mut rt = 0.0;
    for cycle in 0..cycles {
        let mz: Vec<f64> = (0..peaks).map(|j| 300.0 + j as f64 * 7.5).collect();
        let intensity: Vec<f64> = (0..peaks).map(|j| 1e4 + (cycle * peaks + j) as f64).collect();
        source.push(MemoryScan::ms1(rt).with_centroids(mz, intensity));
        rt += 0.01;

        for f in 0..fragments {
            let mass = 400.0 + f as f64 * 50.0;
            let mz: Vec<f64> = (0..peaks / 2).map(|j| 120.0 + j as f64 * 3.25).collect();
            let intensity: Vec<f64> = (0..peaks / 2).map(|j| 50.0 + j as f64).collect();
            source.push(
                MemoryScan::msn(2, rt, mass, 1.6)
                    .with_centroids(mz, intensity)
                    .with_trailer("Charge State:", "2")
                    .with_trailer("Monoisotopic M/Z:", &format!("{:.4}", mass + 0.25)),
            );
            rt += 0.01;
        }
    }
    source
}

fn read_batches(path: &Path) -> Vec<RecordBatch> {
    ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap())
        .unwrap()
        .build()
        .unwrap()
        .map(|b| b.unwrap())
        .collect()
}

fn u32_column(batches: &[RecordBatch], name: &str) -> Vec<Option<u32>> {
    batches
        .iter()
        .flat_map(|batch| {
            let column = batch
                .column_by_name(name)
                .unwrap()
                .as_any()
                .downcast_ref::<UInt32Array>()
                .unwrap();
            (0..column.len())
                .map(|i| column.is_valid(i).then(|| column.value(i)))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn f32_column(batches: &[RecordBatch], name: &str) -> Vec<Option<f32>> {
    batches
        .iter()
        .flat_map(|batch| {
            let column = batch
                .column_by_name(name)
                .unwrap()
                .as_any()
                .downcast_ref::<Float32Array>()
                .unwrap();
            (0..column.len())
                .map(|i| column.is_valid(i).then(|| column.value(i)))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Test the complete convert-read cycle
#[test]
fn test_convert_read_cycle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.mzparquet");
    let source = dda_run(5, 3, 20);

    let metadata = OutputMetadata::new().with_source_file(SourceFileInfo::new("run.raw"));
    let writer = ParquetBatchWriter::new(&path, &metadata, WriterConfig::default()).unwrap();
    let stats = Pipeline::new(&source, PipelineConfig::default().with_chunk_size(64))
        .run(writer)
        .unwrap();

    // 5 cycles of one 20-peak survey scan and three 10-peak MS2 scans
    assert_eq!(stats.scans, 20);
    assert_eq!(stats.ms1_scans, 5);
    assert_eq!(stats.ms2_scans, 15);
    assert_eq!(stats.rows, 250);
    assert_eq!(stats.sink.batch_sizes, vec![64, 64, 64, 58]);

    let summary = summarize_output(&path).unwrap();
    assert_eq!(summary.num_rows, 250);
    assert_eq!(summary.row_group_rows, vec![64, 64, 64, 58]);
    assert_eq!(summary.metadata[KEY_PRECISION], "float");
    assert!(summary.metadata[KEY_SOURCE_FILE].contains("run.raw"));

    let batches = read_batches(&path);
    let scans = u32_column(&batches, columns::SCAN);
    let levels = u32_column(&batches, columns::LEVEL);
    let precursor_scans = u32_column(&batches, columns::PRECURSOR_SCAN);
    let precursor_mz = f32_column(&batches, columns::PRECURSOR_MZ);
    let lower = f32_column(&batches, columns::ISOLATION_LOWER);
    let mobility = f32_column(&batches, columns::ION_MOBILITY);

    assert_eq!(scans.len(), 250);
    assert!(scans.windows(2).all(|w| w[0] <= w[1]));
    assert!(mobility.iter().all(Option::is_none));

    for i in 0..scans.len() {
        let scan = scans[i].unwrap();
        if levels[i] == Some(1) {
            assert_eq!(precursor_scans[i], None);
            assert_eq!(precursor_mz[i], None);
            assert_eq!(lower[i], None);
        } else {
            // Survey scans sit at 1, 5, 9, ...
            let survey = scan - (scan - 1) % 4;
            assert_eq!(precursor_scans[i], Some(survey));
            let mass = 400.0 + f64::from(scan - survey - 1) * 50.0;
            assert_eq!(precursor_mz[i], Some((mass + 0.25) as f32));
            assert_eq!(lower[i], Some((mass - 0.8) as f32));
        }
    }
}

#[test]
fn test_integer_precision_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.mzparquet");
    let source = dda_run(2, 1, 4);

    let config = PipelineConfig::default().with_precision(Precision::Integer);
    let writer = ParquetBatchWriter::new(
        &path,
        &OutputMetadata::new(),
        WriterConfig::default().with_precision(Precision::Integer),
    )
    .unwrap();
    Pipeline::new(&source, config).run(writer).unwrap();

    let batches = read_batches(&path);
    let schema = batches[0].schema();
    assert_eq!(
        schema.field_with_name(columns::INTENSITY).unwrap().data_type(),
        &DataType::UInt32
    );
    assert_eq!(
        schema.field_with_name(columns::PRECURSOR_CHARGE).unwrap().data_type(),
        &DataType::UInt32
    );

    let charges = u32_column(&batches, columns::PRECURSOR_CHARGE);
    let levels = u32_column(&batches, columns::LEVEL);
    for (charge, level) in charges.iter().zip(&levels) {
        let expected = if *level == Some(2) { Some(2) } else { None };
        assert_eq!(*charge, expected);
    }
}

#[test]
fn test_conversion_is_reproducible() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.mzparquet");
    let second = dir.path().join("second.mzparquet");
    let source = dda_run(3, 2, 12);

    for path in [&first, &second] {
        let writer = ParquetBatchWriter::new(path, &OutputMetadata::new(), WriterConfig::default())
            .unwrap();
        Pipeline::new(&source, PipelineConfig::default().with_chunk_size(25))
            .run(writer)
            .unwrap();
    }

    assert_eq!(
        summarize_output(&first).unwrap().row_group_rows,
        summarize_output(&second).unwrap().row_group_rows
    );
    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

/// Fails on one scan to exercise early termination.
struct TruncatedSource {
    inner: MemoryScanSource,
    fail_at: u32,
}

impl ScanSource for TruncatedSource {
    fn scan_range(&self) -> ScanRange {
        self.inner.scan_range()
    }

    fn header(&self, scan: u32) -> Result<ScanHeader, SourceError> {
        if scan == self.fail_at {
            return Err(SourceError::ReadError("unreadable scan".to_string()));
        }
        self.inner.header(scan)
    }

    fn centroids(&self, scan: u32) -> Result<PeakList, SourceError> {
        self.inner.centroids(scan)
    }

    fn profile_peaks(&self, scan: u32) -> Result<PeakList, SourceError> {
        self.inner.profile_peaks(scan)
    }

    fn trailer(&self, scan: u32) -> Result<Trailer, SourceError> {
        self.inner.trailer(scan)
    }
}

#[test]
fn test_source_failure_keeps_flushed_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.mzparquet");
    let source = TruncatedSource {
        inner: dda_run(3, 3, 10),
        fail_at: 6,
    };

    let writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), WriterConfig::default())
        .unwrap();
    let result = Pipeline::new(&source, PipelineConfig::default().with_chunk_size(8)).run(writer);
    assert!(matches!(result, Err(PipelineError::Source { scan: 6, .. })));

    // Scans 1..=5: two 10-peak survey scans and three 5-peak MS2 scans
    let summary = summarize_output(&path).unwrap();
    assert_eq!(summary.num_rows, 35);
    assert_eq!(summary.row_group_rows, vec![8, 8, 8, 8, 3]);
    let scans = u32_column(&read_batches(&path), columns::SCAN);
    assert_eq!(scans.last(), Some(&Some(5)));
}
