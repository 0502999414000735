use super::*;
use crate::schema::{columns, KEY_PRECISION, KEY_SOURCE_FILE};
use arrow::array::{Array, Float32Array, UInt32Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use tempfile::tempdir;

fn row(scan: u32, mz: f32, intensity: Quantity) -> OutputRow {
    OutputRow {
        scan,
        level: 1,
        rt: 0.5,
        mz,
        intensity,
        ion_mobility: None,
        isolation_lower: None,
        isolation_upper: None,
        precursor_scan: None,
        precursor_mz: None,
        precursor_charge: None,
    }
}

fn ms2_row(scan: u32, precursor_scan: u32, charge: Quantity) -> OutputRow {
    OutputRow {
        level: 2,
        isolation_lower: Some(499.0),
        isolation_upper: Some(501.0),
        precursor_scan: Some(precursor_scan),
        precursor_mz: Some(500.0),
        precursor_charge: Some(charge),
        ..row(scan, 250.0, Quantity::Float(10.0))
    }
}

fn read_scans(path: &std::path::Path) -> Vec<u32> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let mut scans = Vec::new();
    for batch in reader {
        let batch = batch.unwrap();
        let column = batch
            .column_by_name(columns::SCAN)
            .unwrap()
            .as_any()
            .downcast_ref::<UInt32Array>()
            .unwrap();
        scans.extend(column.values().iter().copied());
    }
    scans
}

/// Codec and encoded bytes of every column chunk, grouped by row group.
fn column_chunks(path: &std::path::Path) -> Result<Vec<Vec<(Compression, Vec<u8>)>>, WriterError> {
    let bytes = std::fs::read(path)?;
    let reader = SerializedFileReader::new(File::open(path)?)?;
    Ok(reader
        .metadata()
        .row_groups()
        .iter()
        .map(|row_group| {
            row_group
                .columns()
                .iter()
                .map(|column| {
                    let (start, len) = column.byte_range();
                    let range = start as usize..(start + len) as usize;
                    (column.compression(), bytes[range].to_vec())
                })
                .collect()
        })
        .collect())
}

#[test]
fn test_create_then_append() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("run.mzparquet");

    let mut writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), WriterConfig::default())?;
    writer.write_batch(
        vec![row(1, 100.0, Quantity::Float(1.0)), row(1, 200.0, Quantity::Float(2.0))],
        WriteMode::Create,
    )?;
    writer.write_batch(vec![row(2, 300.0, Quantity::Float(3.0))], WriteMode::Append)?;

    assert_eq!(writer.stats().batches_written, 2);
    assert_eq!(writer.stats().rows_written, 3);

    let summary = summarize_output(&path)?;
    assert_eq!(summary.num_rows, 3);
    assert_eq!(summary.row_group_rows, vec![2, 1]);
    assert_eq!(read_scans(&path), vec![1, 1, 2]);

    Ok(())
}

#[test]
fn test_create_replaces_existing_file() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("run.mzparquet");
    std::fs::write(&path, b"stale contents")?;

    let mut writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), WriterConfig::default())?;
    writer.write_batch(vec![row(7, 100.0, Quantity::Float(1.0))], WriteMode::Create)?;

    assert_eq!(read_scans(&path), vec![7]);
    Ok(())
}

#[test]
fn test_append_without_target_fails() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("missing.mzparquet");

    let mut writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), WriterConfig::default())?;
    let result = writer.write_batch(vec![row(1, 100.0, Quantity::Float(1.0))], WriteMode::Append);

    assert!(matches!(result, Err(WriterError::MissingTarget(_))));
    assert!(!path.exists());
    assert_eq!(writer.stats().batches_written, 0);
    Ok(())
}

#[test]
fn test_failed_append_keeps_previous_file() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("run.mzparquet");

    let mut float_writer =
        ParquetBatchWriter::new(&path, &OutputMetadata::new(), WriterConfig::default())?;
    float_writer.write_batch(vec![row(1, 100.0, Quantity::Float(1.0))], WriteMode::Create)?;
    let before = std::fs::read(&path)?;

    // An integer-precision writer cannot append to a float-precision file
    let config = WriterConfig::default().with_precision(Precision::Integer);
    let mut integer_writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), config)?;
    let result =
        integer_writer.write_batch(vec![row(2, 100.0, Quantity::Unsigned(1))], WriteMode::Append);

    assert!(matches!(result, Err(WriterError::InvalidData(_))));
    assert_eq!(std::fs::read(&path)?, before);
    Ok(())
}

#[test]
fn test_nullable_columns_and_integer_precision() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("run.mzparquet");
    let config = WriterConfig::default().with_precision(Precision::Integer);

    let mut writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), config)?;
    writer.write_batch(
        vec![
            row(1, 100.0, Quantity::Unsigned(42)),
            ms2_row(2, 1, Quantity::Unsigned(3)),
        ],
        WriteMode::Create,
    )?;

    let mut reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
    let batch = reader.next().unwrap().unwrap();

    let intensity = batch
        .column_by_name(columns::INTENSITY)
        .unwrap()
        .as_any()
        .downcast_ref::<UInt32Array>()
        .unwrap();
    assert_eq!(intensity.value(0), 42);

    let precursor_scan = batch
        .column_by_name(columns::PRECURSOR_SCAN)
        .unwrap()
        .as_any()
        .downcast_ref::<UInt32Array>()
        .unwrap();
    assert!(precursor_scan.is_null(0));
    assert_eq!(precursor_scan.value(1), 1);

    let charge = batch
        .column_by_name(columns::PRECURSOR_CHARGE)
        .unwrap()
        .as_any()
        .downcast_ref::<UInt32Array>()
        .unwrap();
    assert!(charge.is_null(0));
    assert_eq!(charge.value(1), 3);

    let ion_mobility = batch
        .column_by_name(columns::ION_MOBILITY)
        .unwrap()
        .as_any()
        .downcast_ref::<Float32Array>()
        .unwrap();
    assert_eq!(ion_mobility.null_count(), 2);

    Ok(())
}

#[test]
fn test_footer_metadata() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("run.mzparquet");
    let metadata = OutputMetadata::new().with_source_file(SourceFileInfo::new("run.raw"));

    let mut writer = ParquetBatchWriter::new(&path, &metadata, WriterConfig::default())?;
    writer.write_batch(vec![row(1, 100.0, Quantity::Float(1.0))], WriteMode::Create)?;
    writer.write_batch(vec![row(2, 100.0, Quantity::Float(1.0))], WriteMode::Append)?;

    let summary = summarize_output(&path)?;
    assert_eq!(summary.metadata.get(KEY_PRECISION).map(String::as_str), Some("float"));
    let source = SourceFileInfo::from_json(&summary.metadata[KEY_SOURCE_FILE])?;
    assert_eq!(source.name, "run.raw");

    Ok(())
}

#[test]
fn test_append_copies_existing_chunks_verbatim() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("run.mzparquet");

    let snappy = WriterConfig {
        compression: CompressionType::Snappy,
        ..WriterConfig::default()
    };
    let mut first = ParquetBatchWriter::new(&path, &OutputMetadata::new(), snappy)?;
    first.write_batch(
        (0..500).map(|i| row(1, 100.0 + i as f32, Quantity::Float(i as f32))).collect(),
        WriteMode::Create,
    )?;

    // Later chunks use a different codec, so any re-encoded chunk would show up
    let mut writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), WriterConfig::default())?;
    let mut written = column_chunks(&path)?;
    for scan in 2..=6u32 {
        writer.write_batch(
            (0..500).map(|i| row(scan, 100.0 + i as f32, Quantity::Float(1.0))).collect(),
            WriteMode::Append,
        )?;

        let chunks = column_chunks(&path)?;
        assert_eq!(chunks.len(), written.len() + 1);
        assert_eq!(&chunks[..written.len()], &written[..]);
        written = chunks;
    }

    assert!(written[0].iter().all(|(codec, _)| *codec == Compression::SNAPPY));
    assert!(written[1..]
        .iter()
        .flatten()
        .all(|(codec, _)| matches!(codec, Compression::ZSTD(_))));

    let summary = summarize_output(&path)?;
    assert_eq!(summary.row_group_rows, vec![500; 6]);
    let scans = read_scans(&path);
    assert_eq!(scans.len(), 3000);
    assert_eq!(scans[0], 1);
    assert_eq!(scans[2999], 6);
    Ok(())
}

#[test]
fn test_large_batch_splits_into_row_groups() -> Result<(), WriterError> {
    let dir = tempdir()?;
    let path = dir.path().join("run.mzparquet");
    let config = WriterConfig {
        row_group_size: 4,
        ..WriterConfig::default()
    };

    let mut writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), config)?;
    writer.write_batch(
        (0..10).map(|i| row(i, 100.0, Quantity::Float(1.0))).collect(),
        WriteMode::Create,
    )?;
    writer.write_batch(vec![row(10, 100.0, Quantity::Float(1.0))], WriteMode::Append)?;

    assert_eq!(summarize_output(&path)?.row_group_rows, vec![4, 4, 2, 1]);
    assert_eq!(read_scans(&path), (0..=10).collect::<Vec<u32>>());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_new_artifact_mode_follows_umask() -> Result<(), WriterError> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir()?;
    let path = dir.path().join("run.mzparquet");
    let ordinary = dir.path().join("ordinary");
    File::create(&ordinary)?;

    let mut writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), WriterConfig::default())?;
    writer.write_batch(vec![row(1, 100.0, Quantity::Float(1.0))], WriteMode::Create)?;

    let mode = |p: &std::path::Path| -> std::io::Result<u32> {
        Ok(std::fs::metadata(p)?.permissions().mode() & 0o777)
    };
    assert_eq!(mode(&path)?, mode(&ordinary)?);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_append_keeps_target_mode() -> Result<(), WriterError> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir()?;
    let path = dir.path().join("run.mzparquet");

    let mut writer = ParquetBatchWriter::new(&path, &OutputMetadata::new(), WriterConfig::default())?;
    writer.write_batch(vec![row(1, 100.0, Quantity::Float(1.0))], WriteMode::Create)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640))?;

    writer.write_batch(vec![row(2, 100.0, Quantity::Float(1.0))], WriteMode::Append)?;

    assert_eq!(std::fs::metadata(&path)?.permissions().mode() & 0o777, 0o640);
    assert_eq!(read_scans(&path), vec![1, 2]);
    Ok(())
}
