use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

use parquet::file::reader::{FileReader, SerializedFileReader};

use super::error::WriterError;

/// Statistics from the batches handed to a writer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Number of batches persisted
    pub batches_written: usize,
    /// Total number of rows persisted
    pub rows_written: usize,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} rows in {} batches",
            self.rows_written, self.batches_written
        )
    }
}

/// Summary of a finished mzparquet file, read back from its footer.
#[derive(Debug, Clone)]
pub struct OutputSummary {
    /// Total number of rows
    pub num_rows: i64,
    /// Number of Parquet row groups
    pub row_groups: usize,
    /// Rows per row group, in file order
    pub row_group_rows: Vec<i64>,
    /// File size in bytes
    pub file_size_bytes: u64,
    /// Footer key/value metadata
    pub metadata: BTreeMap<String, String>,
}

impl fmt::Display for OutputSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows in {} row groups ({:.2} MB)",
            self.num_rows,
            self.row_groups,
            self.file_size_bytes as f64 / 1024.0 / 1024.0
        )
    }
}

/// Read row counts and footer metadata of an mzparquet file.
pub fn summarize_output<P: AsRef<Path>>(path: P) -> Result<OutputSummary, WriterError> {
    let file = File::open(path.as_ref())?;
    let file_size_bytes = file.metadata()?.len();
    let reader = SerializedFileReader::new(file)?;
    let parquet_metadata = reader.metadata();
    let file_metadata = parquet_metadata.file_metadata();

    let metadata = file_metadata
        .key_value_metadata()
        .map(|kvs| {
            kvs.iter()
                .filter_map(|kv| kv.value.clone().map(|v| (kv.key.clone(), v)))
                .collect()
        })
        .unwrap_or_default();

    Ok(OutputSummary {
        num_rows: file_metadata.num_rows(),
        row_groups: parquet_metadata.num_row_groups(),
        row_group_rows: parquet_metadata
            .row_groups()
            .iter()
            .map(|rg| rg.num_rows())
            .collect(),
        file_size_bytes,
        metadata,
    })
}
