use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array, Float32Builder, UInt32Array, UInt32Builder};
use arrow::buffer::ScalarBuffer;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::arrow_reader::{ArrowReaderMetadata, ArrowReaderOptions};
use parquet::arrow::arrow_writer::{compute_leaves, get_column_writers};
use parquet::arrow::{add_encoded_arrow_schema_to_metadata, ArrowSchemaConverter};
use parquet::column::writer::ColumnCloseResult;
use parquet::file::metadata::ParquetMetaData;
use parquet::file::properties::WriterPropertiesPtr;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::types::SchemaDescriptor;
use tempfile::NamedTempFile;

use crate::schema::{create_mzparquet_schema_arc, validate_schema};

use super::columnar::{ColumnarWriter, WriteMode};
use super::config::{Precision, WriterConfig};
use super::error::WriterError;
use super::metadata::OutputMetadata;
use super::stats::WriterStats;
use super::types::{OutputRow, Quantity};

/// Builder for a quantity column whose Arrow type follows the configured precision.
enum QuantityBuilder {
    Float(Float32Builder),
    Unsigned(UInt32Builder),
}

impl QuantityBuilder {
    fn with_capacity(precision: Precision, capacity: usize) -> Self {
        match precision {
            Precision::Float => Self::Float(Float32Builder::with_capacity(capacity)),
            Precision::Integer => Self::Unsigned(UInt32Builder::with_capacity(capacity)),
        }
    }

    #[inline]
    fn append(&mut self, value: Option<Quantity>) {
        match self {
            Self::Float(builder) => builder.append_option(value.map(Quantity::as_f32)),
            Self::Unsigned(builder) => builder.append_option(value.map(Quantity::as_u32)),
        }
    }

    fn finish(self) -> ArrayRef {
        match self {
            Self::Float(mut builder) => Arc::new(builder.finish()),
            Self::Unsigned(mut builder) => Arc::new(builder.finish()),
        }
    }
}

/// Parquet implementation of [`ColumnarWriter`] for a single output path.
///
/// Each batch is written into a temporary file next to the target and atomically
/// renamed over it, so a failed write leaves the artifact exactly as the previous
/// successful batch left it. In [`WriteMode::Append`] the encoded column chunks
/// already in the target are spliced into the new file byte for byte ahead of the
/// batch, so a flush only encodes its own rows.
pub struct ParquetBatchWriter {
    path: PathBuf,
    config: WriterConfig,
    schema: SchemaRef,
    metadata: HashMap<String, String>,
    stats: WriterStats,
}

impl ParquetBatchWriter {
    /// Create a writer targeting `path`. Nothing is touched on disk until the first batch.
    pub fn new<P: AsRef<Path>>(
        path: P,
        metadata: &OutputMetadata,
        config: WriterConfig,
    ) -> Result<Self, WriterError> {
        let schema = create_mzparquet_schema_arc(config.precision);
        let metadata = metadata.to_parquet_metadata(config.precision)?;

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            config,
            schema,
            metadata,
            stats: WriterStats::default(),
        })
    }

    /// Target path of the artifact
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writer configuration
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Statistics for the batches written so far
    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    #[inline]
    fn vec_to_u32_array(data: Vec<u32>) -> ArrayRef {
        Arc::new(UInt32Array::new(ScalarBuffer::from(data), None))
    }

    #[inline]
    fn vec_to_f32_array(data: Vec<f32>) -> ArrayRef {
        Arc::new(Float32Array::new(ScalarBuffer::from(data), None))
    }

    /// Transpose owned rows into an Arrow record batch in schema order.
    fn rows_to_record_batch(&self, rows: Vec<OutputRow>) -> Result<RecordBatch, WriterError> {
        let len = rows.len();
        let precision = self.config.precision;

        let mut scan = Vec::with_capacity(len);
        let mut level = Vec::with_capacity(len);
        let mut rt = Vec::with_capacity(len);
        let mut mz = Vec::with_capacity(len);
        let mut intensity = QuantityBuilder::with_capacity(precision, len);
        let mut ion_mobility = Float32Builder::with_capacity(len);
        let mut isolation_lower = Float32Builder::with_capacity(len);
        let mut isolation_upper = Float32Builder::with_capacity(len);
        let mut precursor_scan = UInt32Builder::with_capacity(len);
        let mut precursor_mz = Float32Builder::with_capacity(len);
        let mut precursor_charge = QuantityBuilder::with_capacity(precision, len);

        for row in rows {
            scan.push(row.scan);
            level.push(row.level);
            rt.push(row.rt);
            mz.push(row.mz);
            intensity.append(Some(row.intensity));
            ion_mobility.append_option(row.ion_mobility);
            isolation_lower.append_option(row.isolation_lower);
            isolation_upper.append_option(row.isolation_upper);
            precursor_scan.append_option(row.precursor_scan);
            precursor_mz.append_option(row.precursor_mz);
            precursor_charge.append(row.precursor_charge);
        }

        let arrays: Vec<ArrayRef> = vec![
            Self::vec_to_u32_array(scan),
            Self::vec_to_u32_array(level),
            Self::vec_to_f32_array(rt),
            Self::vec_to_f32_array(mz),
            intensity.finish(),
            Arc::new(ion_mobility.finish()),
            Arc::new(isolation_lower.finish()),
            Arc::new(isolation_upper.finish()),
            Arc::new(precursor_scan.finish()),
            Arc::new(precursor_mz.finish()),
            precursor_charge.finish(),
        ];

        Ok(RecordBatch::try_new(self.schema.clone(), arrays)?)
    }

    /// Temporary file in the target's directory so the final rename stays on one filesystem.
    fn stage(&self) -> Result<NamedTempFile, WriterError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".mzparquet-").suffix(".tmp");
        // Same mode as a plain File::create, so the umask decides
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        Ok(builder.tempfile_in(parent)?)
    }

    fn commit(&self, staged: NamedTempFile) -> Result<(), WriterError> {
        // A replaced artifact keeps the mode it already had
        match std::fs::metadata(&self.path) {
            Ok(existing) => staged.as_file().set_permissions(existing.permissions())?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Write `carried` row groups verbatim followed by `batch` into the staged file.
    ///
    /// Returns the number of rows carried over.
    fn write_staged(
        &self,
        staged: &NamedTempFile,
        carried: Option<(&File, &ParquetMetaData)>,
        batch: &RecordBatch,
    ) -> Result<usize, WriterError> {
        let mut props = self.config.to_writer_properties(&self.metadata)?;
        add_encoded_arrow_schema_to_metadata(&self.schema, &mut props);
        let props: WriterPropertiesPtr = Arc::new(props);
        let parquet_schema = ArrowSchemaConverter::new().convert(&self.schema)?;

        let mut writer = SerializedFileWriter::new(
            staged.as_file().try_clone()?,
            parquet_schema.root_schema_ptr(),
            props.clone(),
        )?;

        let mut carried_rows = 0usize;
        if let Some((existing, metadata)) = carried {
            for row_group in metadata.row_groups() {
                let mut out = writer.next_row_group()?;
                for column in row_group.columns() {
                    let chunk = ColumnCloseResult {
                        bytes_written: column.compressed_size() as u64,
                        rows_written: row_group.num_rows() as u64,
                        metadata: column.clone(),
                        bloom_filter: None,
                        column_index: None,
                        offset_index: None,
                    };
                    out.append_column(existing, chunk)?;
                }
                out.close()?;
                carried_rows += row_group.num_rows() as usize;
            }
        }

        let max_rows = props.max_row_group_size().max(1);
        let mut offset = 0;
        while offset < batch.num_rows() {
            let len = max_rows.min(batch.num_rows() - offset);
            let slice = batch.slice(offset, len);
            self.encode_row_group(&mut writer, &parquet_schema, &props, &slice)?;
            offset += len;
        }

        writer.close()?;
        Ok(carried_rows)
    }

    fn encode_row_group<W: Write + Send>(
        &self,
        writer: &mut SerializedFileWriter<W>,
        parquet_schema: &SchemaDescriptor,
        props: &WriterPropertiesPtr,
        batch: &RecordBatch,
    ) -> Result<(), WriterError> {
        // Flat schema: one leaf column per field
        let mut column_writers = get_column_writers(parquet_schema, props, &self.schema)?;
        for ((field, column), column_writer) in self
            .schema
            .fields()
            .iter()
            .zip(batch.columns())
            .zip(column_writers.iter_mut())
        {
            for leaf in compute_leaves(field, column)? {
                column_writer.write(&leaf)?;
            }
        }

        let mut row_group = writer.next_row_group()?;
        for column_writer in column_writers {
            column_writer.close()?.append_to_row_group(&mut row_group)?;
        }
        row_group.close()?;
        Ok(())
    }

    fn write_create(&mut self, batch: &RecordBatch) -> Result<(), WriterError> {
        let staged = self.stage()?;
        self.write_staged(&staged, None, batch)?;
        self.commit(staged)
    }

    fn write_append(&mut self, batch: &RecordBatch) -> Result<(), WriterError> {
        let existing = File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => WriterError::MissingTarget(self.path.display().to_string()),
            _ => WriterError::IoError(e),
        })?;

        // Footer only; the pages themselves are never decoded
        let existing_metadata = ArrowReaderMetadata::load(&existing, ArrowReaderOptions::default())?;
        validate_schema(existing_metadata.schema(), self.config.precision)
            .map_err(|e| WriterError::InvalidData(format!("{}: {}", self.path.display(), e)))?;

        let staged = self.stage()?;
        let carried = self.write_staged(
            &staged,
            Some((&existing, existing_metadata.metadata().as_ref())),
            batch,
        )?;

        debug!(
            "Appended {} rows after {} existing rows in {}",
            batch.num_rows(),
            carried,
            self.path.display()
        );
        self.commit(staged)
    }
}

impl ColumnarWriter for ParquetBatchWriter {
    fn write_batch(&mut self, rows: Vec<OutputRow>, mode: WriteMode) -> Result<(), WriterError> {
        let num_rows = rows.len();
        let batch = self.rows_to_record_batch(rows)?;

        match mode {
            WriteMode::Create => self.write_create(&batch)?,
            WriteMode::Append => self.write_append(&batch)?,
        }

        self.stats.batches_written += 1;
        self.stats.rows_written += num_rows;
        Ok(())
    }
}

impl std::fmt::Debug for ParquetBatchWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParquetBatchWriter")
            .field("path", &self.path)
            .field("precision", &self.config.precision)
            .field("stats", &self.stats)
            .finish()
    }
}
