use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use parquet::basic::{Compression, Encoding, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use parquet::schema::types::ColumnPath;
use serde::{Deserialize, Serialize};

use crate::schema::columns;

use super::error::WriterError;

/// Compression options for mzparquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// ZSTD compression at the given level
    Zstd(i32),
    /// Snappy compression (faster, slightly larger files)
    Snappy,
    /// No compression (fastest write, largest files)
    Uncompressed,
}

impl Default for CompressionType {
    fn default() -> Self {
        Self::fast()
    }
}

impl CompressionType {
    /// Maximum compression (slower write, smallest files)
    pub fn max_compression() -> Self {
        Self::Zstd(22)
    }

    /// Balanced compression
    pub fn balanced() -> Self {
        Self::Zstd(3)
    }

    /// Fastest ZSTD level, the default for chunked conversion
    pub fn fast() -> Self {
        Self::Zstd(1)
    }

    /// ZSTD at `level`, rejecting levels the codec does not accept (1 to 22).
    pub fn zstd(level: i32) -> Result<Self, WriterError> {
        let compression = Self::Zstd(level);
        compression.validate()?;
        Ok(compression)
    }

    /// Check that the codec accepts this setting.
    pub fn validate(self) -> Result<(), WriterError> {
        self.to_parquet().map(|_| ())
    }

    fn to_parquet(self) -> Result<Compression, WriterError> {
        Ok(match self {
            CompressionType::Zstd(level) => {
                let level = ZstdLevel::try_new(level).map_err(|_| {
                    WriterError::InvalidConfig(format!(
                        "ZSTD compression level {level} is outside 1..=22"
                    ))
                })?;
                Compression::ZSTD(level)
            }
            CompressionType::Snappy => Compression::SNAPPY,
            CompressionType::Uncompressed => Compression::UNCOMPRESSED,
        })
    }
}

/// Numeric precision of the `intensity` and `precursor_charge` columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Single-precision floats
    #[default]
    Float,
    /// Unsigned 32-bit integers; intensities are rounded half to even
    Integer,
}

impl Precision {
    /// Returns all accepted precision names.
    pub fn variants() -> &'static [&'static str] {
        &["float", "integer"]
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Float => write!(f, "float"),
            Precision::Integer => write!(f, "integer"),
        }
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "float" | "f32" => Ok(Precision::Float),
            "integer" | "int" | "u32" => Ok(Precision::Integer),
            _ => Err(format!(
                "Unknown precision '{}'. Valid options: {}",
                s,
                Precision::variants().join(", ")
            )),
        }
    }
}

/// Configuration for the mzparquet writer
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression type to use
    pub compression: CompressionType,

    /// Target row group size (number of rows per group)
    /// Smaller = better random access, larger = better compression
    pub row_group_size: usize,

    /// Data page size in bytes
    pub data_page_size: usize,

    /// Whether to write statistics for columns
    pub write_statistics: bool,

    /// Dictionary page size limit in bytes
    pub dictionary_page_size_limit: usize,

    /// Enable BYTE_STREAM_SPLIT encoding for floating-point peak columns.
    pub use_byte_stream_split: bool,

    /// Numeric precision of intensity and charge columns
    pub precision: Precision,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self::fast_write()
    }
}

impl WriterConfig {
    /// Configuration optimized for fast writing (the default)
    pub fn fast_write() -> Self {
        Self {
            compression: CompressionType::fast(),
            // one chunk of the default pipeline fits a single row group
            row_group_size: 1024 * 1024,
            data_page_size: 1024 * 1024,
            write_statistics: true,
            dictionary_page_size_limit: 1024 * 1024,
            use_byte_stream_split: true,
            precision: Precision::Float,
        }
    }

    /// Balanced configuration
    pub fn balanced() -> Self {
        Self {
            compression: CompressionType::balanced(),
            ..Self::fast_write()
        }
    }

    /// Configuration optimized for maximum compression (slower write)
    pub fn max_compression() -> Self {
        Self {
            compression: CompressionType::max_compression(),
            data_page_size: 2 * 1024 * 1024,
            dictionary_page_size_limit: 2 * 1024 * 1024,
            ..Self::fast_write()
        }
    }

    /// Set the numeric precision
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Create writer properties from this configuration
    pub(super) fn to_writer_properties(
        &self,
        metadata: &HashMap<String, String>,
    ) -> Result<WriterProperties, WriterError> {
        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        let mut builder = WriterProperties::builder()
            .set_compression(self.compression.to_parquet()?)
            .set_data_page_size_limit(self.data_page_size)
            .set_dictionary_page_size_limit(self.dictionary_page_size_limit)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size.max(1));

        // Scan-level columns repeat for every peak of a scan
        let dict_columns = [
            columns::SCAN,
            columns::LEVEL,
            columns::RT,
            columns::ISOLATION_LOWER,
            columns::ISOLATION_UPPER,
            columns::PRECURSOR_SCAN,
            columns::PRECURSOR_MZ,
            columns::PRECURSOR_CHARGE,
        ];
        for col in dict_columns {
            builder = builder
                .set_column_dictionary_enabled(ColumnPath::new(vec![col.to_string()]), true);
        }

        let peak_columns = [columns::MZ, columns::INTENSITY, columns::ION_MOBILITY];
        for col in peak_columns {
            builder = builder
                .set_column_dictionary_enabled(ColumnPath::new(vec![col.to_string()]), false);
        }

        // BYTE_STREAM_SPLIT only applies to floating-point physical types
        if self.use_byte_stream_split {
            let mut float_columns = vec![columns::MZ, columns::ION_MOBILITY];
            if self.precision == Precision::Float {
                float_columns.push(columns::INTENSITY);
            }
            for col in float_columns {
                builder = builder.set_column_encoding(
                    ColumnPath::new(vec![col.to_string()]),
                    Encoding::BYTE_STREAM_SPLIT,
                );
            }
        }

        // Sorted so the footer is identical across runs
        let mut kv_metadata: Vec<KeyValue> = metadata
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: Some(v.clone()),
            })
            .collect();
        kv_metadata.sort_by(|a, b| a.key.cmp(&b.key));

        builder = builder.set_key_value_metadata(Some(kv_metadata));

        Ok(builder.build())
    }
}
