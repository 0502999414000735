/// mzparquet format version - follows semantic versioning
pub const MZPARQUET_FORMAT_VERSION: &str = "1.0.0";

/// File extension for mzparquet output files (without the leading dot)
pub const MZPARQUET_EXTENSION: &str = "mzparquet";

/// Metadata key for format version in Parquet footer
pub const KEY_FORMAT_VERSION: &str = "mzparquet:format_version";

/// Metadata key for the numeric precision of intensity and charge columns
pub const KEY_PRECISION: &str = "mzparquet:precision";

/// Metadata key for source file information (JSON)
pub const KEY_SOURCE_FILE: &str = "mzparquet:source_file";

/// Metadata key for converter software info
pub const KEY_CONVERTER_INFO: &str = "mzparquet:converter_info";
