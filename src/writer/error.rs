/// Errors that can occur during writing
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the Arrow library during array operations
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Error from the Parquet library during file writing
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Error serializing footer metadata
    #[error("Metadata error: {0}")]
    MetadataError(#[from] serde_json::Error),

    /// Invalid data provided to the writer
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Writer settings the Parquet encoder cannot honor
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Append requested but the target file does not exist
    #[error("Cannot append to missing file: {0}")]
    MissingTarget(String),
}
