//! Error types for scan sources.

use thiserror::Error;

/// Errors that can occur while opening or reading a scan source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Path does not exist or does not carry the expected extension
    #[error("Invalid input path: {0}")]
    InvalidPath(String),

    /// Error opening the source (corrupt file, unsupported format, etc.)
    #[error("Failed to open input: {0}")]
    OpenError(String),

    /// Error reading data for a scan
    #[error("Scan read error: {0}")]
    ReadError(String),

    /// The source has no scan with this number
    #[error("Scan {0} not found")]
    ScanNotFound(u32),

    /// Platform not supported (e.g., ARM architecture for Thermo RAW)
    #[error("Platform not supported: {0}")]
    PlatformNotSupported(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
