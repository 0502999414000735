//! TOML configuration file support.
//!
//! ```toml
//! # mzparquet.toml
//! [conversion]
//! compression_level = 3
//! row_group_size = 500000
//! chunk_size = 1048576
//! precision = "integer"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use mzparquet::writer::Precision;

/// Root of an mzparquet.toml file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Conversion settings.
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// `[conversion]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversionConfig {
    /// ZSTD compression level (1-22).
    pub compression_level: Option<i32>,

    /// Rows per Parquet row group.
    pub row_group_size: Option<usize>,

    /// Rows buffered before each flush.
    pub chunk_size: Option<usize>,

    /// Intensity and charge representation.
    pub precision: Option<Precision>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
