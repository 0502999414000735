use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::config::Precision;
use super::error::WriterError;
use crate::schema::{
    KEY_CONVERTER_INFO, KEY_FORMAT_VERSION, KEY_PRECISION, KEY_SOURCE_FILE,
    MZPARQUET_FORMAT_VERSION,
};

/// Source file information for provenance tracking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileInfo {
    /// Original file name
    pub name: String,

    /// Original file path
    pub path: Option<String>,

    /// File format (e.g., "Thermo RAW")
    pub format: Option<String>,

    /// File size in bytes
    pub size_bytes: Option<u64>,

    /// Instrument model reported by the source, if known
    pub instrument_model: Option<String>,
}

impl SourceFileInfo {
    /// Create new source file info with the given filename
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Serialize to JSON for Parquet footer storage
    pub fn to_json(&self) -> Result<String, WriterError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, WriterError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Key/value metadata embedded in every mzparquet footer.
#[derive(Debug, Clone, Default)]
pub struct OutputMetadata {
    /// Provenance of the converted file
    pub source_file: Option<SourceFileInfo>,
}

impl OutputMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach source file provenance
    pub fn with_source_file(mut self, source_file: SourceFileInfo) -> Self {
        self.source_file = Some(source_file);
        self
    }

    /// Convert to Parquet key/value pairs for the given precision.
    ///
    /// No timestamps are recorded, so re-running a conversion yields the same footer.
    pub fn to_parquet_metadata(
        &self,
        precision: Precision,
    ) -> Result<HashMap<String, String>, WriterError> {
        let mut metadata = HashMap::new();

        metadata.insert(
            KEY_FORMAT_VERSION.to_string(),
            MZPARQUET_FORMAT_VERSION.to_string(),
        );
        metadata.insert(KEY_PRECISION.to_string(), precision.to_string());
        metadata.insert(
            KEY_CONVERTER_INFO.to_string(),
            format!("mzparquet v{}", env!("CARGO_PKG_VERSION")),
        );

        if let Some(ref source) = self.source_file {
            metadata.insert(KEY_SOURCE_FILE.to_string(), source.to_json()?);
        }

        Ok(metadata)
    }
}
