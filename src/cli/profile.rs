//! Conversion profiles.
//!
//! A profile picks the Parquet tuning for a run so users rarely need the
//! individual flags.

use std::fmt;
use std::str::FromStr;

use mzparquet::writer::WriterConfig;

/// Speed versus size trade-off of a conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    /// ZSTD level 1 (default).
    #[default]
    Fast,

    /// ZSTD level 3.
    Balanced,

    /// ZSTD level 22 with larger pages.
    MaxCompression,
}

impl Profile {
    /// Writer settings of this profile.
    pub fn writer_config(&self) -> WriterConfig {
        match self {
            Profile::Fast => WriterConfig::fast_write(),
            Profile::Balanced => WriterConfig::balanced(),
            Profile::MaxCompression => WriterConfig::max_compression(),
        }
    }

    /// Returns all available profile names.
    pub fn variants() -> &'static [&'static str] {
        &["fast", "balanced", "max-compression"]
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Fast => write!(f, "fast"),
            Profile::Balanced => write!(f, "balanced"),
            Profile::MaxCompression => write!(f, "max-compression"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" | "default" => Ok(Profile::Fast),
            "balanced" => Ok(Profile::Balanced),
            "max-compression" | "maxcompression" | "max" => Ok(Profile::MaxCompression),
            _ => Err(format!(
                "Unknown profile '{}'. Valid options: {}",
                s,
                Profile::variants().join(", ")
            )),
        }
    }
}
