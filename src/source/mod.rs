//! Scan sources feeding the conversion pipeline.
//!
//! A [`ScanSource`] exposes a contiguous range of scan numbers and, per scan, the
//! header (MS level, retention time, first reaction), two alternative peak lists
//! and the instrument's trailer. [`MemoryScanSource`] holds scans in memory; the
//! `thermo` feature adds a Thermo RAW implementation.

mod error;
mod memory;
#[cfg(feature = "thermo")]
pub mod thermo;

use std::path::Path;

use log::warn;

pub use error::SourceError;
pub use memory::{MemoryScan, MemoryScanSource};

/// Expected extension of vendor input files (compared case-insensitively)
pub const RAW_EXTENSION: &str = "raw";

/// Inclusive range of scan numbers `[first, last]`. Empty when `first > last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    /// First scan number
    pub first: u32,
    /// Last scan number (inclusive)
    pub last: u32,
}

impl ScanRange {
    /// Create a range from `first` to `last` inclusive
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// A range containing no scans
    pub fn empty() -> Self {
        Self { first: 1, last: 0 }
    }

    /// Number of scans in the range
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            u64::from(self.last - self.first) + 1
        }
    }

    /// Whether the range contains no scans
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// Scan numbers in increasing order
    pub fn iter(&self) -> std::ops::RangeInclusive<u32> {
        self.first..=self.last
    }
}

/// First reaction recorded by the instrument filter of an MSn scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reaction {
    /// Precursor mass the isolation window is centered on
    pub precursor_mass: f64,
    /// Full width of the isolation window
    pub isolation_width: f64,
}

/// Scan-level filter data and retention time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanHeader {
    /// MS level (1 = survey scan)
    pub ms_level: u32,
    /// Retention time in minutes
    pub retention_time: f64,
    /// First reaction, present for MSn scans
    pub reaction: Option<Reaction>,
}

impl ScanHeader {
    /// Header of a survey scan
    pub fn ms1(retention_time: f64) -> Self {
        Self {
            ms_level: 1,
            retention_time,
            reaction: None,
        }
    }

    /// Header of an MSn scan isolated around `precursor_mass`
    pub fn msn(ms_level: u32, retention_time: f64, precursor_mass: f64, isolation_width: f64) -> Self {
        Self {
            ms_level,
            retention_time,
            reaction: Some(Reaction {
                precursor_mass,
                isolation_width,
            }),
        }
    }
}

/// Ordered peak list with equal-length mass and intensity arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakList {
    mz: Vec<f64>,
    intensity: Vec<f64>,
}

impl PeakList {
    /// Create a peak list. Arrays of unequal length are truncated to the shorter one.
    pub fn new(mut mz: Vec<f64>, mut intensity: Vec<f64>) -> Self {
        if mz.len() != intensity.len() {
            warn!(
                "Peak arrays differ in length ({} m/z, {} intensity); truncating",
                mz.len(),
                intensity.len()
            );
            let len = mz.len().min(intensity.len());
            mz.truncate(len);
            intensity.truncate(len);
        }
        Self { mz, intensity }
    }

    /// Empty peak list
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of peaks
    pub fn len(&self) -> usize {
        self.mz.len()
    }

    /// Whether there are no peaks
    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Mass array
    pub fn mz(&self) -> &[f64] {
        &self.mz
    }

    /// Intensity array
    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    /// Iterate `(mz, intensity)` pairs in source order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.mz.iter().copied().zip(self.intensity.iter().copied())
    }
}

/// A single trailer-extra entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerEntry {
    /// Human-readable label, e.g. `"Charge State:"`
    pub label: String,
    /// Raw value string
    pub value: String,
}

/// Ordered label/value metadata attached to a scan by the instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trailer {
    entries: Vec<TrailerEntry>,
}

impl Trailer {
    /// Empty trailer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.entries.push(TrailerEntry {
            label: label.into(),
            value: value.into(),
        });
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trailer has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in instrument order
    pub fn iter(&self) -> impl Iterator<Item = &TrailerEntry> {
        self.entries.iter()
    }
}

impl<L: Into<String>, V: Into<String>> FromIterator<(L, V)> for Trailer {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut trailer = Trailer::new();
        for (label, value) in iter {
            trailer.push(label, value);
        }
        trailer
    }
}

/// Random access to the scans of one acquisition.
pub trait ScanSource {
    /// Range of scan numbers available
    fn scan_range(&self) -> ScanRange;

    /// MS level, retention time and first reaction of a scan
    fn header(&self, scan: u32) -> Result<ScanHeader, SourceError>;

    /// Centroided peak list of a scan
    fn centroids(&self, scan: u32) -> Result<PeakList, SourceError>;

    /// Profile-derived simplified peak list of a scan
    fn profile_peaks(&self, scan: u32) -> Result<PeakList, SourceError>;

    /// Trailer-extra entries of a scan
    fn trailer(&self, scan: u32) -> Result<Trailer, SourceError>;
}

impl<S: ScanSource + ?Sized> ScanSource for &S {
    fn scan_range(&self) -> ScanRange {
        (**self).scan_range()
    }

    fn header(&self, scan: u32) -> Result<ScanHeader, SourceError> {
        (**self).header(scan)
    }

    fn centroids(&self, scan: u32) -> Result<PeakList, SourceError> {
        (**self).centroids(scan)
    }

    fn profile_peaks(&self, scan: u32) -> Result<PeakList, SourceError> {
        (**self).profile_peaks(scan)
    }

    fn trailer(&self, scan: u32) -> Result<Trailer, SourceError> {
        (**self).trailer(scan)
    }
}

/// Check that `path` exists and carries the `.raw` extension.
pub fn validate_raw_path(path: &Path) -> Result<(), SourceError> {
    if !path.exists() {
        return Err(SourceError::InvalidPath(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    if path.extension().map(|e| e.to_ascii_lowercase()) != Some(RAW_EXTENSION.into()) {
        return Err(SourceError::InvalidPath(format!(
            "Expected .{} extension: {}",
            RAW_EXTENSION,
            path.display()
        )));
    }

    Ok(())
}
