//! One output row per peak.

use crate::source::PeakList;
use crate::writer::{OutputRow, Precision, Quantity};

use super::resolver::PrecursorInfo;

/// Scan-level values copied into every row of a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanAttributes {
    /// Scan number
    pub scan: u32,
    /// MS level
    pub level: u32,
    /// Retention time in minutes
    pub rt: f32,
    /// Resolved precursor fields
    pub precursor: PrecursorInfo,
}

impl ScanAttributes {
    /// Attributes of `scan`, narrowing the retention time to `f32`.
    pub fn new(scan: u32, level: u32, retention_time: f64, precursor: PrecursorInfo) -> Self {
        Self {
            scan,
            level,
            rt: retention_time as f32,
            precursor,
        }
    }

    fn row(&self, mz: f64, intensity: f64, precision: Precision) -> OutputRow {
        OutputRow {
            scan: self.scan,
            level: self.level,
            rt: self.rt,
            mz: mz as f32,
            intensity: Quantity::narrow(intensity, precision),
            ion_mobility: None,
            isolation_lower: self.precursor.isolation_lower,
            isolation_upper: self.precursor.isolation_upper,
            precursor_scan: self.precursor.precursor_scan,
            precursor_mz: self.precursor.precursor_mz,
            precursor_charge: self.precursor.precursor_charge,
        }
    }
}

/// Rows for every peak of `peaks`, in peak order.
pub fn flatten(
    attributes: ScanAttributes,
    peaks: &PeakList,
    precision: Precision,
) -> impl Iterator<Item = OutputRow> + '_ {
    peaks
        .iter()
        .map(move |(mz, intensity)| attributes.row(mz, intensity, precision))
}
