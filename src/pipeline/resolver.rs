//! Precursor resolution.
//!
//! Each MSn scan is linked to the most recent scan one MS level below it. The
//! isolation window and precursor m/z come from the scan's first reaction; the
//! trailer may then override the precursor m/z, precursor scan and charge.

use log::trace;

use crate::source::{ScanHeader, Trailer};
use crate::writer::{Precision, Quantity};

/// Trailer label prefix of the monoisotopic precursor m/z.
pub const MONOISOTOPIC_MZ_LABEL: &str = "Monoisotopic M/Z";
/// Trailer label prefix of the instrument-reported precursor scan.
pub const MASTER_SCAN_LABEL: &str = "Master Scan";
/// Trailer label prefix of the precursor charge state.
pub const CHARGE_LABEL: &str = "Charge";

/// Most recent scan number observed at each MS level, indexed by level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecursorState {
    last_scan: Vec<Option<u32>>,
}

impl PrecursorState {
    /// Empty state: no scan observed at any level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent scan observed at `ms_level`.
    pub fn last_scan_at(&self, ms_level: u32) -> Option<u32> {
        self.last_scan.get(ms_level as usize).copied().flatten()
    }

    /// Record `scan` as the most recent scan at `ms_level`.
    pub fn record(&mut self, ms_level: u32, scan: u32) {
        let slot = ms_level as usize;
        if slot >= self.last_scan.len() {
            self.last_scan.resize(slot + 1, None);
        }
        self.last_scan[slot] = Some(scan);
    }
}

/// Resolved precursor fields of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrecursorInfo {
    /// Isolation window lower bound
    pub isolation_lower: Option<f32>,
    /// Isolation window upper bound
    pub isolation_upper: Option<f32>,
    /// Scan number of the precursor scan
    pub precursor_scan: Option<u32>,
    /// Precursor m/z
    pub precursor_mz: Option<f32>,
    /// Precursor charge
    pub precursor_charge: Option<Quantity>,
}

#[derive(Debug, Default)]
struct TrailerOverrides {
    monoisotopic_mz: Option<f32>,
    master_scan: Option<u32>,
    charge: Option<Quantity>,
}

impl TrailerOverrides {
    fn collect(scan: u32, trailer: &Trailer, precision: Precision) -> Self {
        let mut overrides = Self::default();
        for entry in trailer.iter() {
            let value = entry.value.trim();
            if entry.label.starts_with(MONOISOTOPIC_MZ_LABEL) {
                match parse_positive_f32(value) {
                    Some(mz) => overrides.monoisotopic_mz = Some(mz),
                    None => trace!("Scan {scan}: ignoring {:?} = {:?}", entry.label, value),
                }
            } else if entry.label.starts_with(MASTER_SCAN_LABEL) {
                match parse_positive_u32(value) {
                    Some(master) => overrides.master_scan = Some(master),
                    None => trace!("Scan {scan}: ignoring {:?} = {:?}", entry.label, value),
                }
            } else if entry.label.starts_with(CHARGE_LABEL) {
                let charge = match precision {
                    Precision::Float => parse_positive_f32(value).map(Quantity::Float),
                    Precision::Integer => parse_positive_u32(value).map(Quantity::Unsigned),
                };
                match charge {
                    Some(charge) => overrides.charge = Some(charge),
                    None => trace!("Scan {scan}: ignoring {:?} = {:?}", entry.label, value),
                }
            }
        }
        overrides
    }

    fn apply(self, info: &mut PrecursorInfo) {
        if let Some(mz) = self.monoisotopic_mz {
            info.precursor_mz = Some(mz);
        }
        if let Some(master) = self.master_scan {
            info.precursor_scan = Some(master);
        }
        if let Some(charge) = self.charge {
            info.precursor_charge = Some(charge);
        }
    }
}

fn parse_positive_f32(value: &str) -> Option<f32> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_positive_u32(value: &str) -> Option<u32> {
    value
        .parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

/// Resolves precursor fields scan by scan, carrying [`PrecursorState`] across scans.
///
/// Scans must be resolved in increasing scan order.
///
/// # Example
///
/// ```
/// use mzparquet::pipeline::PrecursorResolver;
/// use mzparquet::source::{ScanHeader, Trailer};
/// use mzparquet::writer::Precision;
///
/// let mut resolver = PrecursorResolver::new(Precision::Float);
/// resolver.resolve(10, &ScanHeader::ms1(1.0), &Trailer::new());
/// let info = resolver.resolve(11, &ScanHeader::msn(2, 1.1, 500.0, 2.0), &Trailer::new());
///
/// assert_eq!(info.precursor_scan, Some(10));
/// assert_eq!(info.isolation_lower, Some(499.0));
/// assert_eq!(info.isolation_upper, Some(501.0));
/// ```
#[derive(Debug, Clone)]
pub struct PrecursorResolver {
    precision: Precision,
    state: PrecursorState,
}

impl PrecursorResolver {
    /// Resolver with empty state; `precision` selects the charge representation.
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            state: PrecursorState::new(),
        }
    }

    /// State accumulated so far.
    pub fn state(&self) -> &PrecursorState {
        &self.state
    }

    /// Resolve the precursor fields of `scan` and record it at its MS level.
    pub fn resolve(&mut self, scan: u32, header: &ScanHeader, trailer: &Trailer) -> PrecursorInfo {
        let mut info = PrecursorInfo::default();
        let overrides = TrailerOverrides::collect(scan, trailer, self.precision);

        if header.ms_level > 1 {
            if let Some(reaction) = header.reaction {
                let half_width = reaction.isolation_width / 2.0;
                info.isolation_lower = Some((reaction.precursor_mass - half_width) as f32);
                info.isolation_upper = Some((reaction.precursor_mass + half_width) as f32);
                info.precursor_mz = Some(reaction.precursor_mass as f32);
            }
            info.precursor_scan = self.state.last_scan_at(header.ms_level - 1);
            overrides.apply(&mut info);
        }

        // Recorded after resolution so a scan never resolves to itself
        self.state.record(header.ms_level, scan);
        info
    }
}
