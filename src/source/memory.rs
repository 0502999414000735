//! In-memory scan source.

use super::{PeakList, ScanHeader, ScanRange, ScanSource, SourceError, Trailer};

/// One scan held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryScan {
    /// Filter data and retention time
    pub header: ScanHeader,
    /// Centroided peaks
    pub centroids: PeakList,
    /// Profile-derived peaks
    pub profile: PeakList,
    /// Trailer-extra entries
    pub trailer: Trailer,
}

impl MemoryScan {
    /// Create a scan with the given header and no peaks
    pub fn new(header: ScanHeader) -> Self {
        Self {
            header,
            centroids: PeakList::empty(),
            profile: PeakList::empty(),
            trailer: Trailer::new(),
        }
    }

    /// Survey scan at `retention_time` minutes
    pub fn ms1(retention_time: f64) -> Self {
        Self::new(ScanHeader::ms1(retention_time))
    }

    /// MSn scan isolated around `precursor_mass` with the given window width
    pub fn msn(ms_level: u32, retention_time: f64, precursor_mass: f64, isolation_width: f64) -> Self {
        Self::new(ScanHeader::msn(
            ms_level,
            retention_time,
            precursor_mass,
            isolation_width,
        ))
    }

    /// Set the centroided peak list
    pub fn with_centroids(mut self, mz: Vec<f64>, intensity: Vec<f64>) -> Self {
        self.centroids = PeakList::new(mz, intensity);
        self
    }

    /// Set the profile-derived peak list
    pub fn with_profile(mut self, mz: Vec<f64>, intensity: Vec<f64>) -> Self {
        self.profile = PeakList::new(mz, intensity);
        self
    }

    /// Append a trailer entry
    pub fn with_trailer(mut self, label: &str, value: &str) -> Self {
        self.trailer.push(label, value);
        self
    }
}

/// Scans held in memory, numbered consecutively from a first scan number.
///
/// # Example
///
/// ```
/// use mzparquet::source::{MemoryScan, MemoryScanSource, ScanSource};
///
/// let source = MemoryScanSource::starting_at(10)
///     .with_scan(MemoryScan::ms1(0.1).with_centroids(vec![400.0], vec![1e4]))
///     .with_scan(MemoryScan::msn(2, 0.2, 500.0, 2.0));
///
/// assert_eq!(source.scan_range().first, 10);
/// assert_eq!(source.scan_range().last, 11);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryScanSource {
    first_scan: u32,
    scans: Vec<MemoryScan>,
}

impl MemoryScanSource {
    /// Empty source whose first scan will be numbered 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Empty source whose first scan will be numbered `first_scan`
    pub fn starting_at(first_scan: u32) -> Self {
        Self {
            first_scan,
            scans: Vec::new(),
        }
    }

    /// Append a scan; it receives the next scan number
    pub fn push(&mut self, scan: MemoryScan) {
        self.scans.push(scan);
    }

    /// Builder form of [`push`](Self::push)
    pub fn with_scan(mut self, scan: MemoryScan) -> Self {
        self.push(scan);
        self
    }

    /// Number of scans
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// Whether the source holds no scans
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    fn get(&self, scan: u32) -> Result<&MemoryScan, SourceError> {
        scan.checked_sub(self.first_scan)
            .and_then(|offset| self.scans.get(offset as usize))
            .ok_or(SourceError::ScanNotFound(scan))
    }
}

impl ScanSource for MemoryScanSource {
    fn scan_range(&self) -> ScanRange {
        if self.scans.is_empty() {
            return ScanRange::empty();
        }
        let last = self.first_scan.saturating_add(self.scans.len() as u32 - 1);
        ScanRange::new(self.first_scan, last)
    }

    fn header(&self, scan: u32) -> Result<ScanHeader, SourceError> {
        Ok(self.get(scan)?.header)
    }

    fn centroids(&self, scan: u32) -> Result<PeakList, SourceError> {
        Ok(self.get(scan)?.centroids.clone())
    }

    fn profile_peaks(&self, scan: u32) -> Result<PeakList, SourceError> {
        Ok(self.get(scan)?.profile.clone())
    }

    fn trailer(&self, scan: u32) -> Result<Trailer, SourceError> {
        Ok(self.get(scan)?.trailer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_numbering() {
        let source = MemoryScanSource::starting_at(5)
            .with_scan(MemoryScan::ms1(1.0))
            .with_scan(MemoryScan::msn(2, 1.1, 600.0, 1.6));

        assert_eq!(source.scan_range(), ScanRange::new(5, 6));
        assert_eq!(source.header(6).unwrap().ms_level, 2);
        assert!(matches!(source.header(4), Err(SourceError::ScanNotFound(4))));
        assert!(matches!(source.header(7), Err(SourceError::ScanNotFound(7))));
    }

    #[test]
    fn test_empty_source() {
        let source = MemoryScanSource::new();
        assert!(source.scan_range().is_empty());
    }
}
