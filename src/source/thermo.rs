//! Thermo RAW scan source.
//!
//! Wraps `thermorawfilereader::RawFileReader`, which hosts Thermo's .NET
//! RawFileReader assemblies. A .NET 8 runtime must be installed.
//!
//! | Platform         | Support |
//! |------------------|---------|
//! | Windows x86_64   | yes     |
//! | Linux x86_64     | yes     |
//! | macOS x86_64     | yes     |
//! | ARM64 (any OS)   | no      |
//!
//! On unsupported platforms [`ThermoScanSource::open`] fails with
//! [`SourceError::PlatformNotSupported`].

use std::path::Path;

use log::debug;
use thermorawfilereader::RawFileReader;

use super::{
    validate_raw_path, PeakList, ScanHeader, ScanRange, ScanSource, SourceError, Trailer,
};

fn check_platform_support() -> Result<(), SourceError> {
    // The .NET assemblies are x86 only
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        return Err(SourceError::PlatformNotSupported(format!(
            "architecture '{}' cannot host Thermo's RawFileReader libraries; \
             an x86/x86_64 system is required",
            std::env::consts::ARCH
        )));
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Ok(())
}

/// Random access to the scans of a Thermo RAW file.
///
/// # Example
///
/// ```no_run
/// use mzparquet::source::{thermo::ThermoScanSource, ScanSource};
///
/// let source = ThermoScanSource::open("sample.raw")?;
/// let range = source.scan_range();
/// println!("scans {}..={} on {}", range.first, range.last, source.instrument_model());
/// # Ok::<(), mzparquet::source::SourceError>(())
/// ```
pub struct ThermoScanSource {
    reader: RawFileReader,
    range: ScanRange,
}

impl ThermoScanSource {
    /// Open a RAW file.
    ///
    /// # Errors
    /// - `SourceError::PlatformNotSupported` on ARM systems
    /// - `SourceError::InvalidPath` if the file is missing or not `.raw`
    /// - `SourceError::OpenError` if the reader cannot load the file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        check_platform_support()?;

        let path = path.as_ref();
        validate_raw_path(path)?;

        let mut reader = RawFileReader::open(path.to_path_buf())
            .map_err(|e| SourceError::OpenError(format!("{}: {}", path.display(), e)))?;

        // Headers only; peak data is fetched separately per scan
        reader.set_signal_loading(false);

        let first = reader.first_spectrum();
        let last = reader.last_spectrum();
        let range = if first < 1 || last < first {
            ScanRange::empty()
        } else {
            ScanRange::new(first as u32, last as u32)
        };
        debug!(
            "Opened {}: scans {}..={}",
            path.display(),
            range.first,
            range.last
        );

        Ok(Self { reader, range })
    }

    /// Instrument model name, or "Unknown".
    pub fn instrument_model(&self) -> String {
        let model = self.reader.instrument_model();
        model.model().unwrap_or("Unknown").to_string()
    }

    fn index_of(&self, scan: u32) -> Result<usize, SourceError> {
        if scan < self.range.first || scan > self.range.last {
            return Err(SourceError::ScanNotFound(scan));
        }
        Ok(scan as usize - 1)
    }

    fn peaks(&self, scan: u32, centroid: bool) -> Result<PeakList, SourceError> {
        let index = self.index_of(scan)?;
        let data = self
            .reader
            .get_spectrum_data(index, centroid)
            .ok_or_else(|| SourceError::ReadError(format!("no signal data for scan {scan}")))?;
        let mz = data.mz().into_owned();
        let intensity = data.intensity().iter().map(|&v| f64::from(v)).collect();
        Ok(PeakList::new(mz, intensity))
    }
}

impl ScanSource for ThermoScanSource {
    fn scan_range(&self) -> ScanRange {
        self.range
    }

    fn header(&self, scan: u32) -> Result<ScanHeader, SourceError> {
        let index = self.index_of(scan)?;
        let spectrum = self
            .reader
            .get(index)
            .ok_or_else(|| SourceError::ReadError(format!("cannot read header of scan {scan}")))?;

        let ms_level = u32::from(spectrum.ms_level());
        let retention_time = spectrum.time();

        Ok(match spectrum.precursor() {
            Some(precursor) if ms_level > 1 => {
                let window = precursor.isolation_window();
                ScanHeader::msn(
                    ms_level,
                    retention_time,
                    window.target(),
                    window.upper() - window.lower(),
                )
            }
            _ => ScanHeader {
                ms_level,
                retention_time,
                reaction: None,
            },
        })
    }

    fn centroids(&self, scan: u32) -> Result<PeakList, SourceError> {
        self.peaks(scan, true)
    }

    fn profile_peaks(&self, scan: u32) -> Result<PeakList, SourceError> {
        self.peaks(scan, false)
    }

    fn trailer(&self, scan: u32) -> Result<Trailer, SourceError> {
        let index = self.index_of(scan)?;
        Ok(match self.reader.get_raw_trailers_for(index) {
            Some(values) => values.iter().map(|v| (v.label, v.value)).collect(),
            None => Trailer::new(),
        })
    }
}

impl std::fmt::Debug for ThermoScanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThermoScanSource")
            .field("range", &self.range)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let result = ThermoScanSource::open("/nonexistent/file.raw");
        assert!(matches!(
            result,
            Err(SourceError::InvalidPath(_)) | Err(SourceError::PlatformNotSupported(_))
        ));
    }

    #[test]
    fn test_open_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("run.mzML");
        std::fs::write(&fake, "fake").unwrap();

        let result = ThermoScanSource::open(&fake);
        assert!(matches!(
            result,
            Err(SourceError::InvalidPath(_)) | Err(SourceError::PlatformNotSupported(_))
        ));
    }
}
