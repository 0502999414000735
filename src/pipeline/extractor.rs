//! Peak list selection.

use log::debug;

use crate::source::{PeakList, ScanSource, SourceError};

/// Which detection result a scan's peaks came from.
#[derive(Debug, Clone, PartialEq)]
pub enum PeakSelection {
    /// Centroided peak list
    Centroid(PeakList),
    /// Profile-derived simplified peak list, used when no centroids exist
    Profile(PeakList),
}

impl PeakSelection {
    /// The selected peaks.
    pub fn peaks(&self) -> &PeakList {
        match self {
            PeakSelection::Centroid(peaks) | PeakSelection::Profile(peaks) => peaks,
        }
    }

    /// Consume the selection, keeping the peaks.
    pub fn into_peaks(self) -> PeakList {
        match self {
            PeakSelection::Centroid(peaks) | PeakSelection::Profile(peaks) => peaks,
        }
    }

    /// Whether the profile fallback was taken.
    pub fn is_fallback(&self) -> bool {
        matches!(self, PeakSelection::Profile(_))
    }
}

/// Select the peaks of `scan`: centroids if any, otherwise the profile-derived list.
///
/// The profile list is only requested when the centroid list is empty. Both lists
/// being empty is not an error and yields an empty `Profile` selection.
pub fn extract_peaks<S: ScanSource + ?Sized>(
    source: &S,
    scan: u32,
) -> Result<PeakSelection, SourceError> {
    let centroids = source.centroids(scan)?;
    if !centroids.is_empty() {
        return Ok(PeakSelection::Centroid(centroids));
    }

    let profile = source.profile_peaks(scan)?;
    debug!(
        "Scan {}: no centroids, using {} profile-derived peaks",
        scan,
        profile.len()
    );
    Ok(PeakSelection::Profile(profile))
}
